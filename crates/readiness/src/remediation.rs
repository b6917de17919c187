use crate::types::{DesktopControlStatus, Remediation};

/// Fixed remediation text per overall status. `ready` has none.
pub fn remediation_for(status: DesktopControlStatus) -> Option<Remediation> {
    let (title, steps): (&str, &[&str]) = match status {
        DesktopControlStatus::Ready => return None,
        DesktopControlStatus::NeedsScreenRecordingPermission => (
            "Grant screen recording permission",
            &[
                "Open the system privacy settings (macOS: Privacy & Security > Screen Recording).",
                "Allow screen recording for this application, or install a screen capture backend.",
                "Restart the application so the permission takes effect.",
            ],
        ),
        DesktopControlStatus::NeedsAccessibilityPermission => (
            "Grant accessibility permission",
            &[
                "Open the system privacy settings (macOS: Privacy & Security > Accessibility).",
                "Allow input control for this application, or install an input backend.",
                "Re-run the readiness check.",
            ],
        ),
        DesktopControlStatus::McpUnhealthy => (
            "Repair the desktop control runtime",
            &[
                "Reinstall or update the application to restore missing runtime files.",
                "Make sure the runtime interpreter is installed and on PATH.",
                "Re-run the readiness check with a forced refresh.",
            ],
        ),
        DesktopControlStatus::Unknown => (
            "Retry the readiness check",
            &[
                "Restart the application.",
                "Re-run the readiness check with a forced refresh.",
                "If the problem persists, collect logs with RUST_LOG=debug.",
            ],
        ),
    };

    Some(Remediation {
        title: title.to_string(),
        steps: steps.iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_has_no_remediation() {
        assert!(remediation_for(DesktopControlStatus::Ready).is_none());
    }

    #[test]
    fn test_every_other_status_has_ordered_steps() {
        for status in [
            DesktopControlStatus::NeedsScreenRecordingPermission,
            DesktopControlStatus::NeedsAccessibilityPermission,
            DesktopControlStatus::McpUnhealthy,
            DesktopControlStatus::Unknown,
        ] {
            let remediation = remediation_for(status).unwrap();
            assert!(!remediation.title.is_empty());
            assert!(remediation.steps.len() >= 2);
        }
    }
}
