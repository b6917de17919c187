use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The fixed set of capabilities desktop control depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    ScreenCapture,
    ActionExecution,
    McpHealth,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 3] = [
        CapabilityKind::ScreenCapture,
        CapabilityKind::ActionExecution,
        CapabilityKind::McpHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::ScreenCapture => "screen_capture",
            CapabilityKind::ActionExecution => "action_execution",
            CapabilityKind::McpHealth => "mcp_health",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Capability state, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityState {
    Ok,
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure,
    Timeout,
    Error,
}

/// One probe attempt. Ordinals start at 1 and are contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeAttempt {
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityCheckResult {
    pub kind: CapabilityKind,
    pub state: CapabilityState,
    pub reason_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default)]
    pub attempts: Vec<ProbeAttempt>,
    pub checked_at: DateTime<Utc>,
}

impl CapabilityCheckResult {
    pub fn is_permission_denied(&self) -> bool {
        self.state == CapabilityState::Unavailable
            && self.reason_code == format!("{}_permission_denied", self.kind)
    }
}

/// Results for every capability. All three are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityMap {
    pub screen_capture: CapabilityCheckResult,
    pub action_execution: CapabilityCheckResult,
    pub mcp_health: CapabilityCheckResult,
}

impl CapabilityMap {
    pub fn get(&self, kind: CapabilityKind) -> &CapabilityCheckResult {
        match kind {
            CapabilityKind::ScreenCapture => &self.screen_capture,
            CapabilityKind::ActionExecution => &self.action_execution,
            CapabilityKind::McpHealth => &self.mcp_health,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityCheckResult> {
        [&self.screen_capture, &self.action_execution, &self.mcp_health].into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesktopControlStatus {
    Ready,
    NeedsScreenRecordingPermission,
    NeedsAccessibilityPermission,
    McpUnhealthy,
    Unknown,
}

impl DesktopControlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesktopControlStatus::Ready => "ready",
            DesktopControlStatus::NeedsScreenRecordingPermission => {
                "needs_screen_recording_permission"
            }
            DesktopControlStatus::NeedsAccessibilityPermission => "needs_accessibility_permission",
            DesktopControlStatus::McpUnhealthy => "mcp_unhealthy",
            DesktopControlStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DesktopControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    pub title: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub ttl_ms: u64,
    pub expires_at: DateTime<Utc>,
    pub from_cache: bool,
}

/// Aggregated readiness of the host for desktop control.
///
/// `status` is derived from the capability states and never set on its own;
/// only the bridge fallback builds a snapshot without evaluating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessSnapshot {
    pub status: DesktopControlStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub remediation: Option<Remediation>,
    pub capabilities: CapabilityMap,
    pub checked_at: DateTime<Utc>,
    pub cache: CacheMetadata,
}

impl ReadinessSnapshot {
    pub fn is_ready(&self) -> bool {
        self.status == DesktopControlStatus::Ready
    }

    /// Capabilities that are not `ok`, worst first.
    pub fn impaired(&self) -> Vec<&CapabilityCheckResult> {
        let mut impaired: Vec<_> = self
            .capabilities
            .iter()
            .filter(|result| result.state != CapabilityState::Ok)
            .collect();
        impaired.sort_by(|a, b| b.state.cmp(&a.state));
        impaired
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn result(kind: CapabilityKind, state: CapabilityState, reason: &str) -> CapabilityCheckResult {
        CapabilityCheckResult {
            kind,
            state,
            reason_code: reason.to_string(),
            message: String::new(),
            detail: None,
            attempts: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn test_state_severity_order() {
        assert!(CapabilityState::Ok < CapabilityState::Degraded);
        assert!(CapabilityState::Degraded < CapabilityState::Unavailable);
    }

    #[test]
    fn test_kind_tokens() {
        let tokens: Vec<_> = CapabilityKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(tokens, vec!["screen_capture", "action_execution", "mcp_health"]);
        assert_eq!(
            serde_json::to_value(CapabilityKind::McpHealth).unwrap(),
            serde_json::json!("mcp_health")
        );
    }

    #[test]
    fn test_permission_denied_detection() {
        let denied = result(
            CapabilityKind::ScreenCapture,
            CapabilityState::Unavailable,
            "screen_capture_permission_denied",
        );
        assert!(denied.is_permission_denied());

        let timed_out = result(
            CapabilityKind::ScreenCapture,
            CapabilityState::Unavailable,
            "screen_capture_probe_timeout",
        );
        assert!(!timed_out.is_permission_denied());
    }

    #[test]
    fn test_status_serializes_as_snake_case() {
        let value =
            serde_json::to_value(DesktopControlStatus::NeedsAccessibilityPermission).unwrap();
        assert_eq!(value, "needs_accessibility_permission");
        assert_eq!(
            DesktopControlStatus::NeedsScreenRecordingPermission.to_string(),
            "needs_screen_recording_permission"
        );
    }
}
