//! Readiness evaluation: run every capability pipeline and fold the results.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::classifier::classify;
use crate::error::ConfigError;
use crate::policy::{expiry_after, ReadinessConfig};
use crate::probe::{
    missing_entrypoints, read_action_execution, read_runtime_health, read_screen_capture, ProbeSet,
};
use crate::remediation::remediation_for;
use crate::retry::{run_with_policy, RetryReport};
use crate::types::{
    CacheMetadata, CapabilityCheckResult, CapabilityKind, CapabilityMap, CapabilityState,
    DesktopControlStatus, ReadinessSnapshot,
};

/// Overall status with the message and error code that explain it.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub status: DesktopControlStatus,
    pub error_code: Option<String>,
    pub message: String,
}

/// Fold three capability results into one status. First matching rule wins.
pub fn aggregate(capabilities: &CapabilityMap) -> Aggregate {
    let screen = &capabilities.screen_capture;
    let action = &capabilities.action_execution;
    let runtime = &capabilities.mcp_health;

    if screen.is_permission_denied() {
        return Aggregate {
            status: DesktopControlStatus::NeedsScreenRecordingPermission,
            error_code: Some(screen.reason_code.clone()),
            message: "Screen recording permission is required for desktop control".to_string(),
        };
    }

    if action.is_permission_denied() {
        return Aggregate {
            status: DesktopControlStatus::NeedsAccessibilityPermission,
            error_code: Some(action.reason_code.clone()),
            message: "Accessibility permission is required for desktop control".to_string(),
        };
    }

    if let Some(blocking) = capabilities
        .iter()
        .find(|result| result.state == CapabilityState::Unavailable)
    {
        return Aggregate {
            status: DesktopControlStatus::McpUnhealthy,
            error_code: Some(blocking.reason_code.clone()),
            message: format!("Desktop control is unavailable: {}", blocking.message),
        };
    }

    if capabilities.iter().all(|result| result.state == CapabilityState::Ok) {
        return Aggregate {
            status: DesktopControlStatus::Ready,
            error_code: None,
            message: "Desktop control is ready".to_string(),
        };
    }

    if runtime.state == CapabilityState::Degraded {
        return Aggregate {
            status: DesktopControlStatus::McpUnhealthy,
            error_code: Some(runtime.reason_code.clone()),
            message: format!("Desktop control runtime is degraded: {}", runtime.message),
        };
    }

    let degraded: Vec<&str> = capabilities
        .iter()
        .filter(|result| result.state == CapabilityState::Degraded)
        .map(|result| result.message.as_str())
        .collect();
    if !degraded.is_empty() {
        return Aggregate {
            status: DesktopControlStatus::Ready,
            error_code: None,
            message: format!(
                "Desktop control is ready with reduced confidence: {}",
                degraded.join("; ")
            ),
        };
    }

    Aggregate {
        status: DesktopControlStatus::Unknown,
        error_code: None,
        message: "Desktop control readiness could not be determined".to_string(),
    }
}

pub struct ReadinessEvaluator {
    probes: ProbeSet,
    config: ReadinessConfig,
}

impl ReadinessEvaluator {
    /// Fails only on invalid configuration.
    pub fn new(probes: ProbeSet, config: ReadinessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { probes, config })
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Probe all capabilities concurrently and build a fresh snapshot.
    pub async fn evaluate(&self) -> ReadinessSnapshot {
        let (screen_capture, action_execution, mcp_health) = tokio::join!(
            self.check(CapabilityKind::ScreenCapture),
            self.check(CapabilityKind::ActionExecution),
            self.check(CapabilityKind::McpHealth),
        );

        let capabilities = CapabilityMap {
            screen_capture,
            action_execution,
            mcp_health,
        };
        let Aggregate {
            status,
            error_code,
            message,
        } = aggregate(&capabilities);
        info!("Desktop control readiness: {}", status);

        let checked_at = Utc::now();
        let ttl_ms = self.config.cache_ttl_ms;
        ReadinessSnapshot {
            status,
            error_code,
            message,
            remediation: remediation_for(status),
            capabilities,
            checked_at,
            cache: CacheMetadata {
                ttl_ms,
                expires_at: expiry_after(checked_at, ttl_ms)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
                from_cache: false,
            },
        }
    }

    /// Evaluate a single capability.
    pub async fn check(&self, kind: CapabilityKind) -> CapabilityCheckResult {
        let policy = self.config.policy(kind);
        let report: RetryReport = match kind {
            CapabilityKind::ScreenCapture => {
                let probe = self.probes.screen_capture.clone();
                run_with_policy(kind, policy, move || read_screen_capture(probe.clone())).await
            }
            CapabilityKind::ActionExecution => {
                let probe = self.probes.action_execution.clone();
                run_with_policy(kind, policy, move || read_action_execution(probe.clone())).await
            }
            CapabilityKind::McpHealth => {
                let runtime = self.probes.runtime.clone();
                run_with_policy(kind, policy, move || read_runtime_health(runtime.clone())).await
            }
        };

        let missing = match kind {
            CapabilityKind::McpHealth => missing_entrypoints(self.probes.runtime.as_ref()),
            _ => Vec::new(),
        };

        let classification = classify(kind, &report, &missing);
        debug!(
            "{} classified as {:?} ({}) after {} attempt(s)",
            kind,
            classification.state,
            classification.reason_code,
            report.attempts.len()
        );

        CapabilityCheckResult {
            kind,
            state: classification.state,
            reason_code: classification.reason_code,
            message: classification.message,
            detail: classification.detail,
            attempts: report.attempts,
            checked_at: Utc::now(),
        }
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
            message: format!("{kind} {reason}"),
            detail: None,
            attempts: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    fn map(
        screen: (CapabilityState, &str),
        action: (CapabilityState, &str),
        runtime: (CapabilityState, &str),
    ) -> CapabilityMap {
        CapabilityMap {
            screen_capture: result(CapabilityKind::ScreenCapture, screen.0, screen.1),
            action_execution: result(CapabilityKind::ActionExecution, action.0, action.1),
            mcp_health: result(CapabilityKind::McpHealth, runtime.0, runtime.1),
        }
    }

    const OK_SCREEN: (CapabilityState, &str) = (CapabilityState::Ok, "screen_capture_ok");
    const OK_ACTION: (CapabilityState, &str) = (CapabilityState::Ok, "action_execution_ok");
    const OK_RUNTIME: (CapabilityState, &str) = (CapabilityState::Ok, "mcp_health_ok");

    #[test]
    fn test_all_ok_is_ready() {
        let agg = aggregate(&map(OK_SCREEN, OK_ACTION, OK_RUNTIME));
        assert_eq!(agg.status, DesktopControlStatus::Ready);
        assert!(agg.error_code.is_none());
    }

    #[test]
    fn test_screen_denial_wins_over_action_denial() {
        let agg = aggregate(&map(
            (CapabilityState::Unavailable, "screen_capture_permission_denied"),
            (CapabilityState::Unavailable, "action_execution_permission_denied"),
            OK_RUNTIME,
        ));
        assert_eq!(agg.status, DesktopControlStatus::NeedsScreenRecordingPermission);
    }

    #[test]
    fn test_action_denial() {
        let agg = aggregate(&map(
            OK_SCREEN,
            (CapabilityState::Unavailable, "action_execution_permission_denied"),
            (CapabilityState::Unavailable, "mcp_health_probe_timeout"),
        ));
        assert_eq!(agg.status, DesktopControlStatus::NeedsAccessibilityPermission);
    }

    #[test]
    fn test_non_denial_unavailable_is_unhealthy() {
        let agg = aggregate(&map(
            (CapabilityState::Unavailable, "screen_capture_probe_timeout"),
            OK_ACTION,
            OK_RUNTIME,
        ));
        assert_eq!(agg.status, DesktopControlStatus::McpUnhealthy);
        assert_eq!(agg.error_code.as_deref(), Some("screen_capture_probe_timeout"));
    }

    #[test]
    fn test_degraded_runtime_is_unhealthy() {
        let agg = aggregate(&map(
            OK_SCREEN,
            OK_ACTION,
            (CapabilityState::Degraded, "runtime_health_missing_support_entrypoints"),
        ));
        assert_eq!(agg.status, DesktopControlStatus::McpUnhealthy);
    }

    #[test]
    fn test_degraded_permission_is_ready_with_message() {
        let agg = aggregate(&map(
            (CapabilityState::Degraded, "screen_capture_unknown"),
            OK_ACTION,
            OK_RUNTIME,
        ));
        assert_eq!(agg.status, DesktopControlStatus::Ready);
        assert!(agg.message.contains("screen_capture_unknown"));
    }
}
