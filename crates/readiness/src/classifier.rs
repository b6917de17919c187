//! Maps attempt sequences and structural facts to capability states.

use serde_json::{json, Value};

use crate::probe::ProbeVerdict;
use crate::retry::RetryReport;
use crate::types::{CapabilityKind, CapabilityState};

pub const MISSING_SUPPORT_ENTRYPOINTS: &str = "runtime_health_missing_support_entrypoints";
pub const RUNTIME_UNAVAILABLE: &str = "mcp_health_runtime_unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Ok,
    PermissionDenied,
    MissingSupportEntrypoints,
    ProbeTimeout,
    ProbeError,
    Unknown,
    RuntimeUnavailable,
}

impl Reason {
    /// Stable token for this reason. Structural runtime reasons are not
    /// capability-scoped.
    pub fn code(&self, kind: CapabilityKind) -> String {
        match self {
            Reason::Ok => format!("{kind}_ok"),
            Reason::PermissionDenied => format!("{kind}_permission_denied"),
            Reason::MissingSupportEntrypoints => MISSING_SUPPORT_ENTRYPOINTS.to_string(),
            Reason::ProbeTimeout => format!("{kind}_probe_timeout"),
            Reason::ProbeError => format!("{kind}_probe_error"),
            Reason::Unknown => format!("{kind}_unknown"),
            Reason::RuntimeUnavailable => RUNTIME_UNAVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub state: CapabilityState,
    pub reason: Reason,
    pub reason_code: String,
    pub message: String,
    pub detail: Option<Value>,
}

fn subject(kind: CapabilityKind) -> &'static str {
    match kind {
        CapabilityKind::ScreenCapture => "Screen recording permission",
        CapabilityKind::ActionExecution => "Accessibility permission",
        CapabilityKind::McpHealth => "Desktop control runtime",
    }
}

/// Classify one capability.
///
/// Precedence when several conditions hold: explicit denial, then missing
/// structural prerequisites, then timeout exhaustion, then probe errors,
/// then the resolved verdict.
pub fn classify(
    kind: CapabilityKind,
    report: &RetryReport,
    missing_entrypoints: &[String],
) -> Classification {
    let verdict = report.reading.as_ref().map(|reading| reading.verdict);
    let attempts = report.attempts.len();

    let (state, reason, message, detail) = if verdict == Some(ProbeVerdict::Denied) {
        (
            CapabilityState::Unavailable,
            Reason::PermissionDenied,
            format!("{} was denied", subject(kind)),
            report.reading.as_ref().map(|r| json!({ "raw": r.raw })),
        )
    } else if !missing_entrypoints.is_empty() {
        (
            CapabilityState::Degraded,
            Reason::MissingSupportEntrypoints,
            format!(
                "{} is missing required entrypoints: {}",
                subject(kind),
                missing_entrypoints.join(", ")
            ),
            Some(json!({ "missingEntrypoints": missing_entrypoints })),
        )
    } else if verdict.is_none() && report.timed_out() {
        (
            CapabilityState::Unavailable,
            Reason::ProbeTimeout,
            format!(
                "{} check timed out after {} attempt(s)",
                subject(kind),
                attempts
            ),
            Some(json!({ "attempts": attempts, "lastError": report.last_detail() })),
        )
    } else if verdict.is_none() {
        (
            CapabilityState::Unavailable,
            Reason::ProbeError,
            format!("{} check failed after {} attempt(s)", subject(kind), attempts),
            Some(json!({ "attempts": attempts, "lastError": report.last_detail() })),
        )
    } else if verdict == Some(ProbeVerdict::Indeterminate) {
        (
            CapabilityState::Degraded,
            Reason::Unknown,
            format!("{} status could not be determined", subject(kind)),
            report.reading.as_ref().map(|r| json!({ "raw": r.raw })),
        )
    } else if verdict == Some(ProbeVerdict::Unavailable) {
        (
            CapabilityState::Unavailable,
            Reason::RuntimeUnavailable,
            format!("{} is not available on this host", subject(kind)),
            report.reading.as_ref().map(|r| json!({ "raw": r.raw })),
        )
    } else {
        (
            CapabilityState::Ok,
            Reason::Ok,
            format!("{} is available", subject(kind)),
            None,
        )
    };

    Classification {
        state,
        reason,
        reason_code: reason.code(kind),
        message,
        detail,
    }
}
