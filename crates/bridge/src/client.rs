//! Caller side of the bridge. Never fails: transport problems become a
//! well-formed `unknown` snapshot.

use chrono::Utc;
use serde_json::{json, Value};
use tokio::time::{timeout, Duration};
use tracing::warn;

use desktop_control_readiness::remediation::remediation_for;
use desktop_control_readiness::{
    CacheMetadata, CapabilityCheckResult, CapabilityKind, CapabilityMap, CapabilityState,
    DesktopControlStatus, ReadinessSnapshot,
};

use crate::router::READINESS_REQUEST;
use crate::transport::{Transport, TransportError};

pub const IPC_INVOKE_FAILED: &str = "desktop_control_ipc_invoke_failed";
pub const IPC_INVALID_RESPONSE: &str = "desktop_control_ipc_invalid_response";

pub struct ReadinessClient<T: Transport> {
    transport: T,
    request_name: String,
    invoke_timeout: Option<Duration>,
}

impl<T: Transport> ReadinessClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            request_name: READINESS_REQUEST.to_string(),
            invoke_timeout: None,
        }
    }

    /// Send requests under an alias instead of the canonical name.
    pub fn with_request_name(mut self, name: impl Into<String>) -> Self {
        self.request_name = name.into();
        self
    }

    /// Bound each round trip.
    pub fn with_timeout(mut self, invoke_timeout: Duration) -> Self {
        self.invoke_timeout = Some(invoke_timeout);
        self
    }

    pub async fn get_readiness(&self, force_refresh: bool) -> ReadinessSnapshot {
        let payload = json!({ "forceRefresh": force_refresh });

        let response = match self.invoke(payload).await {
            Ok(value) => value,
            Err(err) => {
                warn!("Readiness IPC invocation failed: {}", err);
                return fallback_snapshot(
                    IPC_INVOKE_FAILED,
                    &format!("Desktop control IPC invocation failed: {err}"),
                    &err.to_string(),
                );
            }
        };

        match serde_json::from_value::<ReadinessSnapshot>(response) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Readiness IPC returned an unreadable snapshot: {}", err);
                fallback_snapshot(
                    IPC_INVALID_RESPONSE,
                    &format!("Desktop control IPC returned an invalid response: {err}"),
                    &err.to_string(),
                )
            }
        }
    }

    async fn invoke(&self, payload: Value) -> Result<Value, TransportError> {
        let call = self.transport.invoke(&self.request_name, payload);
        match self.invoke_timeout {
            Some(bound) => timeout(bound, call)
                .await
                .map_err(|_| TransportError::Timeout(bound.as_millis() as u64))?,
            None => call.await,
        }
    }
}

/// Snapshot reported when the bridge itself failed. Every capability carries
/// the same error code and the cause as structured detail.
pub fn fallback_snapshot(error_code: &str, message: &str, cause: &str) -> ReadinessSnapshot {
    let now = Utc::now();
    let result = |kind: CapabilityKind| CapabilityCheckResult {
        kind,
        state: CapabilityState::Unavailable,
        reason_code: error_code.to_string(),
        message: message.to_string(),
        detail: Some(json!({ "error": cause })),
        attempts: Vec::new(),
        checked_at: now,
    };

    ReadinessSnapshot {
        status: DesktopControlStatus::Unknown,
        error_code: Some(error_code.to_string()),
        message: message.to_string(),
        remediation: remediation_for(DesktopControlStatus::Unknown),
        capabilities: CapabilityMap {
            screen_capture: result(CapabilityKind::ScreenCapture),
            action_execution: result(CapabilityKind::ActionExecution),
            mcp_health: result(CapabilityKind::McpHealth),
        },
        checked_at: now,
        cache: CacheMetadata {
            ttl_ms: 0,
            expires_at: now,
            from_cache: false,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let snapshot = fallback_snapshot(
            IPC_INVOKE_FAILED,
            "Desktop control IPC invocation failed: boom",
            "boom",
        );
        assert_eq!(snapshot.status, DesktopControlStatus::Unknown);
        assert_eq!(snapshot.error_code.as_deref(), Some(IPC_INVOKE_FAILED));
        assert!(snapshot.message.contains("IPC"));
        for result in snapshot.capabilities.iter() {
            assert_eq!(result.reason_code, IPC_INVOKE_FAILED);
            assert_eq!(result.detail.as_ref().unwrap()["error"], "boom");
        }
        assert!(snapshot.remediation.is_some());
    }
}
