//! Request-name table and dispatch on the serving side.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use desktop_control_readiness::ReadinessCache;

pub const READINESS_REQUEST: &str = "desktop_control.get_readiness";

/// Older names still sent by some callers. All resolve to the same operation.
pub const READINESS_ALIASES: &[&str] = &[
    "desktop-control:get-readiness",
    "get_desktop_control_status",
    "check_desktop_control_readiness",
];

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BridgeError {
    #[error("Unknown request: {0}")]
    UnknownRequest(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetReadiness,
}

impl Operation {
    /// Resolve an external request name.
    pub fn resolve(name: &str) -> Option<Self> {
        if name == READINESS_REQUEST || READINESS_ALIASES.contains(&name) {
            return Some(Operation::GetReadiness);
        }
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessRequest {
    #[serde(default)]
    pub force_refresh: bool,
}

impl ReadinessRequest {
    pub fn from_payload(payload: Value) -> Result<Self, BridgeError> {
        if payload.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(payload).map_err(|e| BridgeError::InvalidPayload(e.to_string()))
    }
}

pub struct BridgeRouter {
    cache: Arc<ReadinessCache>,
}

impl BridgeRouter {
    pub fn new(cache: Arc<ReadinessCache>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, name: &str, payload: Value) -> Result<Value, BridgeError> {
        let operation = Operation::resolve(name).ok_or_else(|| {
            warn!("Rejecting unknown bridge request: {}", name);
            BridgeError::UnknownRequest(name.to_string())
        })?;

        match operation {
            Operation::GetReadiness => {
                let request = ReadinessRequest::from_payload(payload)?;
                debug!(
                    "Handling {} as {} (force_refresh={})",
                    name, READINESS_REQUEST, request.force_refresh
                );
                let snapshot = self.cache.get(request.force_refresh).await;
                serde_json::to_value(&snapshot)
                    .map_err(|e| BridgeError::Serialization(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_names_resolve_to_one_operation() {
        assert_eq!(Operation::resolve(READINESS_REQUEST), Some(Operation::GetReadiness));
        assert!(READINESS_ALIASES.len() >= 2);
        for alias in READINESS_ALIASES {
            assert_eq!(Operation::resolve(alias), Some(Operation::GetReadiness));
        }
        assert_eq!(Operation::resolve("desktop_control.take_screenshot"), None);
    }

    #[test]
    fn test_request_payload_parsing() {
        assert_eq!(
            ReadinessRequest::from_payload(Value::Null).unwrap(),
            ReadinessRequest::default()
        );
        assert!(ReadinessRequest::from_payload(json!({})).unwrap() == ReadinessRequest::default());
        assert!(ReadinessRequest::from_payload(json!({"forceRefresh": true}))
            .unwrap()
            .force_refresh);
        assert!(matches!(
            ReadinessRequest::from_payload(json!({"forceRefresh": "yes"})),
            Err(BridgeError::InvalidPayload(_))
        ));
    }
}
