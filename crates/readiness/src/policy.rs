//! Per-capability timeout/retry policy and evaluator configuration.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::CapabilityKind;

pub const DEFAULT_CACHE_TTL_MS: u64 = 5_000;

/// `checked_at + ttl_ms`, or `None` when the result is not a representable date.
pub fn expiry_after(checked_at: DateTime<Utc>, ttl_ms: u64) -> Option<DateTime<Utc>> {
    let ttl_ms = i64::try_from(ttl_ms).ok()?;
    checked_at.checked_add_signed(TimeDelta::try_milliseconds(ttl_ms)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(timeout_ms: u64, max_attempts: u32) -> Self {
        Self {
            timeout_ms,
            max_attempts,
            retry_delay_ms: 0,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn default_for(kind: CapabilityKind) -> Self {
        match kind {
            // Permission queries are cheap but can stall while a system dialog is up.
            CapabilityKind::ScreenCapture | CapabilityKind::ActionExecution => {
                Self::new(2_000, 2).with_retry_delay(100)
            }
            CapabilityKind::McpHealth => Self::new(3_000, 1),
        }
    }

    pub fn validate(&self, kind: CapabilityKind) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidPolicy {
                capability: kind.to_string(),
                reason: "timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidPolicy {
                capability: kind.to_string(),
                reason: "max_attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Policies for all capabilities plus the cache TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    pub cache_ttl_ms: u64,
    pub screen_capture: RetryPolicy,
    pub action_execution: RetryPolicy,
    pub mcp_health: RetryPolicy,
}

impl ReadinessConfig {
    pub fn policy(&self, kind: CapabilityKind) -> RetryPolicy {
        match kind {
            CapabilityKind::ScreenCapture => self.screen_capture,
            CapabilityKind::ActionExecution => self.action_execution,
            CapabilityKind::McpHealth => self.mcp_health,
        }
    }

    /// Same policy for every capability. Mostly useful in tests.
    pub fn uniform(policy: RetryPolicy, cache_ttl_ms: u64) -> Self {
        Self {
            cache_ttl_ms,
            screen_capture: policy,
            action_execution: policy,
            mcp_health: policy,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in CapabilityKind::ALL {
            self.policy(kind).validate(kind)?;
        }
        if expiry_after(Utc::now(), self.cache_ttl_ms).is_none() {
            return Err(ConfigError::InvalidTtl(format!(
                "{}ms is out of range",
                self.cache_ttl_ms
            )));
        }
        Ok(())
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            screen_capture: RetryPolicy::default_for(CapabilityKind::ScreenCapture),
            action_execution: RetryPolicy::default_for(CapabilityKind::ActionExecution),
            mcp_health: RetryPolicy::default_for(CapabilityKind::McpHealth),
        }
    }
}
