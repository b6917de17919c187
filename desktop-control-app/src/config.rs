use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use desktop_control_readiness::{
    CapabilityKind, ConfigError, ReadinessConfig, RetryPolicy, DEFAULT_CACHE_TTL_MS,
};

pub const DEFAULT_CONFIG_PATH: &str = "desktop-control.yaml";
pub const RUNTIME_ROOT_ENV: &str = "DESKTOP_CONTROL_RUNTIME_ROOT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default)]
    pub runtime_root: Option<PathBuf>,
    #[serde(default = "default_runtime_executable")]
    pub runtime_executable: String,
    #[serde(default)]
    pub policies: PolicyOverrides,
}

/// Per-capability policy overrides. Unset entries keep the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyOverrides {
    #[serde(default)]
    pub screen_capture: Option<RetryPolicy>,
    #[serde(default)]
    pub action_execution: Option<RetryPolicy>,
    #[serde(default)]
    pub mcp_health: Option<RetryPolicy>,
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_runtime_executable() -> String {
    "python3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_ms: default_cache_ttl_ms(),
            runtime_root: None,
            runtime_executable: default_runtime_executable(),
            policies: PolicyOverrides::default(),
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime_executable.trim().is_empty() {
            return Err(ConfigError::InvalidPolicy {
                capability: CapabilityKind::McpHealth.to_string(),
                reason: "runtime_executable cannot be empty".to_string(),
            });
        }
        self.readiness_config().validate()
    }

    pub fn readiness_config(&self) -> ReadinessConfig {
        let defaults = ReadinessConfig::default();
        ReadinessConfig {
            cache_ttl_ms: self.cache_ttl_ms,
            screen_capture: self.policies.screen_capture.unwrap_or(defaults.screen_capture),
            action_execution: self
                .policies
                .action_execution
                .unwrap_or(defaults.action_execution),
            mcp_health: self.policies.mcp_health.unwrap_or(defaults.mcp_health),
        }
    }

    /// Environment override, then config, then the per-user data directory.
    pub fn resolved_runtime_root(&self) -> PathBuf {
        if let Some(root) = std::env::var_os(RUNTIME_ROOT_ENV) {
            return PathBuf::from(root);
        }
        if let Some(root) = &self.runtime_root {
            return root.clone();
        }
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(".local/share/desktop-control/runtime")
    }
}
