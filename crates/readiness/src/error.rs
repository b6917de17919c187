use thiserror::Error;

use crate::types::{DesktopControlStatus, Remediation};

/// Errors a probe may raise. These never leave the retry executor; they are
/// recorded as `error` attempts.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("Platform query failed: {0}")]
    Platform(String),

    #[error("Runtime check failed: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err.to_string())
    }
}

/// Malformed configuration. Fatal at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid retry policy for {capability}: {reason}")]
    InvalidPolicy { capability: String, reason: String },

    #[error("Invalid cache TTL: {0}")]
    InvalidTtl(String),
}

/// Returned by the preflight gate when desktop control must not proceed.
#[derive(Error, Debug, Clone)]
#[error("Desktop control not ready ({status}): {message}")]
pub struct PreflightError {
    pub status: DesktopControlStatus,
    pub reason_codes: Vec<String>,
    pub message: String,
    pub remediation: Option<Remediation>,
}
