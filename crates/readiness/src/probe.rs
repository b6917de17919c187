//! Injected capability probes.
//!
//! The evaluator never talks to the OS directly. Every platform query goes
//! through one of these traits so it can be swapped for a mock in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ProbeError;

/// Runtime entrypoints that must exist under the runtime root, relative to it.
pub const REQUIRED_ENTRYPOINTS: &[&str] = &[
    "desktop_control_server.py",
    "support/screen_capture.py",
    "support/action_runner.py",
    "support/file_permissions.py",
];

/// Media access status as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaAccessStatus {
    Granted,
    Denied,
    NotDetermined,
    Restricted,
    Other(String),
}

impl MediaAccessStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "granted" => MediaAccessStatus::Granted,
            "denied" => MediaAccessStatus::Denied,
            "not_determined" => MediaAccessStatus::NotDetermined,
            "restricted" => MediaAccessStatus::Restricted,
            _ => MediaAccessStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaAccessStatus::Granted => "granted",
            MediaAccessStatus::Denied => "denied",
            MediaAccessStatus::NotDetermined => "not_determined",
            MediaAccessStatus::Restricted => "restricted",
            MediaAccessStatus::Other(raw) => raw,
        }
    }
}

/// What a probe concluded when it resolved in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    Granted,
    Denied,
    Indeterminate,
    Unavailable,
}

/// A resolved probe: its verdict plus the raw value it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReading {
    pub verdict: ProbeVerdict,
    pub raw: Value,
}

impl ProbeReading {
    pub fn new(verdict: ProbeVerdict, raw: Value) -> Self {
        Self { verdict, raw }
    }

    pub fn is_success(&self) -> bool {
        self.verdict == ProbeVerdict::Granted
    }
}

/// Screen recording permission query.
#[async_trait]
pub trait ScreenCaptureProbe: Send + Sync {
    async fn media_access_status(&self) -> Result<MediaAccessStatus, ProbeError>;
}

/// Input-action (accessibility) trust query.
#[async_trait]
pub trait AccessibilityProbe: Send + Sync {
    async fn is_trusted(&self) -> Result<bool, ProbeError>;
}

/// Filesystem view of the background runtime.
#[async_trait]
pub trait RuntimeEnvironment: Send + Sync {
    /// Directory holding the runtime entrypoints.
    fn runtime_root(&self) -> PathBuf;

    fn exists(&self, path: &Path) -> bool;

    /// Resolve the interpreter the runtime is launched with.
    async fn resolve_executable(&self) -> Result<Option<PathBuf>, ProbeError>;
}

/// The three injected dependencies, one per capability.
#[derive(Clone)]
pub struct ProbeSet {
    pub screen_capture: Arc<dyn ScreenCaptureProbe>,
    pub action_execution: Arc<dyn AccessibilityProbe>,
    pub runtime: Arc<dyn RuntimeEnvironment>,
}

impl ProbeSet {
    pub fn new(
        screen_capture: Arc<dyn ScreenCaptureProbe>,
        action_execution: Arc<dyn AccessibilityProbe>,
        runtime: Arc<dyn RuntimeEnvironment>,
    ) -> Self {
        Self {
            screen_capture,
            action_execution,
            runtime,
        }
    }
}

pub async fn read_screen_capture(
    probe: Arc<dyn ScreenCaptureProbe>,
) -> Result<ProbeReading, ProbeError> {
    let status = probe.media_access_status().await?;
    let verdict = match status {
        MediaAccessStatus::Granted => ProbeVerdict::Granted,
        MediaAccessStatus::Denied => ProbeVerdict::Denied,
        _ => ProbeVerdict::Indeterminate,
    };
    Ok(ProbeReading::new(verdict, json!(status.as_str())))
}

pub async fn read_action_execution(
    probe: Arc<dyn AccessibilityProbe>,
) -> Result<ProbeReading, ProbeError> {
    let trusted = probe.is_trusted().await?;
    let verdict = if trusted {
        ProbeVerdict::Granted
    } else {
        ProbeVerdict::Denied
    };
    Ok(ProbeReading::new(verdict, json!(trusted)))
}

pub async fn read_runtime_health(
    runtime: Arc<dyn RuntimeEnvironment>,
) -> Result<ProbeReading, ProbeError> {
    match runtime.resolve_executable().await? {
        Some(path) => Ok(ProbeReading::new(
            ProbeVerdict::Granted,
            json!(path.display().to_string()),
        )),
        None => Ok(ProbeReading::new(ProbeVerdict::Unavailable, Value::Null)),
    }
}

/// Required entrypoints absent under the runtime root. Structural and not retried.
pub fn missing_entrypoints(runtime: &dyn RuntimeEnvironment) -> Vec<String> {
    let root = runtime.runtime_root();
    REQUIRED_ENTRYPOINTS
        .iter()
        .filter(|entry| !runtime.exists(&root.join(entry)))
        .map(|entry| entry.to_string())
        .collect()
}

/// Runtime environment backed by the real filesystem and `PATH`.
pub struct FsRuntimeEnvironment {
    root: PathBuf,
    executable: String,
}

impl FsRuntimeEnvironment {
    pub fn new(root: impl Into<PathBuf>, executable: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            executable: executable.into(),
        }
    }
}

#[async_trait]
impl RuntimeEnvironment for FsRuntimeEnvironment {
    fn runtime_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    async fn resolve_executable(&self) -> Result<Option<PathBuf>, ProbeError> {
        let candidate = Path::new(&self.executable);
        if candidate.is_absolute() {
            return Ok(candidate.is_file().then(|| candidate.to_path_buf()));
        }

        let Some(path_var) = std::env::var_os("PATH") else {
            return Ok(None);
        };
        let found = std::env::split_paths(&path_var)
            .map(|dir| dir.join(&self.executable))
            .find(|full| full.is_file());
        Ok(found)
    }
}
