//! Host probes for Wayland desktops.
//!
//! Screen capture goes through `grim` and input injection through `ydotool`
//! or `wtype`, the same tools the desktop actions shell out to.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;

use desktop_control_readiness::{
    AccessibilityProbe, MediaAccessStatus, ProbeError, ScreenCaptureProbe,
};

pub const SCREEN_CAPTURE_BACKENDS: &[&str] = &["grim"];
pub const INPUT_BACKENDS: &[&str] = &["ydotool", "wtype"];
pub const SESSION_ENV: &str = "WAYLAND_DISPLAY";

/// Environment and `PATH` lookups the host probes depend on.
#[async_trait]
pub trait HostLookup: Send + Sync {
    fn env_present(&self, name: &str) -> bool;

    async fn command_exists(&self, command: &str) -> Result<bool, ProbeError>;
}

/// Lookups against the real process environment.
pub struct SystemHost;

#[async_trait]
impl HostLookup for SystemHost {
    fn env_present(&self, name: &str) -> bool {
        std::env::var_os(name).is_some_and(|value| !value.is_empty())
    }

    async fn command_exists(&self, command: &str) -> Result<bool, ProbeError> {
        let output = Command::new("which").arg(command).output().await?;
        Ok(output.status.success())
    }
}

async fn any_installed(host: &dyn HostLookup, backends: &[&str]) -> Result<bool, ProbeError> {
    for backend in backends {
        if host.command_exists(backend).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `granted` with a Wayland session and `grim` installed, `not_determined`
/// without a session. A session with no capture backend is a probe error.
pub struct WaylandScreenProbe {
    host: Arc<dyn HostLookup>,
}

impl WaylandScreenProbe {
    pub fn new() -> Self {
        Self::with_host(Arc::new(SystemHost))
    }

    pub fn with_host(host: Arc<dyn HostLookup>) -> Self {
        Self { host }
    }
}

impl Default for WaylandScreenProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenCaptureProbe for WaylandScreenProbe {
    async fn media_access_status(&self) -> Result<MediaAccessStatus, ProbeError> {
        if !self.host.env_present(SESSION_ENV) {
            return Ok(MediaAccessStatus::NotDetermined);
        }
        if any_installed(self.host.as_ref(), SCREEN_CAPTURE_BACKENDS).await? {
            return Ok(MediaAccessStatus::Granted);
        }
        Err(ProbeError::Platform(format!(
            "no screen capture backend found ({})",
            SCREEN_CAPTURE_BACKENDS.join(", ")
        )))
    }
}

/// Input actions are trusted when `ydotool` or `wtype` is installed.
pub struct InputBackendProbe {
    host: Arc<dyn HostLookup>,
}

impl InputBackendProbe {
    pub fn new() -> Self {
        Self::with_host(Arc::new(SystemHost))
    }

    pub fn with_host(host: Arc<dyn HostLookup>) -> Self {
        Self { host }
    }
}

impl Default for InputBackendProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessibilityProbe for InputBackendProbe {
    async fn is_trusted(&self) -> Result<bool, ProbeError> {
        any_installed(self.host.as_ref(), INPUT_BACKENDS).await
    }
}
