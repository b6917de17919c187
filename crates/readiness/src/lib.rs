//! Desktop control readiness.
//!
//! Decides, before any automated screen interaction, whether the host grants
//! screen capture and input-action permissions and whether the background
//! runtime is healthy.

pub mod cache;
pub mod classifier;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod preflight;
pub mod probe;
pub mod remediation;
pub mod retry;
pub mod types;

pub use cache::{CachedEntry, ReadinessCache};
pub use classifier::{
    classify, Classification, Reason, MISSING_SUPPORT_ENTRYPOINTS, RUNTIME_UNAVAILABLE,
};
pub use error::{ConfigError, PreflightError, ProbeError};
pub use evaluator::{aggregate, Aggregate, ReadinessEvaluator};
pub use policy::{expiry_after, ReadinessConfig, RetryPolicy, DEFAULT_CACHE_TTL_MS};
pub use preflight::require_ready;
pub use probe::{
    AccessibilityProbe, FsRuntimeEnvironment, MediaAccessStatus, ProbeReading, ProbeSet,
    ProbeVerdict, RuntimeEnvironment, ScreenCaptureProbe, REQUIRED_ENTRYPOINTS,
};
pub use retry::{run_with_policy, RetryReport};
pub use types::*;
