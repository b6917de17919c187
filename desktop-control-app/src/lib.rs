pub mod cli;
pub mod commands;
pub mod config;
pub mod host;
pub mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;

use desktop_control_readiness::{FsRuntimeEnvironment, ProbeSet, ReadinessCache, ReadinessEvaluator};

use config::Config;
use host::{InputBackendProbe, WaylandScreenProbe};

/// Wire host probes, evaluator and cache from configuration.
pub fn build_cache(config: &Config) -> Result<Arc<ReadinessCache>> {
    let runtime_root = config.resolved_runtime_root();
    tracing::debug!("Runtime root: {}", runtime_root.display());

    let probes = ProbeSet::new(
        Arc::new(WaylandScreenProbe::new()),
        Arc::new(InputBackendProbe::new()),
        Arc::new(FsRuntimeEnvironment::new(
            runtime_root,
            config.runtime_executable.clone(),
        )),
    );

    let evaluator = ReadinessEvaluator::new(probes, config.readiness_config())
        .context("Invalid readiness configuration")?;
    Ok(Arc::new(ReadinessCache::new(Arc::new(evaluator))))
}
