use anyhow::Result;
use std::sync::Arc;

use desktop_control_bridge::{
    channel, serve, BridgeRouter, ReadinessClient, IPC_INVALID_RESPONSE, IPC_INVOKE_FAILED,
    READINESS_ALIASES, READINESS_REQUEST,
};
use desktop_control_readiness::{ReadinessCache, ReadinessSnapshot};

use crate::config::Config;

/// Canonical request name first, then every alias.
pub fn request_names() -> impl Iterator<Item = &'static str> {
    std::iter::once(READINESS_REQUEST).chain(READINESS_ALIASES.iter().copied())
}

fn is_fallback(snapshot: &ReadinessSnapshot) -> bool {
    matches!(
        snapshot.error_code.as_deref(),
        Some(IPC_INVOKE_FAILED) | Some(IPC_INVALID_RESPONSE)
    )
}

/// Serve the bridge over an in-process channel and call it under every name.
pub async fn exercise(cache: Arc<ReadinessCache>) -> Result<Vec<(String, ReadinessSnapshot)>> {
    let router = Arc::new(BridgeRouter::new(cache));
    let (transport, receiver) = channel(16);
    let server = tokio::spawn(serve(router, receiver));

    let mut responses = Vec::new();
    for name in request_names() {
        let snapshot = ReadinessClient::new(transport.clone())
            .with_request_name(name)
            .get_readiness(false)
            .await;
        tracing::debug!("{} -> {}", name, snapshot.status);
        responses.push((name.to_string(), snapshot));
    }
    drop(transport);

    server.await?;
    Ok(responses)
}

pub async fn run(config: &Config) -> Result<()> {
    println!("🔌 Desktop Control Bridge\n");

    let cache = crate::build_cache(config)?;
    let responses = exercise(cache).await?;

    let mut fallbacks = 0;
    for (name, snapshot) in &responses {
        let mark = if is_fallback(snapshot) {
            fallbacks += 1;
            "✗"
        } else {
            "✓"
        };
        println!(
            "{} {:<40} {:<34} fromCache={:<5} checkedAt={}",
            mark,
            name,
            snapshot.status,
            snapshot.cache.from_cache,
            snapshot.checked_at.to_rfc3339()
        );
    }

    if fallbacks > 0 {
        anyhow::bail!("{} of {} bridge call(s) fell back", fallbacks, responses.len());
    }
    println!("\n✅ All {} request names answered", responses.len());
    Ok(())
}
