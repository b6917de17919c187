use anyhow::Result;
use std::sync::Arc;

use desktop_control_bridge::{channel, serve, BridgeRouter, ReadinessClient};

use crate::config::Config;

/// Fetch readiness through the bridge and print the snapshot as JSON.
pub async fn run(config: &Config, force_refresh: bool, request_name: Option<&str>) -> Result<()> {
    let cache = crate::build_cache(config)?;
    let router = Arc::new(BridgeRouter::new(cache));

    let (transport, receiver) = channel(16);
    let server = tokio::spawn(serve(router, receiver));

    let mut client = ReadinessClient::new(transport);
    if let Some(name) = request_name {
        client = client.with_request_name(name);
    }
    let snapshot = client.get_readiness(force_refresh).await;
    drop(client);

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    server.await?;
    Ok(())
}
