use anyhow::Result;

use desktop_control_readiness::{require_ready, CapabilityState};

use crate::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    println!("🏥 Desktop Control Readiness\n");

    let cache = crate::build_cache(config)?;
    let snapshot = cache.get(true).await;

    for result in snapshot.capabilities.iter() {
        let mark = match result.state {
            CapabilityState::Ok => "✓",
            CapabilityState::Degraded => "!",
            CapabilityState::Unavailable => "✗",
        };
        println!(
            "{} {:<17} {:<45} ({} attempt(s))",
            mark,
            result.kind,
            result.reason_code,
            result.attempts.len()
        );
    }

    println!("\nStatus: {}", snapshot.status);
    println!("{}", snapshot.message);

    if let Err(blocked) = require_ready(&snapshot) {
        if let Some(remediation) = &blocked.remediation {
            println!("\n💡 {}", remediation.title);
            for (i, step) in remediation.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
        return Err(blocked.into());
    }

    println!("\n✅ Desktop control is ready");
    Ok(())
}
