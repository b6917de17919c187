use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber. Level comes from `RUST_LOG`, default `info`.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,desktop_control_readiness=info"));

    let layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}
