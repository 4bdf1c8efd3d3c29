//! Logging setup
//! Console logging through tracing-subscriber, filtered by `RUST_LOG`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,eframe=warn,egui_glow=warn,winit=warn,wgpu=warn";

/// Install the global subscriber. Safe to call once per process.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot initialize tracing subscriber: {}", e))?;

    Ok(())
}
