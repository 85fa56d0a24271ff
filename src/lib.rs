// src/lib.rs
// Public library surface for embedders and integration tests.

pub mod clock;
pub mod config;
pub mod metrics;
pub mod rolling;

// ---- Re-exports for stable public API ----
pub use crate::clock::{ManualClock, SystemClock, TimeSource};
pub use crate::config::WindowConfig;
pub use crate::rolling::{
    Observation, WindowStats, WindowedMean, DEFAULT_WINDOW_MS, DEFAULT_WINDOW_NAME,
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a compact `tracing` subscriber filtered by `RUST_LOG`
/// (default `window_mean=info,warn`).
///
/// Safe to call more than once; only the first call installs anything.
/// Embedders that already own a subscriber should skip this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("window_mean=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
