//! Metric names and emission helpers for the windowed accumulator.
//!
//! Everything goes through the `metrics` facade. Without an installed
//! recorder these calls are no-ops; embedders pick the exporter.
//!
//! Every series carries a `window` label holding the instance name, so
//! several windows in one process report separately.

use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use std::sync::Once;

pub const RECORDS_TOTAL: &str = "window_mean_records_total";
pub const EVICTIONS_TOTAL: &str = "window_mean_evictions_total";
pub const OBSERVATIONS: &str = "window_mean_observations";
pub const WINDOW_MS: &str = "window_mean_window_ms";
pub const WINDOW_LABEL: &str = "window";

static DESCRIBE: Once = Once::new();

/// Register descriptions once per process.
pub fn describe() {
    DESCRIBE.call_once(|| {
        describe_counter!(RECORDS_TOTAL, Unit::Count, "Observations recorded");
        describe_counter!(
            EVICTIONS_TOTAL,
            Unit::Count,
            "Observations evicted after leaving the window"
        );
        describe_gauge!(
            OBSERVATIONS,
            Unit::Count,
            "Observations currently inside the window"
        );
        describe_gauge!(WINDOW_MS, Unit::Milliseconds, "Configured window length");
    });
}

pub(crate) fn window_configured(window: &str, window_ms: i64) {
    describe();
    gauge!(WINDOW_MS, WINDOW_LABEL => window.to_owned()).set(window_ms as f64);
}

pub(crate) fn recorded(window: &str, len: usize) {
    counter!(RECORDS_TOTAL, WINDOW_LABEL => window.to_owned()).increment(1);
    gauge!(OBSERVATIONS, WINDOW_LABEL => window.to_owned()).set(len as f64);
}

pub(crate) fn evicted(window: &str, n: usize, len: usize) {
    if n == 0 {
        return;
    }
    counter!(EVICTIONS_TOTAL, WINDOW_LABEL => window.to_owned()).increment(n as u64);
    gauge!(OBSERVATIONS, WINDOW_LABEL => window.to_owned()).set(len as f64);
}
