//! Demo that feeds one shared window from several producer threads while a
//! reader logs the running mean.
//!
//! Knobs (env or `.env`): `WINDOW_MEAN_MS`, `DEMO_THREADS`, `DEMO_DURATION_MS`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use rand::Rng;
use tracing::info;
use window_mean::{SystemClock, WindowConfig, WindowStats, WindowedMean};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Final line, built from one snapshot so mean and count always agree.
fn summary(stats: Option<WindowStats>) -> String {
    match stats {
        Some(st) => format!(
            "window-demo done: mean={:.3} over {} values",
            st.mean, st.count
        ),
        None => "window-demo done: window empty".to_string(),
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; harmless when absent.
    let _ = dotenvy::dotenv();
    window_mean::init_tracing();

    let cfg = WindowConfig::load_default().context("loading window config")?;
    let threads: usize = env_or("DEMO_THREADS", 4);
    let duration_ms: u64 = env_or("DEMO_DURATION_MS", 2_000);

    let window = WindowedMean::from_config(SystemClock, &cfg)?;
    let done = AtomicBool::new(false);
    info!(window_ms = window.window_ms(), threads, duration_ms, "demo starting");

    thread::scope(|s| {
        for id in 0..threads {
            let window = &window;
            let done = &done;
            s.spawn(move || {
                let mut rng = rand::rng();
                let mut n = 0u64;
                while !done.load(Ordering::Relaxed) {
                    window.record(rng.random_range(0..=100));
                    n += 1;
                    thread::sleep(Duration::from_millis(rng.random_range(1..=10)));
                }
                info!(producer = id, recorded = n, "producer finished");
            });
        }

        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                match window.stats() {
                    Some(st) => info!(mean = st.mean, count = st.count, "window"),
                    None => info!("window empty"),
                }
                thread::sleep(Duration::from_millis(250));
            }
        });

        thread::sleep(Duration::from_millis(duration_ms));
        done.store(true, Ordering::Relaxed);
    });

    println!("{}", summary(window.stats()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_single_snapshot() {
        let st = WindowStats {
            mean: 2.5,
            count: 4,
            sum: 10,
        };
        assert_eq!(
            summary(Some(st)),
            "window-demo done: mean=2.500 over 4 values"
        );
        assert_eq!(summary(None), "window-demo done: window empty");
    }
}
