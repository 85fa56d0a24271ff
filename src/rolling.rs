//! # Rolling Window
//! Running mean over a trailing time window (default 5 minutes).
//!
//! Collects `(value, timestamp)` observations in arrival order and keeps a
//! running sum next to them, so a mean query is `sum / len` instead of a
//! scan. Both `record` and every read evict expired observations first,
//! which is why an idle window correctly reports itself empty.
//!
//! Locking: the buffer and the sum live behind one `RwLock`. `record` does
//! append, sum update and eviction under a single write guard. Reads evict
//! under a write guard, release it, then take a read guard for the
//! `(sum, len)` snapshot. Another writer may slip in between; eviction is
//! idempotent and the snapshot is still taken atomically, so the result
//! only ever reflects a slightly later state, never a torn one.

use std::{
    collections::VecDeque,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use anyhow::ensure;
use tracing::{debug, trace, warn};

use crate::clock::{SystemClock, TimeSource};
use crate::config::WindowConfig;
use crate::metrics;

/// 5 minutes.
pub const DEFAULT_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Instance name used for logs and metric labels when none is given.
pub const DEFAULT_WINDOW_NAME: &str = "default";

/// One recorded value tagged with the instant it was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub value: i32,
    pub ts_ms: i64,
}

/// Snapshot of a non-empty window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub count: usize,
    pub sum: i64,
}

/// Thread-safe running mean over the last `window_ms` milliseconds.
#[derive(Debug)]
pub struct WindowedMean<C = SystemClock> {
    inner: RwLock<Inner>,
    clock: C,
    window_ms: i64,
    name: String,
}

#[derive(Debug, Default)]
struct Inner {
    /// Oldest first; timestamps never decrease towards the back.
    buf: VecDeque<Observation>,
    /// Always equals the sum of `buf` values outside a write guard.
    sum: i64,
}

impl Inner {
    /// Drop observations strictly older than `now_ms - window_ms`.
    /// An observation exactly at the cutoff stays.
    fn evict(&mut self, now_ms: i64, window_ms: i64) -> usize {
        let cutoff = now_ms.saturating_sub(window_ms);
        let mut evicted = 0;
        while let Some(&Observation { value, ts_ms }) = self.buf.front() {
            if ts_ms < cutoff {
                self.buf.pop_front();
                self.sum -= i64::from(value);
                evicted += 1;
            } else {
                break;
            }
        }
        evicted
    }

    fn stats(&self) -> Option<WindowStats> {
        if self.buf.is_empty() {
            return None;
        }
        let count = self.buf.len();
        Some(WindowStats {
            mean: self.sum as f64 / count as f64,
            count,
            sum: self.sum,
        })
    }
}

impl<C: TimeSource> WindowedMean<C> {
    /// Create a window of `window_ms` milliseconds reading time from `clock`.
    ///
    /// Fails when `window_ms` is not positive.
    pub fn new(clock: C, window_ms: i64) -> anyhow::Result<Self> {
        Self::named(clock, DEFAULT_WINDOW_NAME, window_ms)
    }

    /// Like [`new`](Self::new), with `name` as the `window` metric label.
    pub fn named(clock: C, name: impl Into<String>, window_ms: i64) -> anyhow::Result<Self> {
        ensure!(
            window_ms > 0,
            "window duration must be positive, got {window_ms} ms"
        );
        Ok(Self::build(clock, name.into(), window_ms))
    }

    /// Convenience constructor for the default 5 minute window.
    pub fn with_default_window(clock: C) -> Self {
        Self::build(clock, DEFAULT_WINDOW_NAME.to_owned(), DEFAULT_WINDOW_MS)
    }

    pub fn from_config(clock: C, cfg: &WindowConfig) -> anyhow::Result<Self> {
        Self::named(clock, cfg.name.clone(), cfg.window_ms)
    }

    // `window_ms` is already known to be positive.
    fn build(clock: C, name: String, window_ms: i64) -> Self {
        debug!(target: "window_mean", window = %name, window_ms, "windowed mean created");
        metrics::window_configured(&name, window_ms);
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
            window_ms,
            name,
        }
    }

    /// Record a new observation stamped with the clock's current instant.
    ///
    /// Automatically discards entries that fell out of the window.
    pub fn record(&self, value: i32) {
        let mut inner = self.write();
        let now = self.clock.now_ms();

        // The clock must not run backwards. If it does, stamp with the newest
        // timestamp seen so the buffer stays sorted for eviction.
        let ts_ms = match inner.buf.back() {
            Some(last) if now < last.ts_ms => {
                warn!(
                    target: "window_mean",
                    now_ms = now,
                    last_ms = last.ts_ms,
                    "time source went backwards; clamping observation timestamp"
                );
                last.ts_ms
            }
            _ => now,
        };

        inner.buf.push_back(Observation { value, ts_ms });
        inner.sum += i64::from(value);
        let evicted = inner.evict(now, self.window_ms);

        trace!(target: "window_mean", value, ts_ms, evicted, len = inner.buf.len(), "recorded");
        metrics::recorded(&self.name, inner.buf.len());
        metrics::evicted(&self.name, evicted, inner.buf.len());
    }

    /// Mean of the values recorded within the last window, or `None` when
    /// nothing is left in it.
    pub fn mean(&self) -> Option<f64> {
        self.stats().map(|s| s.mean)
    }

    /// Mean, count and sum of the current window, or `None` when empty.
    pub fn stats(&self) -> Option<WindowStats> {
        self.evict_now();
        self.read().stats()
    }

    /// Number of observations still inside the window.
    pub fn len(&self) -> usize {
        self.evict_now();
        self.read().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the window in milliseconds (useful for diagnostics).
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Instance name, as used in the `window` metric label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exclusive phase shared by all reads.
    fn evict_now(&self) {
        let mut inner = self.write();
        let now = self.clock.now_ms();
        let evicted = inner.evict(now, self.window_ms);
        if evicted > 0 {
            trace!(target: "window_mean", evicted, len = inner.buf.len(), "expired observations dropped");
            metrics::evicted(&self.name, evicted, inner.buf.len());
        }
    }

    // Every critical section leaves `Inner` consistent before anything that
    // could panic, so a poisoned lock still guards valid data.
    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
