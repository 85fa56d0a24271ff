//! # Clock
//! Time source capability handed to the accumulator.
//!
//! The accumulator never reads the wall clock on its own; it asks a
//! [`TimeSource`] for "now" in milliseconds. Production code uses
//! [`SystemClock`], tests drive a [`ManualClock`] by hand.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::Utc;

/// Source of the current instant, in milliseconds on an arbitrary but fixed epoch.
///
/// Implementations must be non-decreasing for any single caller and safe
/// to read from many threads at once.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Wall clock: milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Share it through an `Arc` so the accumulator and the driving code see
/// the same counter.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    /// Move the clock forward by `delta_ms`. Callable from any thread.
    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
