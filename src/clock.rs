//! Monotonic millisecond clock seam.
//!
//! All benchmark timing flows through [`Clock`] so the sequencer and frame
//! loop can be driven by a [`ManualClock`] in tests without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic clock reporting milliseconds since an arbitrary epoch.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds. Monotonic, sub-millisecond precision.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`], anchored at construction.
#[derive(Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock for deterministic tests and simulations.
///
/// Stores microseconds in an atomic so it can be shared between a simulated
/// adapter (advancing it to model work) and the engine reading it.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance_ms(&self, ms: f64) {
        let micros = (ms * 1000.0).round().max(0.0) as u64;
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = WallClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_advances_exactly() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ms(), 0.0);
        clock.advance_ms(16.67);
        assert!((clock.now_ms() - 16.67).abs() < 0.001);
        clock.advance_ms(0.5);
        assert!((clock.now_ms() - 17.17).abs() < 0.001);
    }
}
