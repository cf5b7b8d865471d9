//! Time utilities and the clock abstraction
//!
//! Every periodic task and every timed autonomous step reads time through a
//! [`Clock`]. On the robot (and in real-time simulation) this is the
//! [`SysClock`]. Tests use the [`SimClock`], where sleeping advances time
//! instantly so that durations can be checked exactly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic millisecond clock which tasks use to pace themselves.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock's epoch.
    fn now_ms(&self) -> u64;

    /// Suspend the calling task for `ms` milliseconds.
    fn sleep_ms(&self, ms: u64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wall clock, epoch at construction.
#[derive(Debug, Clone, Copy)]
pub struct SysClock {
    epoch: Instant
}

/// Simulated clock.
///
/// `sleep_ms` advances the time by the requested amount and returns
/// immediately.
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: AtomicU64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SysClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now()
        }
    }
}

impl Default for SysClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SysClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms))
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without anyone sleeping.
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance_ms(ms)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_clock() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);

        clock.sleep_ms(1000);
        clock.advance_ms(500);
        assert_eq!(clock.now_ms(), 1500);
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }
}
