//! Time sources for walkthrough timers and animations.
//!
//! Production code uses [`WallClock`]. Tests use [`ManualClock`], where time
//! only moves when [`ManualClock::advance`] is called, so auto-advance timers
//! and transitions can be driven deterministically.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Abstraction over monotonic time sources.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Elapsed duration since a previous instant, saturating at zero.
    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

/// Production clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock for deterministic tests.
///
/// Interior mutability lets a single clock be shared (`Rc<ManualClock>`)
/// between the code under test and the test driving it.
#[derive(Debug)]
pub struct ManualClock {
    anchor: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Move virtual time forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Total virtual time elapsed since creation.
    #[must_use]
    pub fn virtual_elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.anchor + self.elapsed.get()
    }
}
