//! A time interface that can be replaced by a fake time implementation
//! during testing.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::base::Timestamp;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

//------------ Clock ---------------------------------------------------------

/// A source of [`Timestamp`]s.
///
/// Every instant the relay compares, whether stamped by the transport or
/// taken by the relay itself, must come from the same clock.
pub trait Clock: Clone + Debug + Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

//------------ SystemClock ---------------------------------------------------

/// Implementation of the [Clock] trait using the Instant type from
/// std::time.
///
/// All values of this type share one process-wide epoch, so timestamps
/// from different `SystemClock`s are comparable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Returns the process-wide epoch, fixing it on first use.
    fn epoch() -> Instant {
        /// The instant the first timestamp was taken.
        static EPOCH: OnceLock<Instant> = OnceLock::new();
        *EPOCH.get_or_init(Instant::now)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_duration(Self::epoch().elapsed())
    }
}

//------------ FakeClock -----------------------------------------------------

/// Implementation of the [Clock] trait to fake the passing of time, for
/// example for testing.
///
/// Clones share the same fake time.
#[derive(Clone, Debug, Default)]
pub struct FakeClock {
    /// The current fake time.
    now: Arc<Mutex<Duration>>,
}

impl FakeClock {
    /// Creates a clock that stands at the epoch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock that stands at the given time.
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now.as_duration())),
        }
    }

    /// Adjust the current time by adding a [Duration].
    pub fn adjust_time(&self, adjust: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(adjust);
    }

    /// Moves the clock to the given time, which may be in the past.
    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now.as_duration();
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_duration(*self.now.lock())
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let first = SystemClock.now();
        let second = SystemClock::default().now();
        assert!(second >= first);
    }

    #[test]
    fn fake_clock_clones_share_time() {
        let clock = FakeClock::at(Timestamp::from_millis(10));
        let other = clock.clone();
        other.adjust_time(Duration::from_millis(5));
        assert_eq!(clock.now(), Timestamp::from_millis(15));
        clock.set(Timestamp::from_millis(3));
        assert_eq!(other.now(), Timestamp::from_millis(3));
    }
}
