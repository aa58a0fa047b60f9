//! Instants on the relay's monotonic clock.

use core::fmt;
use core::ops::Add;
use std::time::Duration;

//------------ Timestamp -----------------------------------------------------

/// An instant on a monotonic clock.
///
/// The value is the time elapsed since the epoch of the clock that produced
/// it. Only timestamps from the same clock can be meaningfully compared or
/// subtracted from each other.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The clock's epoch.
    pub const EPOCH: Self = Timestamp(Duration::ZERO);

    /// Creates a timestamp the given duration after the epoch.
    pub const fn from_duration(since_epoch: Duration) -> Self {
        Timestamp(since_epoch)
    }

    /// Creates a timestamp the given number of milliseconds after the epoch.
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(Duration::from_millis(millis))
    }

    /// Returns the time elapsed between the epoch and this timestamp.
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Returns the time from `earlier` to `self`.
    ///
    /// If `earlier` is actually later than `self`, returns zero.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns the timestamp `duration` after this one, if representable.
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0.checked_add(duration).map(Timestamp)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    /// Saturates at the largest representable instant.
    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs))
    }
}

impl From<Duration> for Timestamp {
    fn from(since_epoch: Duration) -> Self {
        Timestamp(since_epoch)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}.{:09}s", self.0.as_secs(), self.0.subsec_nanos())
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn differences_saturate() {
        let early = Timestamp::from_millis(10);
        let late = Timestamp::from_millis(25);
        assert_eq!(
            late.saturating_duration_since(early),
            Duration::from_millis(15)
        );
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
    }

    #[test]
    fn addition() {
        let ts = Timestamp::from_millis(1500) + Duration::from_millis(500);
        assert_eq!(ts, Timestamp::from_millis(2000));
        assert_eq!(ts.to_string(), "+2.000000000s");
        assert!(Timestamp::from_duration(Duration::MAX)
            .checked_add(Duration::from_nanos(1))
            .is_none());
    }
}
