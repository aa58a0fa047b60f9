//! Helpers for bounded configuration values.

use core::cmp;
use core::fmt;

//------------ DefMinMax -----------------------------------------------------

/// The default, minimum, and maximum values for a config variable.
///
/// Setters run user supplied values through [`limit`][Self::limit] so that
/// a configuration can never hold a value outside the supported range.
#[derive(Clone, Copy)]
pub struct DefMinMax<T> {
    /// The default value.
    def: T,

    /// The smallest accepted value.
    min: T,

    /// The largest accepted value.
    max: T,
}

impl<T> DefMinMax<T> {
    /// Creates a new value.
    pub const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    /// Returns the default value.
    pub fn default(self) -> T {
        self.def
    }

    /// Returns the smallest accepted value.
    pub fn min(self) -> T {
        self.min
    }

    /// Returns the largest accepted value.
    pub fn max(self) -> T {
        self.max
    }

    /// Trims the given value to fit into the minimum/maximum range.
    pub fn limit(self, value: T) -> T
    where
        T: Ord,
    {
        cmp::max(self.min, cmp::min(self.max, value))
    }

    /// Trims an optional value, falling back to the default if absent.
    pub fn limit_or_default(self, value: Option<T>) -> T
    where
        T: Ord,
    {
        match value {
            Some(value) => self.limit(value),
            None => self.def,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DefMinMax<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:?}..={:?})", self.def, self.min, self.max)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    const LIMITS: DefMinMax<Duration> = DefMinMax::new(
        Duration::from_secs(30),
        Duration::from_secs(1),
        Duration::from_secs(60),
    );

    #[test]
    fn limit_clamps_both_ends() {
        assert_eq!(LIMITS.limit(Duration::ZERO), Duration::from_secs(1));
        assert_eq!(
            LIMITS.limit(Duration::from_secs(3600)),
            Duration::from_secs(60)
        );
        assert_eq!(
            LIMITS.limit(Duration::from_secs(42)),
            Duration::from_secs(42)
        );
    }

    #[test]
    fn absent_value_uses_default() {
        assert_eq!(LIMITS.limit_or_default(None), LIMITS.default());
        assert_eq!(
            LIMITS.limit_or_default(Some(Duration::from_millis(1))),
            LIMITS.min()
        );
    }
}
