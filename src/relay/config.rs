//! Relay configuration.
//!
//! Loading configuration files is left to the server. This module only
//! defines the values the relay needs and the ranges they are kept in. With
//! the `serde` feature, [`Config`] can be deserialized from any serde
//! format. Durations are then given in milliseconds and every field is
//! optional:
//!
//! ```json
//! { "default_ttl_ms": 30000, "collect_statistics": true }
//! ```

use crate::utils::config::DefMinMax;
use std::time::Duration;

/// Limits for how long a cached binding is used before re-querying.
const DEFAULT_TTL: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(30),
    Duration::from_secs(1),
    Duration::from_secs(24 * 3600),
);

/// Limits for how long a cached binding is kept at all.
const DEFAULT_EXPIRATION: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(15 * 60),
    Duration::from_secs(1),
    Duration::from_secs(7 * 24 * 3600),
);

/// Limits for how long a forwarded request may wait for remote replies.
const MAX_PENDING_AGE: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(10),
    Duration::from_millis(100),
    Duration::from_secs(10 * 60),
);

//------------ Config ------------------------------------------------------

/// Configuration of the relay.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "ConfigFile"))]
pub struct Config {
    /// TTL given to bindings cached from lookup responses.
    default_ttl: Duration,

    /// Expiration given to bindings cached from lookup responses.
    default_expiration: Duration,

    /// Whether per-phase latency statistics are collected.
    collect_statistics: bool,

    /// How long a forwarded request may wait before it is discarded.
    max_pending_age: Duration,
}

impl Config {
    /// Creates a new config with default values.
    ///
    /// The default values are documented at the relevant set_* methods.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the TTL of bindings cached from lookup responses.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Set the TTL of bindings cached from lookup responses.
    ///
    /// A cached binding is fresh until `now + default_ttl`. The value has
    /// to be at least one second, at most one day and the default is 30
    /// seconds.
    pub fn set_default_ttl(&mut self, value: Duration) {
        self.default_ttl = DEFAULT_TTL.limit(value)
    }

    /// Returns the expiration of bindings cached from lookup responses.
    pub fn default_expiration(&self) -> Duration {
        self.default_expiration
    }

    /// Set the expiration of bindings cached from lookup responses.
    ///
    /// A cached binding must not be used after `now + default_expiration`.
    /// The value has to be at least one second, at most seven days and the
    /// default is 15 minutes.
    pub fn set_default_expiration(&mut self, value: Duration) {
        self.default_expiration = DEFAULT_EXPIRATION.limit(value)
    }

    /// Returns whether latency statistics are collected.
    pub fn collect_statistics(&self) -> bool {
        self.collect_statistics
    }

    /// Enable or disable collection of per-phase latency statistics.
    ///
    /// The default value is false (disabled).
    pub fn set_collect_statistics(&mut self, value: bool) {
        self.collect_statistics = value
    }

    /// Returns how long a forwarded request may wait for replies.
    pub fn max_pending_age(&self) -> Duration {
        self.max_pending_age
    }

    /// Set how long a forwarded request may wait for remote replies.
    ///
    /// The value has to be at least 100 milliseconds, at most ten minutes
    /// and the default is ten seconds.
    pub fn set_max_pending_age(&mut self, value: Duration) {
        self.max_pending_age = MAX_PENDING_AGE.limit(value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL.default(),
            default_expiration: DEFAULT_EXPIRATION.default(),
            collect_statistics: false,
            max_pending_age: MAX_PENDING_AGE.default(),
        }
    }
}

//------------ ConfigFile ----------------------------------------------------

/// The serialized form of [`Config`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_ttl_ms: Option<u64>,
    default_expiration_ms: Option<u64>,
    #[serde(default)]
    collect_statistics: bool,
    max_pending_age_ms: Option<u64>,
}

#[cfg(feature = "serde")]
impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let millis = |value: Option<u64>| value.map(Duration::from_millis);
        Self {
            default_ttl: DEFAULT_TTL
                .limit_or_default(millis(file.default_ttl_ms)),
            default_expiration: DEFAULT_EXPIRATION
                .limit_or_default(millis(file.default_expiration_ms)),
            collect_statistics: file.collect_statistics,
            max_pending_age: MAX_PENDING_AGE
                .limit_or_default(millis(file.max_pending_age_ms)),
        }
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn setters_clamp() {
        let mut config = Config::new();
        config.set_default_ttl(Duration::ZERO);
        assert_eq!(config.default_ttl(), Duration::from_secs(1));
        config.set_default_expiration(Duration::from_secs(u64::MAX));
        assert_eq!(
            config.default_expiration(),
            Duration::from_secs(7 * 24 * 3600)
        );
        config.set_max_pending_age(Duration::from_secs(2));
        assert_eq!(config.max_pending_age(), Duration::from_secs(2));
        assert!(!config.collect_statistics());
    }
}
