//! Log output for applications and tests.

use tracing_subscriber::EnvFilter;

/// The filter used when `RUST_LOG` is not set.
///
/// Only the relay's own events are shown, and only from info level.
const DEFAULT_FILTER: &str = "gnrs_relay=info";

/// Setup logging of events reported by the relay.
///
/// Use the RUST_LOG environment variable to override the default of
/// showing the relay's info level events only.
///
/// E.g. To see what the correlator does with each response:
///   RUST_LOG=gnrs_relay::relay::correlator=TRACE
///
/// Returns whether a subscriber was installed. Only the first call in a
/// process installs one; later calls return `false`.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .try_init()
        .is_ok()
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_first_call_installs() {
        init_logging();
        assert!(!init_logging());
        tracing::info!(target: "gnrs_relay", "Logging installed");
    }
}
