//! Loading the relay configuration.
#![cfg(feature = "serde")]

use gnrs_relay::relay::config::Config;
use std::time::Duration;

#[test]
fn empty_config_uses_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn values_are_read_in_milliseconds() {
    let config: Config = serde_json::from_str(
        r#"{
            "default_ttl_ms": 5000,
            "default_expiration_ms": 60000,
            "collect_statistics": true,
            "max_pending_age_ms": 2500
        }"#,
    )
    .unwrap();
    assert_eq!(config.default_ttl(), Duration::from_secs(5));
    assert_eq!(config.default_expiration(), Duration::from_secs(60));
    assert!(config.collect_statistics());
    assert_eq!(config.max_pending_age(), Duration::from_millis(2500));
}

#[test]
fn values_are_clamped() {
    let config: Config = serde_json::from_str(
        r#"{
            "default_ttl_ms": 0,
            "max_pending_age_ms": 18446744073709551615
        }"#,
    )
    .unwrap();
    assert_eq!(config.default_ttl(), Duration::from_secs(1));
    assert_eq!(config.max_pending_age(), Duration::from_secs(600));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<Config>(r#"{ "ttl": 5 }"#).is_err());
}
