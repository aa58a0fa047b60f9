//! Response correlation for a GNRS server.
//!
//! A GNRS server that is not itself responsible for a GUID forwards a
//! client's lookup or insert to the remote servers that are. This crate
//! provides the fan-in half of that exchange: it keeps track of requests
//! waiting for remote replies, matches each incoming reply to its request,
//! merges the results, fills the local binding cache, accumulates latency
//! statistics, and finally produces exactly one reply for the client.
//!
//! # Modules
//!
//! * [base] contains the in-memory message model: addresses, GUIDs,
//!   requests and responses, and the instants that travel with them.
//! * [relay] contains the correlation engine itself. Its entry point is
//!   [`ResponseCorrelator`][relay::correlator::ResponseCorrelator].
//! * [utils] contains small helpers shared by the other modules.
//!
//! Encoding and decoding of messages, the network transport, and the
//! binding store are not part of this crate. They are reached through the
//! [`ClientReplier`][relay::reply::ClientReplier] and
//! [`BindingStore`][relay::cache::BindingStore] traits.
//!
//! # Reference of Feature Flags
//!
//! * `logging`: provides
#![cfg_attr(feature = "logging", doc = "  [logging::init_logging]")]
#![cfg_attr(not(feature = "logging"), doc = "  `logging::init_logging`")]
//!   which installs a `tracing-subscriber` formatter filtered by `RUST_LOG`.
//! * `serde`: makes [`Config`][relay::config::Config] deserializable.
//! * `sweep`: adds a Tokio based background task that discards requests
//!   whose remote servers never replied.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod relay;
pub mod utils;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;
