//! Correlating remote responses with forwarded client requests.
//!
//! When a client request concerns GUIDs this server is not responsible
//! for, the request is forwarded to the responsible remote servers and a
//! [`RelayRecord`][record::RelayRecord] is placed into the
//! [`PendingRequestTable`][table::PendingRequestTable]. From then on, every
//! response arriving from a remote server is passed to
//! [`ResponseCorrelator::handle`][correlator::ResponseCorrelator::handle]
//! on whatever worker thread received it.
//!
//! The correlator finds the record for the response, crosses the
//! responding server off the record's list, and merges any bindings the
//! response carries. The thread that crosses off the last server removes
//! the record from the table and thereby becomes its sole owner. It then
//! lets the [`ResultAggregator`][aggregate::ResultAggregator] build the
//! client response, write lookup results into the binding cache through
//! the [`CacheWriter`][cache::CacheWriter], send the response via the
//! [`ClientReplier`][reply::ClientReplier], and account the request's
//! latencies in the [`Telemetry`][stats::Telemetry] counters.
//!
//! Responses that do not belong to any pending request, responses from
//! servers that were not asked or have already answered, and responses
//! that lose a race to complete a request are dropped quietly. None of
//! these are reported as errors to the transport.
//!
//! Requests whose remote servers never answer are not completed by the
//! correlator. They are removed by
//! [`PendingRequestTable::remove_expired`][table::PendingRequestTable::remove_expired],
//! usually driven by an [`expire::Sweeper`].

pub use self::correlator::{Disposition, ResponseCorrelator};
pub use self::table::{CorrelationId, PendingRequestTable};

pub mod aggregate;
pub mod cache;
pub mod clock;
pub mod config;
pub mod correlator;
pub mod error;
pub mod expire;
pub mod record;
pub mod reply;
pub mod stats;
pub mod table;
