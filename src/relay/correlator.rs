//! Matching remote responses to pending requests.

use super::aggregate::{Completion, ResultAggregator};
use super::cache::{BindingStore, CacheWriter};
use super::clock::{Clock, SystemClock};
use super::config::Config;
use super::error::Error;
use super::record::{Acceptance, RelayRecord};
use super::reply::ClientReplier;
use super::stats::{OperationType, Telemetry};
use super::table::{CorrelationId, PendingRequestTable};
use crate::base::{
    ClientRequest, MessageType, NetworkAddress, RemoteResponse, RequestKind,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

//------------ Disposition ---------------------------------------------------

/// What became of a remote response.
///
/// None of these is an error. The transport can ignore the value; it is
/// returned for tests and for callers that want to count outcomes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// No request is pending for the response's ID.
    ///
    /// The request has completed already, was discarded, or never existed.
    Stale,

    /// The responding server was not asked or has already replied.
    UnexpectedOrigin,

    /// The response was accepted; more servers have yet to reply.
    Awaiting {
        /// The number of servers still to reply.
        remaining: usize,
    },

    /// The response was the last one needed and the client was answered.
    Completed(OperationType),

    /// The response was the last one needed, but the request had been
    /// removed from the table by someone else in the meantime.
    LostRace,

    /// The response was the last one needed, but the client request has a
    /// type that cannot be answered. No response was sent.
    Unsupported(MessageType),
}

impl Disposition {
    /// Returns whether the client was sent a response.
    pub fn is_completed(&self) -> bool {
        matches!(self, Disposition::Completed(_))
    }
}

//------------ ResponseCorrelator --------------------------------------------

/// Correlates remote responses with the requests they answer.
///
/// The correlator is shared by all worker threads. Each thread calls
/// [`handle`][Self::handle] for every remote response it receives; the
/// correlator does the rest, including replying to the client once the
/// last expected response for a request has arrived.
///
/// Requests are added through [`register`][Self::register] when they are
/// forwarded to the remote servers.
#[derive(Debug)]
pub struct ResponseCorrelator<Store, Replier, C = SystemClock> {
    /// The requests waiting for replies.
    table: Arc<PendingRequestTable>,

    /// Completes requests once all replies are in.
    aggregator: ResultAggregator<Store, Replier, C>,
}

impl<Store, Replier> ResponseCorrelator<Store, Replier, SystemClock> {
    /// Creates a correlator using the system clock.
    ///
    /// `own_addr` is this server's address which is used as the origin of
    /// client responses.
    pub fn new(
        own_addr: NetworkAddress,
        config: &Config,
        table: Arc<PendingRequestTable>,
        telemetry: Arc<Telemetry>,
        store: Store,
        replier: Replier,
    ) -> Self {
        Self::with_clock(
            own_addr,
            config,
            table,
            telemetry,
            store,
            replier,
            SystemClock,
        )
    }
}

impl<Store, Replier, C> ResponseCorrelator<Store, Replier, C> {
    /// Creates a correlator using the given clock.
    ///
    /// The clock must be the same the transport uses to stamp messages.
    pub fn with_clock(
        own_addr: NetworkAddress,
        config: &Config,
        table: Arc<PendingRequestTable>,
        telemetry: Arc<Telemetry>,
        store: Store,
        replier: Replier,
        clock: C,
    ) -> Self {
        Self::from_parts(
            table,
            ResultAggregator::new(
                own_addr,
                CacheWriter::new(store, config),
                replier,
                telemetry,
                clock,
            ),
        )
    }

    /// Creates a correlator from a table and an aggregator.
    pub fn from_parts(
        table: Arc<PendingRequestTable>,
        aggregator: ResultAggregator<Store, Replier, C>,
    ) -> Self {
        Self { table, aggregator }
    }

    /// Returns the pending request table.
    pub fn table(&self) -> &Arc<PendingRequestTable> {
        &self.table
    }

    /// Returns the aggregator.
    pub fn aggregator(&self) -> &ResultAggregator<Store, Replier, C> {
        &self.aggregator
    }

    /// Returns the statistics.
    pub fn telemetry(&self) -> &Arc<Telemetry> {
        self.aggregator.telemetry()
    }

    /// Registers a request forwarded to `servers`.
    ///
    /// The request's ID becomes its correlation ID. Registration fails if
    /// there are no servers to wait for or if a request with the same ID
    /// is still pending.
    pub fn register(
        &self,
        client: ClientRequest,
        servers: impl IntoIterator<Item = NetworkAddress>,
    ) -> Result<CorrelationId, Error> {
        let id = CorrelationId::from(client.request_id());
        let record = RelayRecord::new(client, servers);
        let expected = record.remaining_count();
        if expected == 0 {
            return Err(Error::NoRemoteServers(id));
        }
        self.table.put(id, record)?;
        trace!(request_id = %id, expected, "Registered relayed request");
        Ok(id)
    }
}

impl<Store, Replier, C> ResponseCorrelator<Store, Replier, C>
where
    Store: BindingStore,
    Replier: ClientReplier,
    C: Clock,
{
    /// Processes a response from a remote server.
    ///
    /// The response is matched to its pending request by ID. If the
    /// response's origin is one of the servers the request is still
    /// waiting for, the server is crossed off and any bindings the response
    /// carries are merged. If that was the last server, the request is
    /// removed from the table and the client is answered.
    ///
    /// Responses that cannot be used are dropped. This method never fails.
    pub fn handle(&self, response: &RemoteResponse) -> Disposition {
        let started = self.aggregator.clock().now();
        self.telemetry().count_response();

        let id = CorrelationId::from(response.request_id());
        let record = match self.table.get(id) {
            Some(record) => record,
            None => {
                warn!(
                    request_id = %id,
                    origin = %response.origin(),
                    "No pending request for response"
                );
                return Disposition::Stale;
            }
        };

        let (remaining, first) =
            match record.accept(response.origin(), response.bindings()) {
                Acceptance::Rejected => {
                    debug!(
                        request_id = %id,
                        origin = %response.origin(),
                        "Ignoring response from unexpected server"
                    );
                    return Disposition::UnexpectedOrigin;
                }
                Acceptance::Accepted { remaining, first } => {
                    (remaining, first)
                }
            };
        if first {
            self.sample_first_reply(id, &record);
        }
        if remaining > 0 {
            trace!(
                request_id = %id,
                servers = ?record.remaining_servers(),
                "Awaiting servers"
            );
            return Disposition::Awaiting { remaining };
        }

        // Whoever removes the record from the table completes it.
        let record = match self.table.take(id, &record) {
            Some(record) => record,
            None => {
                debug!(
                    request_id = %id,
                    "Request was removed before it could be completed"
                );
                return Disposition::LostRace;
            }
        };

        let created = response.created();
        match self.aggregator.complete(&record, created, started) {
            Completion::Replied(op) => Disposition::Completed(op),
            Completion::Unsupported(msg_type) => {
                Disposition::Unsupported(msg_type)
            }
        }
    }

    /// Records the time to the first remote reply of a lookup.
    fn sample_first_reply(&self, id: CorrelationId, record: &RelayRecord) {
        if let RequestKind::Lookup(_) = record.client().kind() {
            let received = record.client().timing().received();
            let rtt = self
                .aggregator
                .clock()
                .now()
                .saturating_duration_since(received);
            self.telemetry().record_rtt(OperationType::Lookup, rtt);
            debug!(request_id = %id, ?rtt, "First remote reply for lookup");
        }
    }
}
