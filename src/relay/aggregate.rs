//! Building the client response for a completed relay.

use super::cache::{BindingStore, CacheWriter};
use super::clock::Clock;
use super::record::RelayRecord;
use super::reply::ClientReplier;
use super::stats::{OperationType, Telemetry};
use crate::base::{
    ClientResponse, MessageType, NetworkAddress, RequestKind, Timestamp,
};
use std::sync::Arc;
use tracing::{debug, error};

//------------ Completion ----------------------------------------------------

/// The outcome of completing a relay.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Completion {
    /// The client was sent a response.
    Replied(OperationType),

    /// The client request was of a type that cannot be relayed.
    ///
    /// No response was sent. This means a bug in whatever registered the
    /// request.
    Unsupported(MessageType),
}

//------------ ResultAggregator ----------------------------------------------

/// Merges the replies of a completed relay into the client response.
///
/// The aggregator is only ever handed records that have been removed from
/// the pending table, so it runs at most once per relayed request.
#[derive(Debug)]
pub struct ResultAggregator<Store, Replier, C> {
    /// This server's address, used as the origin of responses.
    own_addr: NetworkAddress,

    /// Where lookup results are cached.
    cache: CacheWriter<Store>,

    /// Where client responses go.
    replier: Replier,

    /// The statistics to update.
    telemetry: Arc<Telemetry>,

    /// The source of the current time.
    clock: C,
}

impl<Store, Replier, C> ResultAggregator<Store, Replier, C> {
    /// Creates a new aggregator.
    pub fn new(
        own_addr: NetworkAddress,
        cache: CacheWriter<Store>,
        replier: Replier,
        telemetry: Arc<Telemetry>,
        clock: C,
    ) -> Self {
        Self {
            own_addr,
            cache,
            replier,
            telemetry,
            clock,
        }
    }

    /// Returns this server's address.
    pub fn own_addr(&self) -> &NetworkAddress {
        &self.own_addr
    }

    /// Returns the cache writer.
    pub fn cache(&self) -> &CacheWriter<Store> {
        &self.cache
    }

    /// Returns the client replier.
    pub fn replier(&self) -> &Replier {
        &self.replier
    }

    /// Returns the statistics.
    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    /// Returns the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<Store, Replier, C> ResultAggregator<Store, Replier, C>
where
    Store: BindingStore,
    Replier: ClientReplier,
    C: Clock,
{
    /// Completes a relay.
    ///
    /// `created` is when the final remote response was created and
    /// `started` when this server began handling it.
    ///
    /// For a lookup, the merged bindings are cached before the response
    /// is sent so that a client re-querying right away finds them. For an
    /// insert, the round trip until the last acknowledgment is sampled.
    /// Phase statistics are recorded after the response has been sent.
    pub fn complete(
        &self,
        record: &RelayRecord,
        created: Timestamp,
        started: Timestamp,
    ) -> Completion {
        let client = record.client();
        let op = match client.kind() {
            RequestKind::Lookup(guid) => {
                let addresses = record.response_addresses();
                self.cache.write(guid, &addresses, self.clock.now());
                self.replier.send_message(
                    ClientResponse::lookup(
                        client.request_id(),
                        self.own_addr.clone(),
                        addresses,
                    ),
                    client.origin(),
                );
                OperationType::Lookup
            }
            RequestKind::Insert(_) => {
                let rtt = self
                    .clock
                    .now()
                    .saturating_duration_since(client.timing().received());
                self.telemetry.record_rtt(OperationType::Insert, rtt);
                debug!(
                    request_id = client.request_id(),
                    ?rtt,
                    "All remote servers acknowledged insert"
                );
                self.replier.send_message(
                    ClientResponse::insert(
                        client.request_id(),
                        self.own_addr.clone(),
                    ),
                    client.origin(),
                );
                OperationType::Insert
            }
            RequestKind::Unsupported(msg_type) => {
                error!(
                    request_id = client.request_id(),
                    %msg_type,
                    "Unsupported client message in relay record, not replying"
                );
                return Completion::Unsupported(*msg_type);
            }
        };

        self.telemetry.record(
            op,
            client.timing(),
            created,
            started,
            self.clock.now(),
        );
        Completion::Replied(op)
    }
}
