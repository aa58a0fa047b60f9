//! Per-request relay state.

use crate::base::{ClientRequest, NetworkAddress, Timestamp};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use std::vec::Vec;

//------------ Acceptance ----------------------------------------------------

/// What a record made of a remote reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Acceptance {
    /// The replying server was not expected or has replied before.
    ///
    /// The reply was ignored entirely.
    Rejected,

    /// The reply was counted and its bindings merged.
    Accepted {
        /// The number of servers that still have to reply.
        remaining: usize,

        /// Whether this was the first reply accepted for the record.
        first: bool,
    },
}

//------------ RelayRecord ---------------------------------------------------

/// A client request waiting for replies from remote servers.
///
/// Several worker threads may offer replies for the same record at once,
/// so the mutable part is kept behind the record's own lock. That lock is
/// only ever held for a single [`accept`][Self::accept] or snapshot and
/// never while the table is locked.
#[derive(Debug)]
pub struct RelayRecord {
    /// The request as received from the client.
    client: ClientRequest,

    /// The reply bookkeeping.
    state: Mutex<RelayState>,
}

/// The mutable part of a [`RelayRecord`].
#[derive(Debug)]
struct RelayState {
    /// Servers that have yet to reply.
    remaining: HashSet<NetworkAddress>,

    /// Bindings collected from the replies so far.
    addresses: BTreeSet<NetworkAddress>,

    /// The number of accepted replies.
    replies: usize,
}

impl RelayRecord {
    /// Creates a record waiting for replies from `servers`.
    ///
    /// Duplicate server addresses are collapsed.
    pub fn new(
        client: ClientRequest,
        servers: impl IntoIterator<Item = NetworkAddress>,
    ) -> Self {
        Self {
            client,
            state: Mutex::new(RelayState {
                remaining: servers.into_iter().collect(),
                addresses: BTreeSet::new(),
                replies: 0,
            }),
        }
    }

    /// Returns the original client request.
    pub fn client(&self) -> &ClientRequest {
        &self.client
    }

    /// Offers a reply from `origin` carrying `bindings`.
    ///
    /// If `origin` is among the servers still expected, it is crossed off
    /// and the bindings are merged. Otherwise nothing changes. Both happen
    /// under the record's lock, so of several concurrent callers exactly
    /// one sees `remaining` drop to zero.
    pub fn accept(
        &self,
        origin: &NetworkAddress,
        bindings: Option<&[NetworkAddress]>,
    ) -> Acceptance {
        let mut state = self.state.lock();
        if !state.remaining.remove(origin) {
            return Acceptance::Rejected;
        }
        if let Some(bindings) = bindings {
            state.addresses.extend(bindings.iter().cloned());
        }
        state.replies += 1;
        Acceptance::Accepted {
            remaining: state.remaining.len(),
            first: state.replies == 1,
        }
    }

    /// Returns the servers that have not replied yet.
    pub fn remaining_servers(&self) -> Vec<NetworkAddress> {
        self.state.lock().remaining.iter().cloned().collect()
    }

    /// Returns the number of servers that have not replied yet.
    pub fn remaining_count(&self) -> usize {
        self.state.lock().remaining.len()
    }

    /// Returns the bindings collected so far, in address order.
    pub fn response_addresses(&self) -> Vec<NetworkAddress> {
        self.state.lock().addresses.iter().cloned().collect()
    }

    /// Returns the number of replies accepted so far.
    pub fn replies(&self) -> usize {
        self.state.lock().replies
    }

    /// Returns whether the request was forwarded more than `max_age`
    /// before `now`.
    pub fn is_expired(&self, now: Timestamp, max_age: Duration) -> bool {
        now.saturating_duration_since(self.client.timing().forwarded())
            > max_age
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::{AddressType, Guid, RequestTiming};

    fn addr(octet: u8) -> NetworkAddress {
        NetworkAddress::new(
            AddressType::Ipv4Udp,
            vec![10, 0, 0, octet, 0, 53],
        )
    }

    fn record(servers: &[u8]) -> RelayRecord {
        RelayRecord::new(
            ClientRequest::lookup(
                1,
                addr(200),
                RequestTiming::default(),
                Guid::from_static(b"G1"),
            ),
            servers.iter().map(|octet| addr(*octet)),
        )
    }

    #[test]
    fn accept_crosses_off_servers() {
        let record = record(&[1, 2]);
        assert_eq!(record.remaining_count(), 2);

        assert_eq!(
            record.accept(&addr(1), Some(&[addr(100)])),
            Acceptance::Accepted {
                remaining: 1,
                first: true
            }
        );
        assert_eq!(record.remaining_servers(), vec![addr(2)]);

        assert_eq!(
            record.accept(&addr(2), Some(&[addr(101), addr(100)])),
            Acceptance::Accepted {
                remaining: 0,
                first: false
            }
        );
        assert_eq!(record.response_addresses(), vec![addr(100), addr(101)]);
        assert_eq!(record.replies(), 2);
    }

    #[test]
    fn duplicate_and_unknown_origins_are_rejected() {
        let record = record(&[1, 2]);
        record.accept(&addr(1), Some(&[addr(100)]));

        assert_eq!(
            record.accept(&addr(1), Some(&[addr(102)])),
            Acceptance::Rejected
        );
        assert_eq!(
            record.accept(&addr(9), Some(&[addr(103)])),
            Acceptance::Rejected
        );
        assert_eq!(record.remaining_count(), 1);
        assert_eq!(record.response_addresses(), vec![addr(100)]);
        assert_eq!(record.replies(), 1);
    }

    #[test]
    fn duplicate_servers_collapse() {
        let record = record(&[1, 1, 1]);
        assert_eq!(record.remaining_count(), 1);
        assert_eq!(
            record.accept(&addr(1), None),
            Acceptance::Accepted {
                remaining: 0,
                first: true
            }
        );
        assert!(record.response_addresses().is_empty());
    }

    #[test]
    fn expiry_is_measured_from_forwarding() {
        let record = RelayRecord::new(
            ClientRequest::insert(
                1,
                addr(200),
                RequestTiming::new(
                    Timestamp::from_millis(0),
                    Timestamp::from_millis(10),
                    Timestamp::from_millis(20),
                ),
                Guid::from_static(b"G1"),
            ),
            [addr(1)],
        );
        let max_age = Duration::from_millis(100);
        assert!(!record.is_expired(Timestamp::from_millis(120), max_age));
        assert!(record.is_expired(Timestamp::from_millis(121), max_age));
    }
}
