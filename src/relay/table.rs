//! The table of requests waiting for remote replies.

use super::error::Error;
use super::record::RelayRecord;
use crate::base::Timestamp;
use core::fmt;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;

//------------ CorrelationId -------------------------------------------------

/// The key tying remote responses to a forwarded request.
///
/// This is the client's request ID, which the remote servers copy into
/// their responses. It is unique among pending requests but may be reused
/// once a request has been completed or discarded.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CorrelationId(u32);

impl CorrelationId {
    /// Creates a correlation ID from a request ID.
    pub const fn new(request_id: u32) -> Self {
        CorrelationId(request_id)
    }

    /// Returns the request ID.
    pub fn into_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for CorrelationId {
    fn from(request_id: u32) -> Self {
        CorrelationId(request_id)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

//------------ PendingRequestTable -------------------------------------------

/// Mapping pending requests to their correlation ID.
///
/// The table is shared by all worker threads. Lookups and removals for
/// different IDs do not block each other beyond the map's shard locks.
///
/// Removing a record is how a thread claims it: for any record, exactly
/// one of all concurrent [`remove`][Self::remove],
/// [`take`][Self::take], and [`remove_expired`][Self::remove_expired]
/// calls gets it back. Whoever does is the only one to act on it
/// afterwards, whether that means replying to the client or giving up on
/// the request.
#[derive(Debug, Default)]
pub struct PendingRequestTable {
    /// The pending requests.
    entries: DashMap<CorrelationId, Arc<RelayRecord>>,
}

impl PendingRequestTable {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record under the given ID.
    ///
    /// Fails if a record with this ID is already pending. The existing
    /// record is left untouched in that case.
    pub fn put(
        &self,
        id: CorrelationId,
        record: RelayRecord,
    ) -> Result<(), Error> {
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(Error::DuplicateCorrelationId(id)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(record));
                Ok(())
            }
        }
    }

    /// Returns the record for the given ID, if there is one.
    ///
    /// The record stays in the table.
    pub fn get(&self, id: CorrelationId) -> Option<Arc<RelayRecord>> {
        self.entries.get(&id).map(|entry| entry.value().clone())
    }

    /// Removes and returns the record for the given ID.
    pub fn remove(&self, id: CorrelationId) -> Option<Arc<RelayRecord>> {
        self.entries.remove(&id).map(|(_, record)| record)
    }

    /// Removes the given record if it is still the one stored under `id`.
    ///
    /// This is [`remove`][Self::remove] for a caller that looked the
    /// record up earlier. If the record has been removed in the meantime
    /// and the ID reused by a new request, the new request stays.
    pub fn take(
        &self,
        id: CorrelationId,
        record: &Arc<RelayRecord>,
    ) -> Option<Arc<RelayRecord>> {
        self.entries
            .remove_if(&id, |_, stored| Arc::ptr_eq(stored, record))
            .map(|(_, record)| record)
    }

    /// Returns whether a record is pending under the given ID.
    pub fn contains(&self, id: CorrelationId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the number of pending requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no pending requests.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all records that were forwarded more than `max_age` before
    /// `now`.
    ///
    /// Returns the removed records. A record that completes concurrently
    /// is either returned here or completed, never both.
    pub fn remove_expired(
        &self,
        now: Timestamp,
        max_age: Duration,
    ) -> Vec<(CorrelationId, Arc<RelayRecord>)> {
        // Collect first so that no shard lock is held while removing.
        let candidates: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(now, max_age))
            .map(|entry| *entry.key())
            .collect();

        candidates
            .into_iter()
            .filter_map(|id| {
                self.entries
                    .remove_if(&id, |_, record| {
                        record.is_expired(now, max_age)
                    })
            })
            .collect()
    }
}

//============ Tests =========================================================
