//! Discarding requests whose remote servers never reply.
//!
//! A remote server may be down or its response may get lost. The
//! correlator never gives up on a request by itself, so without
//! intervention such a request would stay in the table forever. The
//! [`Sweeper`] periodically removes requests that have waited longer than
//! the configured maximum age.
//!
//! Removal goes through the table just like completion does, so a response
//! arriving after its request was swept is treated as stale.

use super::clock::Clock;
use super::config::Config;
use super::record::RelayRecord;
use super::table::{CorrelationId, PendingRequestTable};
use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;
use tracing::warn;

//------------ Sweeper -------------------------------------------------------

/// Removes pending requests that have waited too long.
#[derive(Clone, Debug)]
pub struct Sweeper<C> {
    /// The table to sweep.
    table: Arc<PendingRequestTable>,

    /// The source of the current time.
    clock: C,

    /// How long a request may wait after it was forwarded.
    max_age: Duration,
}

impl<C: Clock> Sweeper<C> {
    /// Creates a sweeper for `table` using the maximum age from `config`.
    pub fn new(
        table: Arc<PendingRequestTable>,
        clock: C,
        config: &Config,
    ) -> Self {
        Self {
            table,
            clock,
            max_age: config.max_pending_age(),
        }
    }

    /// Returns the maximum age of pending requests.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Removes all requests that are too old right now.
    ///
    /// The removed records are returned. Their clients will not receive a
    /// reply from the relay.
    pub fn sweep(&self) -> Vec<(CorrelationId, Arc<RelayRecord>)> {
        let now = self.clock.now();
        let removed = self.table.remove_expired(now, self.max_age);
        for (id, record) in &removed {
            warn!(
                request_id = %id,
                client = %record.client().origin(),
                missing = ?record.remaining_servers(),
                "Discarding relayed request without reply"
            );
        }
        removed
    }
}

#[cfg(feature = "sweep")]
impl<C: Clock + 'static> Sweeper<C> {
    /// Sweeps the table every `period` until the task is dropped.
    ///
    /// This needs to run inside a Tokio runtime with the time driver
    /// enabled.
    pub async fn run(self, period: Duration) {
        use tokio::time::{interval, MissedTickBehavior};

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let removed = self.sweep();
            if !removed.is_empty() {
                tracing::debug!(
                    count = removed.len(),
                    "Swept expired requests"
                );
            }
        }
    }
}

//============ Tests =========================================================
