//! Latency statistics for relayed requests.
//!
//! The time a relayed request spends in this server is split into phases:
//!
//! * queue time: the client request waiting for local processing, plus
//!   the final remote response waiting to be picked up by a worker,
//! * processing time: local processing of the client request before it
//!   was forwarded,
//! * remote time: from forwarding until the last remote server created
//!   its response,
//! * response processing time: handling of the final remote response,
//!   including the reply to the client.
//!
//! Each completed request adds its phase durations to the counters of its
//! operation type, plus a total computed from the same instants. The
//! counters only ever grow; a reporting task reads them and derives rates
//! and averages from successive readings.
//!
//! Round trip samples are kept separately: for a lookup, the time until
//! the first remote reply arrived; for an insert, the time until the last
//! remote acknowledgment arrived.

use crate::base::{RequestTiming, Timestamp};
use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

//------------ OperationType -------------------------------------------------

/// The kinds of relayed requests statistics are kept for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationType {
    /// GUID lookups.
    Lookup,

    /// GUID inserts.
    Insert,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Lookup => "lookup",
            OperationType::Insert => "insert",
        })
    }
}

//------------ PhaseDeltas ---------------------------------------------------

/// The phase durations of one completed request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PhaseDeltas {
    /// Time spent waiting in queues.
    pub queue: Duration,

    /// Local processing before forwarding.
    pub processing: Duration,

    /// Forwarding until the final remote response was created.
    pub remote: Duration,

    /// Handling of the final remote response.
    pub response_processing: Duration,

    /// The whole request.
    pub total: Duration,
}

impl PhaseDeltas {
    /// Computes the phases of a request.
    ///
    /// `created` is when the final remote response was created, `started`
    /// and `finished` bracket this server's handling of it.
    ///
    /// The total is not the sum of the other four. It is computed from the
    /// instants directly as the client side intervals plus the span from
    /// forwarding over the response's creation to `finished`. When the
    /// instants are consistent the two agree; when a stamp is out of order
    /// (for instance, `created` after `started`) the individual phases
    /// saturate at zero while the total does not double count.
    pub fn compute(
        timing: &RequestTiming,
        created: Timestamp,
        started: Timestamp,
        finished: Timestamp,
    ) -> Self {
        let queue_time = timing.queue_time();
        let processing_time = timing.processing_time();
        let remote = created.saturating_duration_since(timing.forwarded());
        Self {
            queue: started.saturating_duration_since(created) + queue_time,
            processing: processing_time,
            remote,
            response_processing: finished.saturating_duration_since(started),
            total: finished.saturating_duration_since(created)
                + queue_time
                + processing_time
                + remote,
        }
    }
}

//------------ StatsBank -----------------------------------------------------

/// The counters of one operation type.
///
/// Durations are stored as nanoseconds and saturate rather than wrap.
#[derive(Debug, Default)]
pub struct StatsBank {
    completed: AtomicU64,
    queue_time: AtomicU64,
    processing_time: AtomicU64,
    remote_time: AtomicU64,
    response_processing_time: AtomicU64,
    total_time: AtomicU64,
    rtt_samples: AtomicU64,
    rtt_time: AtomicU64,
}

impl StatsBank {
    /// Adds the phases of one completed request.
    pub fn add(&self, deltas: &PhaseDeltas) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        add_duration(&self.queue_time, deltas.queue);
        add_duration(&self.processing_time, deltas.processing);
        add_duration(&self.remote_time, deltas.remote);
        add_duration(
            &self.response_processing_time,
            deltas.response_processing,
        );
        add_duration(&self.total_time, deltas.total);
    }

    /// Adds one round trip sample.
    pub fn add_rtt(&self, rtt: Duration) {
        self.rtt_samples.fetch_add(1, Ordering::Relaxed);
        add_duration(&self.rtt_time, rtt);
    }

    /// The number of requests whose phases were added.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// The accumulated queue time.
    pub fn queue_time(&self) -> Duration {
        load_duration(&self.queue_time)
    }

    /// The accumulated local processing time.
    pub fn processing_time(&self) -> Duration {
        load_duration(&self.processing_time)
    }

    /// The accumulated remote round trip time.
    pub fn remote_time(&self) -> Duration {
        load_duration(&self.remote_time)
    }

    /// The accumulated response processing time.
    pub fn response_processing_time(&self) -> Duration {
        load_duration(&self.response_processing_time)
    }

    /// The accumulated total time.
    pub fn total_time(&self) -> Duration {
        load_duration(&self.total_time)
    }

    /// The number of round trip samples taken.
    pub fn rtt_samples(&self) -> u64 {
        self.rtt_samples.load(Ordering::Relaxed)
    }

    /// The sum of all round trip samples.
    pub fn rtt_time(&self) -> Duration {
        load_duration(&self.rtt_time)
    }
}

fn add_duration(counter: &AtomicU64, value: Duration) {
    let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
    // The closure never returns None, so neither does fetch_update.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_add(nanos))
    });
}

fn load_duration(counter: &AtomicU64) -> Duration {
    Duration::from_nanos(counter.load(Ordering::Relaxed))
}

//------------ Telemetry -----------------------------------------------------

/// Process-wide relay statistics.
///
/// A server creates one of these at start-up and shares it between the
/// correlator and whatever reports the numbers.
#[derive(Debug, Default)]
pub struct Telemetry {
    /// Whether phase statistics are collected.
    enabled: bool,

    /// Counters for lookups.
    lookup: StatsBank,

    /// Counters for inserts.
    insert: StatsBank,

    /// Remote responses handled, matched or not.
    num_responses: AtomicU64,
}

impl Telemetry {
    /// Creates empty statistics.
    ///
    /// If `enabled` is false, phase statistics are not collected. Round
    /// trip samples and the response count are always kept.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    /// Returns whether phase statistics are collected.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the counters for the given operation type.
    pub fn bank(&self, op: OperationType) -> &StatsBank {
        match op {
            OperationType::Lookup => &self.lookup,
            OperationType::Insert => &self.insert,
        }
    }

    /// Returns the lookup counters.
    pub fn lookup(&self) -> &StatsBank {
        &self.lookup
    }

    /// Returns the insert counters.
    pub fn insert(&self) -> &StatsBank {
        &self.insert
    }

    /// Adds the phases of a completed request, if enabled.
    ///
    /// The arguments are those of [`PhaseDeltas::compute`]. Nothing is
    /// computed when phase statistics are disabled.
    pub fn record(
        &self,
        op: OperationType,
        timing: &RequestTiming,
        created: Timestamp,
        started: Timestamp,
        finished: Timestamp,
    ) {
        if self.enabled {
            self.bank(op).add(&PhaseDeltas::compute(
                timing, created, started, finished,
            ))
        }
    }

    /// Adds a round trip sample.
    pub fn record_rtt(&self, op: OperationType, rtt: Duration) {
        self.bank(op).add_rtt(rtt)
    }

    /// Counts a remote response.
    pub fn count_response(&self) {
        self.num_responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of remote responses handled.
    pub fn num_responses(&self) -> u64 {
        self.num_responses.load(Ordering::Relaxed)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn ms(millis: u64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    fn dur(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn consistent_instants() {
        let timing = RequestTiming::new(ms(0), ms(2), ms(5));
        let deltas = PhaseDeltas::compute(&timing, ms(12), ms(14), ms(17));
        assert_eq!(deltas.queue, dur(2 + 2));
        assert_eq!(deltas.processing, dur(3));
        assert_eq!(deltas.remote, dur(7));
        assert_eq!(deltas.response_processing, dur(3));
        assert_eq!(deltas.total, dur(17));
        assert_eq!(
            deltas.total,
            deltas.queue
                + deltas.processing
                + deltas.remote
                + deltas.response_processing
        );
    }

    #[test]
    fn total_is_computed_independently() {
        // The response claims to have been created after processing of it
        // started, so the response queue interval overlaps with response
        // processing.
        let timing = RequestTiming::new(ms(0), ms(2), ms(5));
        let deltas = PhaseDeltas::compute(&timing, ms(12), ms(10), ms(15));
        assert_eq!(deltas.queue, dur(2));
        assert_eq!(deltas.processing, dur(3));
        assert_eq!(deltas.remote, dur(7));
        assert_eq!(deltas.response_processing, dur(5));

        let summed = deltas.queue
            + deltas.processing
            + deltas.remote
            + deltas.response_processing;
        assert_eq!(summed, dur(17));
        assert_eq!(deltas.total, dur(3 + 2 + 3 + 7));
    }

    #[test]
    fn disabled_telemetry_ignores_phases() {
        let telemetry = Telemetry::new(false);
        let timing = RequestTiming::new(ms(0), ms(1), ms(2));
        telemetry.record(OperationType::Lookup, &timing, ms(4), ms(5), ms(6));
        assert_eq!(telemetry.lookup().completed(), 0);
        assert_eq!(telemetry.lookup().total_time(), Duration::ZERO);

        telemetry.record_rtt(OperationType::Insert, dur(4));
        assert_eq!(telemetry.insert().rtt_samples(), 1);
        assert_eq!(telemetry.insert().rtt_time(), dur(4));
    }

    #[test]
    fn counters_accumulate_per_operation() {
        let telemetry = Telemetry::new(true);
        let timing = RequestTiming::new(ms(0), ms(1), ms(2));
        for _ in 0..2 {
            telemetry.record(
                OperationType::Insert,
                &timing,
                ms(4),
                ms(5),
                ms(6),
            );
        }

        let insert = telemetry.insert();
        assert_eq!(insert.completed(), 2);
        assert_eq!(insert.queue_time(), dur(4));
        assert_eq!(insert.processing_time(), dur(2));
        assert_eq!(insert.remote_time(), dur(4));
        assert_eq!(insert.response_processing_time(), dur(2));
        assert_eq!(insert.total_time(), dur(12));
        assert_eq!(telemetry.lookup().completed(), 0);
    }

    #[test]
    fn counters_saturate() {
        let bank = StatsBank::default();
        bank.add_rtt(Duration::MAX);
        bank.add_rtt(dur(1));
        assert_eq!(bank.rtt_time(), Duration::from_nanos(u64::MAX));
        assert_eq!(bank.rtt_samples(), 2);
    }
}
