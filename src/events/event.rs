//! # Runtime events emitted by the scheduler, pool, and round loop.
//!
//! [`EventKind`] classifies events across four categories:
//! - **Round events**: round start/completion, pacing (sleep, overrun)
//! - **Batch and task events**: batch waves and per-attempt outcomes
//! - **Worker events**: process lifecycle (starting, ready, restart, stop)
//! - **Shutdown events**: operator-initiated teardown
//!
//! The [`Event`] struct carries optional metadata (slot, round, batch,
//! attempt, reason, delays) set via builder methods.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that
//! increases monotonically. Use `seq` to restore exact order when
//! events are delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Round events ===
    /// A new round is starting with the full task set.
    ///
    /// Sets: `round`, `at`, `seq`.
    RoundStarted,

    /// A round drained its queue (or was cut short by shutdown).
    ///
    /// Sets: `round`, `processed`, `batch` (total batches), `at`, `seq`.
    RoundCompleted,

    /// A round took longer than the fixed interval; the next round
    /// starts with zero delay.
    ///
    /// Sets: `round`, `delay_ms` (elapsed), `at`, `seq`.
    RoundOverrun,

    /// The loop is sleeping the remainder of the interval.
    ///
    /// Sets: `delay_ms`, `at`, `seq`.
    SleepScheduled,

    // === Batch and task events ===
    /// A batch of tasks was popped from the retry queue.
    ///
    /// Sets: `round`, `batch` (1-based index), `processed` (batch
    /// size), `remaining` (queue length after the pop), `at`, `seq`.
    BatchStarted,

    /// A task attempt is starting.
    ///
    /// Sets: `slot`, `target`, `attempt`, `at`, `seq`.
    TaskStarting,

    /// A task attempt succeeded; the task leaves the round.
    ///
    /// Sets: `slot`, `attempt`, `at`, `seq`.
    TaskSucceeded,

    /// A task attempt failed and the task goes back to the queue.
    ///
    /// Sets: `slot`, `attempt`, `reason`, `at`, `seq`.
    TaskFailed,

    /// A task attempt exceeded its deadline (always followed by a
    /// worker restart and requeue, like `TaskFailed`).
    ///
    /// Sets: `slot`, `attempt`, `timeout_ms`, `at`, `seq`.
    TimeoutHit,

    // === Worker events ===
    /// A worker process is being launched for a slot.
    ///
    /// Sets: `slot`, `target`, `at`, `seq`.
    WorkerStarting,

    /// A slot's control endpoint became reachable.
    ///
    /// Sets: `slot`, `at`, `seq`.
    WorkerReady,

    /// A slot's control endpoint never became reachable within the
    /// readiness window.
    ///
    /// Sets: `slot`, `reason`, `at`, `seq`.
    WorkerUnready,

    /// A slot's worker is being torn down and relaunched.
    ///
    /// Sets: `slot`, `at`, `seq`.
    WorkerRestarting,

    /// A slot's worker was terminated and discarded.
    ///
    /// Sets: `slot`, `at`, `seq`.
    WorkerStopped,

    // === Record sink events ===
    /// An observation record was appended to the sink.
    ///
    /// Sets: `slot`, `target`, `at`, `seq`.
    RecordAppended,

    /// An observation record duplicated an existing row and was skipped.
    ///
    /// Sets: `slot`, `target`, `at`, `seq`.
    RecordSkipped,

    /// An observation record could not be persisted (sink I/O error).
    /// The observation is lost; the task still counts as processed.
    ///
    /// Sets: `slot`, `target`, `reason`, `at`, `seq`.
    RecordFailed,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// The round loop stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; workers are torn down anyway.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Slot index, if applicable.
    pub slot: Option<u32>,
    /// Round counter (1-based).
    pub round: Option<u64>,
    /// Batch counter within the round (1-based), or total batches.
    pub batch: Option<u64>,
    /// Attempt count within the round (starting from 1).
    pub attempt: Option<u32>,
    /// Target page reference.
    pub target: Option<Arc<str>>,
    /// Human-readable reason (errors, overrun details, etc.).
    pub reason: Option<Arc<str>>,
    /// Delay or elapsed time in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Attempt timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Processed-task counter (round totals, batch sizes).
    pub processed: Option<u64>,
    /// Tasks still waiting in the queue.
    pub remaining: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            round: None,
            batch: None,
            attempt: None,
            target: None,
            reason: None,
            delay_ms: None,
            timeout_ms: None,
            processed: None,
            remaining: None,
        }
    }

    /// Attaches a slot index.
    #[inline]
    pub fn with_slot(mut self, slot: u32) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a round counter.
    #[inline]
    pub fn with_round(mut self, round: u64) -> Self {
        self.round = Some(round);
        self
    }

    /// Attaches a batch counter.
    #[inline]
    pub fn with_batch(mut self, batch: u64) -> Self {
        self.batch = Some(batch);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a target reference.
    #[inline]
    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay/elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a processed-task counter.
    #[inline]
    pub fn with_processed(mut self, n: u64) -> Self {
        self.processed = Some(n);
        self
    }

    /// Attaches a remaining-queue counter.
    #[inline]
    pub fn with_remaining(mut self, n: u64) -> Self {
        self.remaining = Some(n);
        self
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::now(EventKind::RoundStarted);
        let b = Event::now(EventKind::RoundStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::now(EventKind::TaskFailed)
            .with_slot(4)
            .with_attempt(2)
            .with_reason("no biddable data")
            .with_timeout(Duration::from_secs(60));
        assert_eq!(ev.kind, EventKind::TaskFailed);
        assert_eq!(ev.slot, Some(4));
        assert_eq!(ev.attempt, Some(2));
        assert_eq!(ev.reason.as_deref(), Some("no biddable data"));
        assert_eq!(ev.timeout_ms, Some(60_000));
    }
}
