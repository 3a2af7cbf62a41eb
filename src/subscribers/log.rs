//! # Built-in logging subscriber.
//!
//! [`LogWriter`] renders every runtime event through `tracing`, one
//! line per event, so that the whole state machine (rounds, batches,
//! per-task outcomes, restarts, sleeps) is visible without attaching a
//! custom subscriber.
//!
//! ## Output shape
//! ```text
//! INFO round started round=3
//! INFO batch started round=3 batch=1 size=50 remaining=12
//! INFO task starting slot=4 attempt=1
//! WARN task failed slot=4 attempt=1 reason="no biddable data"
//! INFO worker restarting slot=4
//! INFO round completed round=3 processed=62 batches=2
//! INFO sleeping delay_ms=41300
//! ```

use crate::events::{Event, EventKind};
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Event-to-log renderer over `tracing`.
///
/// Attach it via
/// [`SupervisorBuilder::with_subscribers`](crate::SupervisorBuilder::with_subscribers);
/// plug a custom [`Subscribe`](crate::Subscribe) implementation for
/// metrics or alerting instead.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl super::Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::RoundStarted => {
                info!(round = e.round, "round started");
            }
            EventKind::RoundCompleted => {
                info!(
                    round = e.round,
                    processed = e.processed,
                    batches = e.batch,
                    "round completed"
                );
            }
            EventKind::RoundOverrun => {
                warn!(
                    round = e.round,
                    elapsed_ms = e.delay_ms,
                    "round overran the interval; starting next round immediately"
                );
            }
            EventKind::SleepScheduled => {
                info!(delay_ms = e.delay_ms, "sleeping until next round");
            }
            EventKind::BatchStarted => {
                info!(
                    round = e.round,
                    batch = e.batch,
                    size = e.processed,
                    remaining = e.remaining,
                    "batch started"
                );
            }
            EventKind::TaskStarting => {
                info!(
                    slot = e.slot,
                    attempt = e.attempt,
                    target = e.target.as_deref(),
                    "task starting"
                );
            }
            EventKind::TaskSucceeded => {
                info!(slot = e.slot, attempt = e.attempt, "task succeeded");
            }
            EventKind::TaskFailed => {
                warn!(
                    slot = e.slot,
                    attempt = e.attempt,
                    reason = e.reason.as_deref(),
                    "task failed"
                );
            }
            EventKind::TimeoutHit => {
                warn!(
                    slot = e.slot,
                    attempt = e.attempt,
                    timeout_ms = e.timeout_ms,
                    "task timed out"
                );
            }
            EventKind::WorkerStarting => {
                info!(slot = e.slot, target = e.target.as_deref(), "worker starting");
            }
            EventKind::WorkerReady => {
                info!(slot = e.slot, "worker ready");
            }
            EventKind::WorkerUnready => {
                warn!(
                    slot = e.slot,
                    reason = e.reason.as_deref(),
                    "worker not ready"
                );
            }
            EventKind::WorkerRestarting => {
                info!(slot = e.slot, "worker restarting");
            }
            EventKind::WorkerStopped => {
                info!(slot = e.slot, "worker stopped");
            }
            EventKind::RecordAppended => {
                info!(slot = e.slot, target = e.target.as_deref(), "record appended");
            }
            EventKind::RecordSkipped => {
                info!(
                    slot = e.slot,
                    target = e.target.as_deref(),
                    "duplicate record skipped"
                );
            }
            EventKind::RecordFailed => {
                error!(
                    slot = e.slot,
                    target = e.target.as_deref(),
                    reason = e.reason.as_deref(),
                    "record lost: append failed"
                );
            }
            EventKind::ShutdownRequested => {
                info!("shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!("round loop stopped within grace");
            }
            EventKind::GraceExceeded => {
                error!("shutdown grace exceeded; tearing down workers anyway");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
