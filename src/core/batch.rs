//! # BatchScheduler: drain the retry queue in bounded concurrent waves.
//!
//! One round = one full drain of the task set:
//!
//! ```text
//! seed queue (all tasks, slot order)
//! while queue not empty:
//!   ├─► pop batch = min(limit, len)
//!   ├─► concurrently per task:
//!   │      ensure_started(slot) ── not ready ──► Failure (executor skipped)
//!   │      └─ ready ──► executor.execute(task)
//!   ├─► wait for the WHOLE batch (strictly sequential waves)
//!   └─► route outcomes in batch order:
//!          Success          → record sink, processed += 1
//!          Failure/Timeout  → restart(slot), requeue at the back
//! ```
//!
//! Peak concurrency is the batch size, so `limit` caps both live bid
//! attempts and busy worker processes. Outcomes are routed in batch
//! order (not completion order) so the retry sequence is deterministic.
//!
//! Within a round there is no maximum-attempt cutoff: a task retries
//! until it succeeds or the round is cancelled. That is the documented
//! policy of this system, not an oversight.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::records::RecordSink;
use crate::tasks::{BidTask, Outcome, QueuedTask, RetryQueue};
use crate::worker::WorkerPool;

use super::executor::TaskExecutor;

/// Counters for one finished round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Tasks that reached `Success` this round.
    pub processed: u64,
    /// Batches executed this round.
    pub batches: u64,
    /// Failure/timeout outcomes that went back to the queue.
    pub requeued: u64,
}

/// Drains the retry queue in bounded-size concurrent batches.
pub struct BatchScheduler {
    pool: Arc<WorkerPool>,
    executor: Arc<TaskExecutor>,
    sink: Arc<dyn RecordSink>,
    bus: Bus,
    limit: usize,
}

impl BatchScheduler {
    /// Creates a scheduler; `limit` is the batch size / concurrency cap.
    pub fn new(
        pool: Arc<WorkerPool>,
        executor: Arc<TaskExecutor>,
        sink: Arc<dyn RecordSink>,
        bus: Bus,
        limit: usize,
    ) -> Self {
        Self {
            pool,
            executor,
            sink,
            bus,
            limit: limit.max(1),
        }
    }

    /// Runs one round: drains all of `tasks` to success, or stops after
    /// the in-flight batch when `token` is cancelled.
    pub async fn run_round(
        &self,
        round: u64,
        tasks: &[BidTask],
        token: &CancellationToken,
    ) -> RoundStats {
        let queue = RetryQueue::seeded(tasks);
        let mut stats = RoundStats::default();

        while !queue.is_empty() {
            if token.is_cancelled() {
                break;
            }
            stats.batches += 1;
            let batch = queue.dequeue_batch(self.limit);
            self.bus.publish(
                Event::now(EventKind::BatchStarted)
                    .with_round(round)
                    .with_batch(stats.batches)
                    .with_processed(batch.len() as u64)
                    .with_remaining(queue.len() as u64),
            );

            // Spawn every task of the wave, then await them in batch
            // order: all run concurrently, and routing order (hence
            // requeue order) stays deterministic.
            let mut in_flight = Vec::with_capacity(batch.len());
            for entry in batch {
                let pool = Arc::clone(&self.pool);
                let executor = Arc::clone(&self.executor);
                let task = entry.task.clone();
                let attempt = entry.attempt;
                let attempt_token = token.clone();
                let handle = tokio::spawn(async move {
                    // a straggler scheduled right before shutdown must
                    // not bring up a worker the teardown won't see
                    if attempt_token.is_cancelled() {
                        return Outcome::Failure("runtime stopping".into());
                    }
                    match pool.ensure_started(task.slot(), task.target()).await {
                        Ok(()) => executor.execute(&task, attempt, &attempt_token).await,
                        // readiness failure: classified without invoking
                        // the executor at all
                        Err(e) => Outcome::Failure(e.to_string().into()),
                    }
                });
                in_flight.push((entry, handle));
            }

            for (entry, handle) in in_flight {
                let outcome = handle
                    .await
                    .unwrap_or_else(|e| Outcome::Failure(format!("attempt panicked: {e}").into()));
                self.route(round, entry, outcome, &queue, &mut stats, token)
                    .await;
            }
        }
        stats
    }

    /// Routes one outcome: success leaves the round, anything else
    /// restarts the slot's worker and requeues at the back.
    async fn route(
        &self,
        _round: u64,
        entry: QueuedTask,
        outcome: Outcome,
        queue: &RetryQueue,
        stats: &mut RoundStats,
        token: &CancellationToken,
    ) {
        let slot = entry.task.slot();
        match outcome {
            Outcome::Success(record) => {
                // A failed append loses the observation but never
                // re-runs the bid; the attempt itself succeeded.
                let ev = match self.sink.append(&record).await {
                    Ok(true) => Event::now(EventKind::RecordAppended),
                    Ok(false) => Event::now(EventKind::RecordSkipped),
                    Err(e) => {
                        Event::now(EventKind::RecordFailed).with_reason(e.to_string())
                    }
                };
                self.bus.publish(
                    ev.with_slot(slot)
                        .with_target(Arc::clone(entry.task.target())),
                );
                self.bus.publish(
                    Event::now(EventKind::TaskSucceeded)
                        .with_slot(slot)
                        .with_attempt(entry.attempt),
                );
                stats.processed += 1;
            }
            Outcome::Failure(reason) => {
                self.bus.publish(
                    Event::now(EventKind::TaskFailed)
                        .with_slot(slot)
                        .with_attempt(entry.attempt)
                        .with_reason(Arc::clone(&reason)),
                );
                self.recover(entry, queue, stats, token).await;
            }
            // TimeoutHit was already published by the executor; queueing
            // treatment is identical to Failure.
            Outcome::Timeout { .. } => {
                self.recover(entry, queue, stats, token).await;
            }
        }
    }

    /// Forced worker restart + requeue at the back.
    ///
    /// Skipped during shutdown: there is no point recycling a worker
    /// that `shutdown_all` is about to tear down, and the round is over.
    async fn recover(
        &self,
        entry: QueuedTask,
        queue: &RetryQueue,
        stats: &mut RoundStats,
        token: &CancellationToken,
    ) {
        if token.is_cancelled() {
            return;
        }
        let _ = self
            .pool
            .restart(entry.task.slot(), entry.task.target())
            .await;
        stats.requeued += 1;
        queue.enqueue(QueuedTask {
            task: entry.task,
            attempt: entry.attempt + 1,
        });
    }
}
