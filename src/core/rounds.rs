//! # RoundLoop: fixed-interval pacing over full drains of the task set.
//!
//! State machine: `RoundRunning → Sleeping → RoundRunning → ...`, with
//! no terminal state under normal operation — only cancellation stops
//! the loop.
//!
//! Each iteration records the start instant, runs one round to
//! completion, and sleeps `interval - elapsed`. A round that overruns
//! the interval compresses the cadence: the next round starts
//! immediately with an overrun event. There is no catch-up scheduling
//! and no skipped rounds.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::tasks::BidTask;

use super::batch::BatchScheduler;

/// Repeats full rounds at a fixed cadence.
pub struct RoundLoop {
    scheduler: BatchScheduler,
    bus: Bus,
    interval: Duration,
}

impl RoundLoop {
    /// Creates the loop around a batch scheduler.
    pub fn new(scheduler: BatchScheduler, bus: Bus, interval: Duration) -> Self {
        Self {
            scheduler,
            bus,
            interval,
        }
    }

    /// Runs rounds until `token` is cancelled.
    ///
    /// Cancellation is observed between batches (inside the scheduler)
    /// and during the inter-round sleep; an in-flight batch always
    /// finishes first.
    pub async fn run(&self, tasks: &[BidTask], token: &CancellationToken) {
        let mut round: u64 = 0;
        while !token.is_cancelled() {
            round += 1;
            self.bus
                .publish(Event::now(EventKind::RoundStarted).with_round(round));

            let started = Instant::now();
            let stats = self.scheduler.run_round(round, tasks, token).await;
            let elapsed = started.elapsed();

            self.bus.publish(
                Event::now(EventKind::RoundCompleted)
                    .with_round(round)
                    .with_processed(stats.processed)
                    .with_batch(stats.batches)
                    .with_delay(elapsed),
            );

            if token.is_cancelled() {
                break;
            }

            match self.interval.checked_sub(elapsed) {
                Some(wait) if wait > Duration::ZERO => {
                    self.bus
                        .publish(Event::now(EventKind::SleepScheduled).with_delay(wait));
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = token.cancelled() => break,
                    }
                }
                _ => {
                    // elapsed >= interval: next round starts with zero
                    // delay, never a negative sleep
                    self.bus.publish(
                        Event::now(EventKind::RoundOverrun)
                            .with_round(round)
                            .with_delay(elapsed),
                    );
                }
            }
        }
    }
}
