//! # Execute one task attempt with timeout isolation.
//!
//! The bid operation runs inside a **spawned** tokio task so a hang in
//! the collaborator can never block the scheduler; the scheduler only
//! waits on the join handle, under the configured deadline.
//!
//! ## Timeout semantics
//! On deadline the child token is cancelled and the join handle is
//! dropped — the spawned attempt keeps running detached if it ignores
//! the token. This weak cancellation is the contract, not a bug: the
//! caller must treat the attempt's resources as leaked and rely on the
//! worker restart that the scheduler issues for every non-success.
//!
//! ## Event flow
//! ```text
//! execute() ──► publish TaskStarting
//!          ──► spawn(bidder.run_bid) under timeout
//!                 ├─ Ok(record)   → Outcome::Success
//!                 ├─ Err(e)       → Outcome::Failure
//!                 ├─ panic        → Outcome::Failure (join error)
//!                 └─ deadline     → publish TimeoutHit → Outcome::Timeout
//! ```
//! Terminal `TaskSucceeded`/`TaskFailed` events are the batch
//! scheduler's responsibility (it also covers readiness failures, where
//! this executor is never invoked).

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{BidTask, Bidder, Outcome};

/// Runs single attempts of the opaque bid operation under a deadline.
pub struct TaskExecutor {
    bidder: Arc<dyn Bidder>,
    bus: Bus,
    timeout: Duration,
    base_port: u16,
}

impl TaskExecutor {
    /// Creates an executor for the given collaborator.
    pub fn new(bidder: Arc<dyn Bidder>, bus: Bus, cfg: &Config) -> Self {
        Self {
            bidder,
            bus,
            timeout: cfg.task_timeout,
            base_port: cfg.base_port,
        }
    }

    /// Executes one attempt of `task` and classifies the result.
    ///
    /// `parent` is the runtime token; each attempt gets a child token
    /// so cancelling one attempt never affects the parent or sibling
    /// attempts.
    pub async fn execute(
        &self,
        task: &BidTask,
        attempt: u32,
        parent: &CancellationToken,
    ) -> Outcome {
        self.bus.publish(
            Event::now(EventKind::TaskStarting)
                .with_slot(task.slot())
                .with_attempt(attempt)
                .with_target(Arc::clone(task.target())),
        );

        let child = parent.child_token();
        let port = self.base_port.wrapping_add(task.slot() as u16);
        let handle = {
            let bidder = Arc::clone(&self.bidder);
            let task = task.clone();
            let ctx = child.clone();
            tokio::spawn(async move { bidder.run_bid(&task, port, ctx).await })
        };

        match time::timeout(self.timeout, handle).await {
            Err(_elapsed) => {
                // Advisory: the detached attempt may still be running.
                child.cancel();
                self.bus.publish(
                    Event::now(EventKind::TimeoutHit)
                        .with_slot(task.slot())
                        .with_attempt(attempt)
                        .with_timeout(self.timeout),
                );
                Outcome::Timeout {
                    timeout: self.timeout,
                }
            }
            Ok(Ok(Ok(record))) => Outcome::Success(record),
            Ok(Ok(Err(e))) => Outcome::Failure(e.to_string().into()),
            Ok(Err(join_err)) => Outcome::Failure(format!("attempt panicked: {join_err}").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecError;
    use crate::records::BidRecord;
    use async_trait::async_trait;

    fn task() -> BidTask {
        BidTask::new(0, "https://a.example/1", "C-1", 500)
    }

    fn cfg(timeout: Duration) -> Config {
        let mut cfg = Config::default();
        cfg.task_timeout = timeout;
        cfg
    }

    struct Ok200;

    #[async_trait]
    impl Bidder for Ok200 {
        async fn run_bid(
            &self,
            task: &BidTask,
            _port: u16,
            _ctx: CancellationToken,
        ) -> Result<BidRecord, ExecError> {
            Ok(BidRecord {
                target: task.target().to_string(),
                code: "B-9".into(),
                value: 200,
                observed_at: "t0".into(),
                placed: false,
            })
        }
    }

    struct NoData;

    #[async_trait]
    impl Bidder for NoData {
        async fn run_bid(
            &self,
            _task: &BidTask,
            _port: u16,
            _ctx: CancellationToken,
        ) -> Result<BidRecord, ExecError> {
            Err(ExecError::Fail {
                reason: "no biddable data".into(),
            })
        }
    }

    struct Hang;

    #[async_trait]
    impl Bidder for Hang {
        async fn run_bid(
            &self,
            _task: &BidTask,
            _port: u16,
            _ctx: CancellationToken,
        ) -> Result<BidRecord, ExecError> {
            // ignores the token on purpose: the deadline must fire anyway
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    }

    struct Panics;

    #[async_trait]
    impl Bidder for Panics {
        async fn run_bid(
            &self,
            _task: &BidTask,
            _port: u16,
            _ctx: CancellationToken,
        ) -> Result<BidRecord, ExecError> {
            panic!("collaborator bug");
        }
    }

    #[tokio::test]
    async fn success_carries_the_record() {
        let exec = TaskExecutor::new(Arc::new(Ok200), Bus::new(64), &cfg(Duration::from_secs(5)));
        let token = CancellationToken::new();
        match exec.execute(&task(), 1, &token).await {
            Outcome::Success(rec) => assert_eq!(rec.value, 200),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn negative_result_maps_to_failure() {
        let exec = TaskExecutor::new(Arc::new(NoData), Bus::new(64), &cfg(Duration::from_secs(5)));
        let token = CancellationToken::new();
        match exec.execute(&task(), 1, &token).await {
            Outcome::Failure(reason) => assert!(reason.contains("no biddable data")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hang_is_abandoned_at_the_deadline() {
        let exec = TaskExecutor::new(Arc::new(Hang), Bus::new(64), &cfg(Duration::from_millis(50)));
        let token = CancellationToken::new();
        match exec.execute(&task(), 1, &token).await {
            Outcome::Timeout { timeout } => assert_eq!(timeout, Duration::from_millis(50)),
            other => panic!("expected timeout, got {other:?}"),
        }
        // the scheduler itself is free again; the parent token is untouched
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn collaborator_panic_is_contained() {
        let exec = TaskExecutor::new(Arc::new(Panics), Bus::new(64), &cfg(Duration::from_secs(5)));
        let token = CancellationToken::new();
        match exec.execute(&task(), 1, &token).await {
            Outcome::Failure(reason) => assert!(reason.contains("panicked")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
