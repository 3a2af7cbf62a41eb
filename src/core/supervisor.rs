//! # Supervisor: wires the runtime together and drives shutdown.
//!
//! The [`Supervisor`] owns the event bus, the subscriber fan-out, and
//! the collaborator seams (worker lifecycle, bidder, record sink). Its
//! [`run`](Supervisor::run) builds the worker pool sized to the highest
//! task slot index, spawns the round loop, and `select`s against the OS
//! shutdown signal.
//!
//! ## Shutdown path
//! ```text
//! signal ──► publish ShutdownRequested
//!        ──► cancel runtime token
//!        ──► wait up to cfg.grace for the in-flight batch to finish
//!               ├─ joined   → publish AllStoppedWithin
//!               └─ timeout  → publish GraceExceeded (live slots reported)
//!        ──► pool.shutdown_all()   (always — no orphaned processes)
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use bidvisor::{
//!     BrowserConfig, BrowserLifecycle, Config, LogWriter, Subscribe, Supervisor, load_tasks,
//! };
//! # use bidvisor::{BidRecord, BidTask, Bidder, ExecError};
//! # struct MyBidder;
//! # #[async_trait::async_trait]
//! # impl Bidder for MyBidder {
//! #     async fn run_bid(
//! #         &self,
//! #         _task: &BidTask,
//! #         _port: u16,
//! #         _ctx: tokio_util::sync::CancellationToken,
//! #     ) -> Result<BidRecord, ExecError> {
//! #         Err(ExecError::Fail { reason: "todo".into() })
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tasks = load_tasks("tasks.json")?;
//!     let lifecycle = Arc::new(BrowserLifecycle::new(BrowserConfig::default()));
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!
//!     let sup = Supervisor::builder(Config::default(), lifecycle, Arc::new(MyBidder))
//!         .with_subscribers(subs)
//!         .build();
//!     sup.run(tasks).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::records::RecordSink;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{BidTask, Bidder};
use crate::worker::{WorkerLifecycle, WorkerPool};

use super::batch::BatchScheduler;
use super::builder::SupervisorBuilder;
use super::executor::TaskExecutor;
use super::rounds::RoundLoop;
use super::shutdown;

/// Coordinates the round loop, event delivery, and graceful shutdown.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    lifecycle: Arc<dyn WorkerLifecycle>,
    bidder: Arc<dyn Bidder>,
    sink: Arc<dyn RecordSink>,
}

impl Supervisor {
    /// Starts building a supervisor with the mandatory collaborators.
    pub fn builder(
        cfg: Config,
        lifecycle: Arc<dyn WorkerLifecycle>,
        bidder: Arc<dyn Bidder>,
    ) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg, lifecycle, bidder)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        lifecycle: Arc<dyn WorkerLifecycle>,
        bidder: Arc<dyn Bidder>,
        sink: Arc<dyn RecordSink>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self {
            cfg,
            bus,
            subs,
            lifecycle,
            bidder,
            sink,
        }
    }

    /// Runs rounds over `tasks` until an OS termination signal arrives,
    /// then shuts down gracefully.
    pub async fn run(&self, tasks: Vec<BidTask>) -> Result<(), RuntimeError> {
        self.run_with_shutdown(tasks, async {
            let _ = shutdown::wait_for_shutdown_signal().await;
        })
        .await
    }

    /// Like [`run`](Supervisor::run), but with a caller-supplied
    /// shutdown future instead of OS signals. Completion of `stop`
    /// triggers the same graceful teardown.
    pub async fn run_with_shutdown<F>(
        &self,
        tasks: Vec<BidTask>,
        stop: F,
    ) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        self.subscriber_listener();

        // Size by the highest slot index, not the list length: a
        // filtered task list keeps its original slot assignments, so
        // the indices may be sparse.
        let slot_count = tasks
            .iter()
            .map(|t| t.slot() as usize + 1)
            .max()
            .unwrap_or(0);
        let pool = Arc::new(WorkerPool::new(
            slot_count,
            Arc::clone(&self.lifecycle),
            self.bus.clone(),
            &self.cfg,
        ));
        let executor = Arc::new(TaskExecutor::new(
            Arc::clone(&self.bidder),
            self.bus.clone(),
            &self.cfg,
        ));
        let scheduler = BatchScheduler::new(
            Arc::clone(&pool),
            executor,
            Arc::clone(&self.sink),
            self.bus.clone(),
            self.cfg.batch_limit(),
        );
        let rounds = RoundLoop::new(scheduler, self.bus.clone(), self.cfg.interval);

        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        {
            let child = token.child_token();
            set.spawn(async move { rounds.run(&tasks, &child).await });
        }

        let result = tokio::select! {
            _ = stop => {
                self.bus.publish(Event::now(EventKind::ShutdownRequested));
                token.cancel();
                self.wait_with_grace(&mut set, &pool).await
            }
            _ = async { while set.join_next().await.is_some() {} } => Ok(()),
        };

        pool.shutdown_all().await;
        result
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }

    /// Waits for the round loop to finish within the grace window.
    ///
    /// The in-flight batch is allowed to complete; past the window the
    /// loop is aborted and the still-live slots are reported.
    async fn wait_with_grace(
        &self,
        set: &mut JoinSet<()>,
        pool: &Arc<WorkerPool>,
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async { while set.join_next().await.is_some() {} };
        let joined = tokio::time::timeout(grace, done).await.is_ok();

        if joined {
            self.bus.publish(Event::now(EventKind::AllStoppedWithin));
            Ok(())
        } else {
            self.bus.publish(Event::now(EventKind::GraceExceeded));
            set.abort_all();
            let stuck = pool.live_slots().await;
            Err(RuntimeError::GraceExceeded { grace, stuck })
        }
    }
}
