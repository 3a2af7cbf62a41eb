//! # bidvisor
//!
//! **Bidvisor** is a batched retry scheduler with bounded concurrency and
//! browser-process lifecycle supervision.
//!
//! It runs rounds of bid-monitoring tasks against browser-rendered pages:
//! every task in a round is retried until it succeeds, concurrency never
//! exceeds a fixed cap, and a failed attempt restarts the browser worker
//! behind it before the task is tried again. Rounds repeat on a fixed
//! interval until a shutdown signal arrives.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   BidTask    │   │   BidTask    │   │   BidTask    │
//!     │  (slot 0)    │   │  (slot 1)    │   │  (slot N)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (runtime orchestrator)                                │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - WorkerPool (one browser slot per task)                         │
//! │  - RoundLoop (fixed-interval pacing)                              │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                    ┌───────────────────────┐
//!                    │    BatchScheduler     │
//!                    │  (retry-until-done)   │
//!                    └───────────┬───────────┘
//!          ┌─────────────────────┼─────────────────────┐
//!          ▼                     ▼                     ▼
//!   ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!   │ TaskExecutor │     │ TaskExecutor │     │ TaskExecutor │
//!   │ (attempt +   │     │ (attempt +   │     │ (attempt +   │
//!   │  timeout)    │     │  timeout)    │     │  timeout)    │
//!   └──────┬───────┘     └──────┬───────┘     └──────┬───────┘
//!          │                    │                    │
//!          ▼                    ▼                    ▼
//!   ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!   │ BrowserWorker│     │ BrowserWorker│     │ BrowserWorker│
//!   │ (slot 0)     │     │ (slot 1)     │     │ (slot N)     │
//!   └──────────────┘     └──────────────┘     └──────────────┘
//!
//!   success ──► RecordSink (dedup append)
//!   failure ──► WorkerPool::restart(slot) ──► back of RetryQueue
//! ```
//!
//! ### Round lifecycle
//! ```text
//! RoundLoop::run()
//!
//! loop {
//!   ├─► publish RoundStarted{ round }
//!   ├─► BatchScheduler::run_round(tasks)
//!   │       │
//!   │       loop while queue non-empty && !cancelled {
//!   │         ├─► dequeue up to max_concurrent tasks
//!   │         ├─► publish BatchStarted{ batch, size, remaining }
//!   │         ├─► spawn one attempt per task:
//!   │         │     ├─ WorkerPool::ensure_started(slot) (lazy + readiness)
//!   │         │     └─ TaskExecutor::execute (timeout-bounded)
//!   │         └─► await attempts in batch order:
//!   │               ├─ Success ─► sink.append ─► RecordAppended/Skipped
//!   │               └─ Failure/Timeout ─► restart worker, requeue attempt+1
//!   │       }
//!   ├─► publish RoundCompleted{ processed, batches, elapsed }
//!   ├─► break if cancelled
//!   └─► sleep(interval - elapsed)  (cancellable; overrun starts next
//!                                   round immediately, no catch-up)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                        |
//! |-------------------|----------------------------------------------------------------------|-------------------------------------------|
//! | **Scheduling**    | Retry-until-success rounds with a hard concurrency cap.              | [`BatchScheduler`], [`RetryQueue`]        |
//! | **Pacing**        | Fixed-interval rounds with overrun compression.                      | [`RoundLoop`]                             |
//! | **Workers**       | Browser-process lifecycle: spawn, readiness probe, restart, kill.    | [`WorkerPool`], [`WorkerLifecycle`]       |
//! | **Execution**     | Per-attempt timeout and panic isolation.                             | [`TaskExecutor`], [`Bidder`]              |
//! | **Records**       | Deduplicated append-only bid records.                                | [`RecordSink`], [`JsonlSink`]             |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom subscribers).   | [`Subscribe`], [`LogWriter`]              |
//! | **Errors**        | Typed errors for orchestration, execution, and workers.              | [`RuntimeError`], [`ExecError`]           |
//! | **Configuration** | Centralize runtime settings.                                         | [`Config`]                                |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use bidvisor::{
//!     BrowserConfig, BrowserLifecycle, Config, JsonlSink, LogWriter, Subscribe, Supervisor,
//!     load_tasks,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.interval = Duration::from_secs(60);
//!
//!     let tasks = load_tasks("tasks.json")?;
//!
//!     let lifecycle = Arc::new(BrowserLifecycle::new(BrowserConfig::default()));
//!     let bidder = Arc::new(MyBidder);
//!     let sink = Arc::new(JsonlSink::open("bids.jsonl").await?);
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!
//!     let sup = Supervisor::builder(cfg, lifecycle, bidder)
//!         .with_sink(sink)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     sup.run(tasks).await?;
//!     Ok(())
//! }
//! # use bidvisor::{BidRecord, BidTask, Bidder, ExecError};
//! # use tokio_util::sync::CancellationToken;
//! # struct MyBidder;
//! # #[async_trait::async_trait]
//! # impl Bidder for MyBidder {
//! #     async fn run_bid(
//! #         &self,
//! #         _task: &BidTask,
//! #         _port: u16,
//! #         _ctx: CancellationToken,
//! #     ) -> Result<BidRecord, ExecError> {
//! #         Err(ExecError::Fail { reason: "not implemented".into() })
//! #     }
//! # }
//! ```
mod config;
mod core;
mod error;
mod events;
mod records;
mod subscribers;
mod tasks;
mod worker;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    BatchScheduler, RoundLoop, RoundStats, Supervisor, SupervisorBuilder, TaskExecutor,
    wait_for_shutdown_signal,
};
pub use error::{ExecError, LoadError, RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use records::{BidRecord, JsonlSink, MemorySink, RecordSink};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{BidTask, Bidder, Outcome, QueuedTask, RetryQueue, load_tasks};
pub use worker::{BrowserConfig, BrowserLifecycle, Worker, WorkerLifecycle, WorkerPool};
