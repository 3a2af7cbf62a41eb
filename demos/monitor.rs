//! End-to-end simulated run: in-process fake workers and a flaky
//! bidder, so the whole round/batch/retry machinery is observable
//! without spawning real browsers.
//!
//! Run with: `cargo run --example monitor` and stop with Ctrl-C.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use bidvisor::{
    BidRecord, BidTask, Bidder, Config, ExecError, LogWriter, MemorySink, Subscribe, Supervisor,
    Worker, WorkerError, WorkerLifecycle,
};

/// Stand-in for a browser process: spawns nothing, always healthy.
struct SimLifecycle;

struct SimWorker(u32);

#[async_trait]
impl Worker for SimWorker {
    fn id(&self) -> Option<u32> {
        Some(self.0)
    }

    async fn terminate(&mut self, _grace: Duration) {}
}

#[async_trait]
impl WorkerLifecycle for SimLifecycle {
    async fn start(&self, slot: u32, _target: &str) -> Result<Box<dyn Worker>, WorkerError> {
        Ok(Box::new(SimWorker(slot)))
    }

    async fn health_check(&self, _slot: u32, _target: &str) -> bool {
        true
    }
}

/// Fails every third attempt to exercise the restart + requeue path.
struct FlakyBidder {
    calls: AtomicU64,
}

#[async_trait]
impl Bidder for FlakyBidder {
    async fn run_bid(
        &self,
        task: &BidTask,
        _port: u16,
        _ctx: CancellationToken,
    ) -> Result<BidRecord, ExecError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        tokio::time::sleep(Duration::from_millis(200)).await;
        if n % 3 == 0 {
            return Err(ExecError::Fail {
                reason: format!("transient fail #{n}"),
            });
        }
        Ok(BidRecord {
            target: task.target().to_string(),
            code: format!("B-{}", n % 7),
            value: 40_000 + n * 13 % 5_000,
            observed_at: format!("t+{n}"),
            placed: false,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut cfg = Config::default();
    cfg.max_concurrent = 2;
    cfg.interval = Duration::from_secs(5);
    cfg.task_timeout = Duration::from_secs(2);
    cfg.grace = Duration::from_secs(5);

    let tasks = vec![
        BidTask::new(0, "https://auction.example/lot/11", "A-7012", 52_000),
        BidTask::new(1, "https://auction.example/lot/12", "A-7012", 48_000),
        BidTask::new(2, "https://auction.example/lot/17", "A-7012", 61_500),
    ];

    let sink = Arc::new(MemorySink::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];

    let sup = Supervisor::builder(
        cfg,
        Arc::new(SimLifecycle),
        Arc::new(FlakyBidder {
            calls: AtomicU64::new(0),
        }),
    )
    .with_sink(sink.clone())
    .with_subscribers(subs)
    .build();

    match sup.run(tasks).await {
        Ok(()) => println!(
            "runtime stopped gracefully; {} records captured",
            sink.rows().len()
        ),
        Err(e) => println!("runtime stopped with error: {e}"),
    }
    Ok(())
}
