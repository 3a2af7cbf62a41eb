//! Wiring sketch against real Chrome processes.
//!
//! Loads the task list from a JSON file (first CLI argument, default
//! `tasks.json`), spawns one Chrome per task with an isolated profile
//! and a deterministic debug port, and runs rounds until a termination
//! signal. The bidder here only verifies the target tab is open and
//! records the observation; a production deployment plugs its real
//! page-inspection logic behind the same [`Bidder`] trait.
//!
//! Run with: `cargo run --example browser_wiring -- tasks.json`

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use bidvisor::{
    BidRecord, BidTask, Bidder, BrowserConfig, BrowserLifecycle, Config, ExecError, JsonlSink,
    LogWriter, Subscribe, Supervisor, load_tasks,
};

/// Minimal bidder: confirms the target tab is open via the debug
/// endpoint's tab list and records the observation.
struct ProbeBidder {
    http: reqwest::Client,
}

#[async_trait]
impl Bidder for ProbeBidder {
    async fn run_bid(
        &self,
        task: &BidTask,
        port: u16,
        _ctx: CancellationToken,
    ) -> Result<BidRecord, ExecError> {
        let url = format!("http://127.0.0.1:{port}/json");
        let tabs: Vec<serde_json::Value> = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ExecError::Fail {
                reason: format!("tab list unreachable: {e}"),
            })?
            .json()
            .await
            .map_err(|e| ExecError::Fail {
                reason: format!("tab list decode: {e}"),
            })?;

        let open = tabs
            .iter()
            .filter_map(|tab| tab.get("url").and_then(|u| u.as_str()))
            .any(|u| u.contains(task.target().as_ref()));
        if !open {
            return Err(ExecError::Fail {
                reason: "target page not open".into(),
            });
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(BidRecord {
            target: task.target().to_string(),
            code: task.code().to_string(),
            value: 0,
            observed_at: now.to_string(),
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

    let task_file = std::env::args().nth(1).unwrap_or_else(|| "tasks.json".into());
    let tasks = load_tasks(&task_file)?;

    let cfg = Config::default();
    let browser = BrowserConfig {
        base_port: cfg.base_port,
        page_check: true,
        ..BrowserConfig::default()
    };
    let lifecycle = Arc::new(BrowserLifecycle::new(browser));
    let sink = Arc::new(JsonlSink::open("bids.jsonl").await?);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];

    let sup = Supervisor::builder(
        cfg,
        lifecycle,
        Arc::new(ProbeBidder {
            http: reqwest::Client::new(),
        }),
    )
    .with_sink(sink)
    .with_subscribers(subs)
    .build();

    sup.run(tasks).await?;
    Ok(())
}
