//! # Observation records and the append-only record sink.
//!
//! Every successful bid attempt produces a [`BidRecord`]; the scheduler
//! hands it to a [`RecordSink`] — an append-only log with duplicate
//! suppression by exact-tuple match. The sink is only ever called after
//! successes, never after failures.
//!
//! Two implementations ship with the crate:
//! - [`MemorySink`] — in-memory rows (tests, demos);
//! - [`JsonlSink`] — JSON-lines file that preloads existing rows so
//!   dedup survives process restarts.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One observed auction state, as captured by a successful attempt.
///
/// The tuple `(target, code, value, observed_at, placed)` is the
/// dedup key — a record equal in every field to an existing one is not
/// re-appended.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BidRecord {
    /// Target page reference.
    pub target: String,
    /// Bidder code currently leading the auction.
    pub code: String,
    /// The leading bid value.
    pub value: u64,
    /// Bid timestamp as displayed on the page (opaque text).
    pub observed_at: String,
    /// Whether a counter-offer was placed during this attempt.
    pub placed: bool,
}

/// Append-only record sink with exact-tuple duplicate suppression.
#[async_trait]
pub trait RecordSink: Send + Sync + 'static {
    /// Appends `record` unless an identical tuple was already appended.
    ///
    /// Returns `Ok(true)` if the record was new, `Ok(false)` if it was
    /// a duplicate and was skipped, and `Err` if the record could not
    /// be persisted. A failed append is a lost observation, distinct
    /// from dedup; the scheduler reports it but does not re-run the
    /// bid.
    async fn append(&self, record: &BidRecord) -> std::io::Result<bool>;
}

/// In-memory sink. Rows are retained for inspection.
#[derive(Default)]
pub struct MemorySink {
    rows: StdMutex<Vec<BidRecord>>,
    seen: StdMutex<HashSet<BidRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended rows, in append order.
    pub fn rows(&self) -> Vec<BidRecord> {
        self.rows.lock().expect("memory sink poisoned").clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, record: &BidRecord) -> std::io::Result<bool> {
        let mut seen = self.seen.lock().expect("memory sink poisoned");
        if !seen.insert(record.clone()) {
            return Ok(false);
        }
        drop(seen);
        self.rows
            .lock()
            .expect("memory sink poisoned")
            .push(record.clone());
        Ok(true)
    }
}

/// JSON-lines file sink.
///
/// One serialized [`BidRecord`] per line. On open, existing lines are
/// replayed into the dedup set so identical observations are suppressed
/// across process restarts; unreadable lines are skipped (the file may
/// carry rows from older layouts).
pub struct JsonlSink {
    path: PathBuf,
    seen: Mutex<HashSet<BidRecord>>,
}

impl JsonlSink {
    /// Opens (or prepares to create) the sink at `path`, preloading any
    /// existing rows for duplicate suppression.
    pub async fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let mut seen = HashSet::new();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                for line in text.lines() {
                    if let Ok(rec) = serde_json::from_str::<BidRecord>(line) {
                        seen.insert(rec);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn append(&self, record: &BidRecord) -> std::io::Result<bool> {
        let mut seen = self.seen.lock().await;
        if seen.contains(record) {
            return Ok(false);
        }

        let line = serde_json::to_string(record).map_err(std::io::Error::from)?;
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        f.write_all(line.as_bytes()).await?;
        f.write_all(b"\n").await?;
        f.flush().await?;

        seen.insert(record.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: u64) -> BidRecord {
        BidRecord {
            target: "https://a.example/1".into(),
            code: "B-1".into(),
            value,
            observed_at: "2026-08-29 10:00:01".into(),
            placed: false,
        }
    }

    #[tokio::test]
    async fn memory_sink_suppresses_exact_duplicates() {
        let sink = MemorySink::new();
        assert!(sink.append(&record(100)).await.unwrap());
        assert!(!sink.append(&record(100)).await.unwrap());
        assert!(sink.append(&record(101)).await.unwrap());
        assert_eq!(sink.rows().len(), 2);
    }

    #[tokio::test]
    async fn jsonl_sink_dedups_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bids.jsonl");

        let sink = JsonlSink::open(&path).await.unwrap();
        assert!(sink.append(&record(100)).await.unwrap());
        assert!(!sink.append(&record(100)).await.unwrap());
        drop(sink);

        let sink = JsonlSink::open(&path).await.unwrap();
        assert!(!sink.append(&record(100)).await.unwrap());
        assert!(sink.append(&record(200)).await.unwrap());

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn write_failure_is_an_error_not_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        // parent directory does not exist, so the append must fail
        let path = dir.path().join("missing").join("bids.jsonl");

        let sink = JsonlSink::open(&path).await.unwrap();
        assert!(sink.append(&record(100)).await.is_err());
        // the record was not swallowed into the dedup set either
        assert!(matches!(sink.append(&record(100)).await, Err(_)));
    }
}
