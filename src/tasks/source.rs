//! # Task list loading.
//!
//! The task source is a JSON array of rows, loaded once at process
//! start into the immutable task list:
//!
//! ```json
//! [
//!   { "url": "https://auction.example/lot/11", "my_code": "A-7012", "price_th": 52000 },
//!   { "url": "https://auction.example/lot/12", "my_code": "A-7012", "price_th": 48000 }
//! ]
//! ```
//!
//! Slots are assigned from row order (row `i` → slot `i`) and stay
//! stable across retries and rounds. Any malformed or missing field
//! fails the whole load — there are no partial task lists.

use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::tasks::BidTask;

/// One raw row of the task file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTask {
    url: String,
    my_code: String,
    price_th: u64,
}

/// Loads the task list from a JSON file.
///
/// Fatal on any error: unreadable file, invalid JSON, missing fields,
/// unknown fields, or an empty/blank row value.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<BidTask>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<RawTask> = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tasks = Vec::with_capacity(rows.len());
    for (row, raw) in rows.into_iter().enumerate() {
        if raw.url.trim().is_empty() {
            return Err(LoadError::BadRow {
                path: path.to_path_buf(),
                row,
                reason: "empty url".into(),
            });
        }
        if raw.my_code.trim().is_empty() {
            return Err(LoadError::BadRow {
                path: path.to_path_buf(),
                row,
                reason: "empty my_code".into(),
            });
        }
        tasks.push(BidTask::new(row as u32, raw.url, raw.my_code, raw.price_th));
    }
    Ok(tasks)
}
