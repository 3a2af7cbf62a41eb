//! Worker-process supervision: lifecycle seams, the browser-backed
//! implementation, and the slot registry.
//!
//! ```text
//! BatchScheduler ──► WorkerPool ──► WorkerLifecycle ──► external process
//!                    (per-slot        (start /
//!                     registry)        health-check)
//! ```

mod browser;
mod lifecycle;
mod pool;

pub use browser::{BrowserConfig, BrowserLifecycle};
pub use lifecycle::{Worker, WorkerLifecycle};
pub use pool::WorkerPool;
