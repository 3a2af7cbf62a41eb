//! Error types used by the bidvisor runtime.
//!
//! This module defines the error taxonomy of the scheduler:
//!
//! - [`ExecError`] — errors raised by a single bid attempt (retryable).
//! - [`WorkerError`] — a worker process never became addressable (retryable via restart).
//! - [`LoadError`] — the task source is malformed (fatal at startup).
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself.
//!
//! All per-task failures are recovered locally by the scheduler
//! (worker restart + requeue); only [`LoadError`] and shutdown handling
//! are process-fatal.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the runtime.
///
/// These represent failures in the orchestration layer itself,
/// such as a shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some slots still held live workers.
    #[error("shutdown grace {grace:?} exceeded; live slots: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Slots that still had a recorded worker when the grace window closed.
        stuck: Vec<u32>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors produced by one bid attempt.
///
/// Classified outcome errors of the opaque bid operation. `Timeout` and
/// `Fail` both send the task back to the retry queue; they are kept
/// distinct because they are logged differently and a timeout implies
/// the attempt's resources may have leaked.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExecError {
    /// The attempt exceeded its deadline. The underlying work is not
    /// guaranteed to have stopped; the slot is recovered by a forced
    /// worker restart.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The bid operation returned an explicit negative result or raised
    /// (e.g. no biddable data found on the page).
    #[error("bid attempt failed: {reason}")]
    Fail {
        /// The underlying failure detail.
        reason: String,
    },

    /// The attempt observed runtime cancellation and exited early.
    #[error("attempt cancelled")]
    Canceled,
}

impl ExecError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecError::Timeout { .. } => "exec_timeout",
            ExecError::Fail { .. } => "exec_failed",
            ExecError::Canceled => "exec_canceled",
        }
    }

    /// Indicates whether the error sends the task back to the queue.
    ///
    /// `Timeout` and `Fail` are retryable; `Canceled` is not (the round
    /// is shutting down).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecError::Fail { .. } | ExecError::Timeout { .. })
    }
}

/// # Worker readiness errors.
///
/// A slot's worker process could not be brought to an addressable
/// state. Distinct from task-level errors: readiness says nothing about
/// bid correctness. Both variants trigger restart + requeue.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker process could not be spawned at all.
    #[error("slot {slot}: failed to spawn worker: {source}")]
    Spawn {
        /// Slot whose worker failed to launch.
        slot: u32,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The control endpoint never became reachable within the readiness window.
    #[error("slot {slot}: control endpoint not reachable after {waited:?}")]
    NeverReady {
        /// Slot whose endpoint stayed dark.
        slot: u32,
        /// How long readiness was polled before giving up.
        waited: Duration,
    },

    /// The pool already ran its final teardown; no new worker may start.
    #[error("slot {slot}: pool is shut down; refusing to start a worker")]
    PoolClosed {
        /// Slot whose start was refused.
        slot: u32,
    },
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Spawn { .. } => "worker_spawn_failed",
            WorkerError::NeverReady { .. } => "worker_never_ready",
            WorkerError::PoolClosed { .. } => "worker_pool_closed",
        }
    }
}

/// # Task source loading errors.
///
/// Fatal: a malformed task list aborts startup. There are no partial
/// task lists.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LoadError {
    /// The task file could not be read.
    #[error("cannot read task list {path:?}: {source}")]
    Io {
        /// The path that failed to open.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The task file is not valid JSON or a row is missing a required field.
    #[error("malformed task list {path:?}: {source}")]
    Parse {
        /// The path that failed to parse.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A row carried a value that cannot describe a task.
    #[error("task list {path:?}, row {row}: {reason}")]
    BadRow {
        /// The path being loaded.
        path: PathBuf,
        /// 0-based row index.
        row: usize,
        /// What was wrong with the row.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(
            ExecError::Fail {
                reason: "boom".into()
            }
            .is_retryable()
        );
        assert!(
            ExecError::Timeout {
                timeout: Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(!ExecError::Canceled.is_retryable());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(ExecError::Canceled.as_label(), "exec_canceled");
        assert_eq!(
            WorkerError::NeverReady {
                slot: 3,
                waited: Duration::from_secs(10)
            }
            .as_label(),
            "worker_never_ready"
        );
        assert_eq!(
            RuntimeError::GraceExceeded {
                grace: Duration::from_secs(30),
                stuck: vec![0, 2]
            }
            .as_label(),
            "runtime_grace_exceeded"
        );
    }
}
