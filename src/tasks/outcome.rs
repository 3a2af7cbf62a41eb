//! # Classified result of one task attempt.

use std::sync::Arc;
use std::time::Duration;

use crate::records::BidRecord;

/// Result of executing one task attempt.
///
/// Produced by the executor (or by the scheduler itself for readiness
/// failures) and routed by the batch scheduler: only [`Outcome::Success`]
/// removes a task from future retries; the other two variants trigger a
/// worker restart and a requeue at the back.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The bid operation completed and produced an observation record.
    Success(BidRecord),

    /// The bid operation failed or found nothing biddable; `reason`
    /// carries the detail for logging. Also used when the slot's worker
    /// never became ready (the executor is not invoked in that case).
    Failure(Arc<str>),

    /// The bid operation exceeded its deadline. Queued identically to
    /// `Failure`, logged distinctly.
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },
}

impl Outcome {
    /// True only for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failure(_) => "failure",
            Outcome::Timeout { .. } => "timeout",
        }
    }
}
