//! # Bid task descriptor.
//!
//! A [`BidTask`] names one page to watch: a target reference, the
//! operator's own bidder code, and the price threshold under which a
//! counter-bid is worthwhile. Descriptors are immutable; the `slot`
//! index assigned at load time ties the task to one supervised worker
//! process for its whole lifetime.

use std::sync::Arc;

/// Immutable descriptor of one bidding task.
///
/// Cheap to clone (shared string payloads); the scheduler clones it
/// freely into queues and spawned attempts.
#[derive(Clone, Debug)]
pub struct BidTask {
    slot: u32,
    target: Arc<str>,
    code: Arc<str>,
    threshold: u64,
}

impl BidTask {
    /// Creates a new task descriptor.
    pub fn new(
        slot: u32,
        target: impl Into<Arc<str>>,
        code: impl Into<Arc<str>>,
        threshold: u64,
    ) -> Self {
        Self {
            slot,
            target: target.into(),
            code: code.into(),
            threshold,
        }
    }

    /// Stable 0-based slot index; binds the task to one worker process.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Target page reference (the auction URL).
    pub fn target(&self) -> &Arc<str> {
        &self.target
    }

    /// The operator's own bidder identity code.
    pub fn code(&self) -> &Arc<str> {
        &self.code
    }

    /// Price threshold: counter-bidding is only worthwhile below it.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}
