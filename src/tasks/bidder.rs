//! # The bid-operation collaborator seam.
//!
//! The scheduler treats the actual page inspection and bid decision as
//! an opaque operation behind the [`Bidder`] trait: given a task and
//! the slot's control-endpoint port, produce an observation record or a
//! classified error. DOM strategy and bid rules live entirely on the
//! implementor's side.
//!
//! ## Contract
//! - The future runs inside an isolated spawned task under a hard
//!   deadline; on timeout the child token is cancelled but the future
//!   is only *advised* to stop. Implementations should check `ctx` at
//!   await points, and must tolerate being abandoned (the slot's worker
//!   is force-restarted afterwards).
//! - A definitive negative result ("no biddable data on the page") is
//!   an [`ExecError::Fail`], not a success.
//! - The implementation may perform a best-effort side action (placing
//!   the counter-offer) before returning; `BidRecord::placed` reports
//!   whether it did.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ExecError;
use crate::records::BidRecord;
use crate::tasks::BidTask;

/// Opaque per-task bid operation.
#[async_trait]
pub trait Bidder: Send + Sync + 'static {
    /// Runs one bid attempt for `task` against the worker listening on
    /// `port`.
    ///
    /// # Parameters
    /// - `task`: the immutable task descriptor
    /// - `port`: the slot's control-endpoint port (`base_port + slot`)
    /// - `ctx`: cancellation token for this attempt (advisory)
    async fn run_bid(
        &self,
        task: &BidTask,
        port: u16,
        ctx: CancellationToken,
    ) -> Result<BidRecord, ExecError>;
}
