//! # Worker lifecycle seams.
//!
//! The scheduler's process supervision is expressed against two small
//! traits so the core has zero dependency on the mechanism used to
//! control the external process:
//!
//! - [`Worker`] — a handle to one live external process (terminate);
//! - [`WorkerLifecycle`] — how to start a worker for a slot and probe
//!   its control endpoint.
//!
//! The shipped implementation is
//! [`BrowserLifecycle`](crate::worker::BrowserLifecycle); tests plug
//! scripted lifecycles.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::WorkerError;

/// Handle to one live external worker process.
#[async_trait]
pub trait Worker: Send + Sync {
    /// OS-level identifier, if the process is still attached.
    fn id(&self) -> Option<u32>;

    /// Stops the process: graceful signal first, then a bounded wait of
    /// `grace`, then force-kill. Must be idempotent enough to call on a
    /// process that already exited.
    async fn terminate(&mut self, grace: Duration);
}

/// Start/health-check capability for slot workers.
///
/// Implementations derive the control endpoint deterministically from
/// the slot index; the pool never sees ports or processes directly.
#[async_trait]
pub trait WorkerLifecycle: Send + Sync + 'static {
    /// Launches a worker for `slot`, bound to a per-slot isolated
    /// profile/work directory and the slot's control endpoint.
    ///
    /// Returns as soon as the process is spawned; reachability of the
    /// control endpoint is the pool's concern (`health_check` polling).
    async fn start(&self, slot: u32, target: &str) -> Result<Box<dyn Worker>, WorkerError>;

    /// Probes the slot's control endpoint.
    ///
    /// `true` means the worker is addressable for `target`; it says
    /// nothing about task-level success.
    async fn health_check(&self, slot: u32, target: &str) -> bool;
}
