//! Builder for wiring a [`Supervisor`] from its collaborators.

use std::sync::Arc;

use crate::config::Config;
use crate::records::{MemorySink, RecordSink};
use crate::subscribers::Subscribe;
use crate::tasks::Bidder;
use crate::worker::WorkerLifecycle;

use super::supervisor::Supervisor;

/// Builder for constructing a [`Supervisor`].
///
/// The lifecycle and the bidder are mandatory and taken up front; the
/// record sink defaults to an in-memory sink and subscribers default to
/// none.
pub struct SupervisorBuilder {
    cfg: Config,
    lifecycle: Arc<dyn WorkerLifecycle>,
    bidder: Arc<dyn Bidder>,
    sink: Option<Arc<dyn RecordSink>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a builder with the mandatory collaborators.
    pub fn new(cfg: Config, lifecycle: Arc<dyn WorkerLifecycle>, bidder: Arc<dyn Bidder>) -> Self {
        Self {
            cfg,
            lifecycle,
            bidder,
            sink: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the record sink for successful observations.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (rounds, batches, per-task
    /// outcomes, worker lifecycle) through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor.
    pub fn build(self) -> Supervisor {
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(MemorySink::new()) as Arc<dyn RecordSink>);
        Supervisor::new_internal(self.cfg, self.lifecycle, self.bidder, sink, self.subscribers)
    }
}
