//! Runtime core: batched scheduling, round pacing, and orchestration.
//!
//! Internal modules:
//! - [`executor`]: one attempt with timeout isolation and classification;
//! - [`batch`]: bounded concurrent waves over the retry queue;
//! - [`rounds`]: fixed-interval pacing with cancellable sleeps;
//! - [`supervisor`] / [`builder`]: wiring and signal-driven shutdown;
//! - [`shutdown`]: cross-platform signal handling.

mod batch;
mod builder;
mod executor;
mod rounds;
mod shutdown;
mod supervisor;

pub use batch::{BatchScheduler, RoundStats};
pub use builder::SupervisorBuilder;
pub use executor::TaskExecutor;
pub use rounds::RoundLoop;
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::Supervisor;
