//! Event subscribers for the bidvisor runtime.
//!
//! Events published to the [`Bus`](crate::events::Bus) are fanned out
//! to subscribers by a single listener inside the supervisor:
//!
//! ```text
//! publishers ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                ┌─────────┼─────────┐
//!                                                ▼         ▼         ▼
//!                                            LogWriter   metrics   custom
//! ```
//!
//! Implement [`Subscribe`] for custom sinks (metrics, alerting); the
//! built-in [`LogWriter`] renders events through `tracing`.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
