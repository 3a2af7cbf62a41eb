//! Runtime event types and the broadcast bus.
//!
//! - [`Event`] / [`EventKind`]: classified, sequence-numbered events;
//! - [`Bus`]: non-blocking broadcast channel shared by all publishers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
