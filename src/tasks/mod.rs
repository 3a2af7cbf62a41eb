//! Task model: descriptors, outcomes, the retry backlog, the bid
//! collaborator seam, and task-list loading.

mod bidder;
mod outcome;
mod queue;
mod source;
mod task;

pub use bidder::Bidder;
pub use outcome::Outcome;
pub use queue::{QueuedTask, RetryQueue};
pub use source::load_tasks;
pub use task::BidTask;
