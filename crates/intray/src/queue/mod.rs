pub mod actions;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod poller;
pub mod repository;
pub mod selection;
pub mod status;

pub use actions::BulkActionResult;
pub use coordinator::ReviewQueue;
pub use dispatch::{retry_target, RetryDispatcher, RetryOutcome, RetryTarget};
pub use error::ActionError;
pub use events::{ActionKind, QueueEvent, QueueEventBroadcaster};
pub use poller::PollingSynchronizer;
pub use repository::{FetchOutcome, QueueRepository, QueueSnapshot, ReviewJob};
pub use selection::SelectionModel;
pub use status::ReviewState;
