//! Broadcast of review-queue events to consumers.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::queue::actions::BulkActionResult;
use crate::api::types::StatusCounts;

/// The operator action a result belongs to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Accept,
    Reject,
    Retry,
}

/// Events a consumer can observe without polling the coordinator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum QueueEvent {
    /// A fresh snapshot was applied.
    SnapshotApplied {
        total: u64,
        status_counts: StatusCounts,
    },
    /// A bulk or single action finished, with verbatim per-item counts.
    ActionCompleted {
        action: ActionKind,
        result: BulkActionResult,
    },
    /// A retry dispatch was issued for the given number of jobs.
    RetryRequested { count: usize },
}

/// Broadcasts queue events for streaming.
#[derive(Clone)]
pub struct QueueEventBroadcaster {
    sender: Arc<broadcast::Sender<QueueEvent>>,
}

impl QueueEventBroadcaster {
    /// Creates a broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: QueueEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }
}

impl Default for QueueEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
