//! Periodic queue refresh with race-safe application.
//!
//! Runs on a fixed interval while the consuming view is attached and the
//! host surface reports itself visible, and supports manual triggers via a
//! broadcast channel. Stale responses are handled by the repository's
//! sequence numbers: last sequence wins, no lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::queue::events::{QueueEvent, QueueEventBroadcaster};
use crate::queue::repository::{FetchOutcome, QueueRepository};

/// Periodic poll loop over the queue repository.
pub struct PollingSynchronizer {
    repository: Arc<QueueRepository>,
    events: QueueEventBroadcaster,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    visible: Arc<AtomicBool>,
}

impl PollingSynchronizer {
    /// Creates a new synchronizer. Polling starts visible.
    pub fn new(
        repository: Arc<QueueRepository>,
        events: QueueEventBroadcaster,
        interval: Duration,
    ) -> Self {
        Self {
            repository,
            events,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            visible: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Starts the poll loop. Accepts a trigger receiver for manual
    /// refresh requests, which ride the same loop as interval ticks.
    pub fn start(&self, mut trigger_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let events = self.events.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let visible = Arc::clone(&self.visible);
        let interval = self.interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.tick().await; // skip immediate first tick

            loop {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                tokio::select! {
                    _ = interval_timer.tick() => {},
                    Ok(()) = trigger_rx.recv() => {
                        log::debug!("Manual queue refresh triggered");
                    },
                }

                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                // Hidden surface: stay attached but do not fetch.
                if !visible.load(Ordering::Acquire) {
                    continue;
                }

                match repository.refresh().await {
                    Ok(FetchOutcome::Applied(snapshot)) => {
                        events.send(QueueEvent::SnapshotApplied {
                            total: snapshot.total,
                            status_counts: snapshot.status_counts,
                        });
                    }
                    Ok(FetchOutcome::Superseded) => {}
                    // Background polls stay silent; the next tick retries.
                    Err(e) => log::debug!("Background queue poll failed: {e}"),
                }
            }
        })
    }

    /// Reports whether the host surface is visible. Polling is suspended
    /// while hidden.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    /// Signals the loop to stop.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}
