//! General error channel
//!
//! Some failures belong to no caller. The case that produces them today is
//! a transmission that fails after its call was already resolved by a
//! response: nobody is waiting on that identifier anymore, so the failure is
//! broadcast here instead.
//!
//! The sender lives inside the engine, so the channel stays open for as
//! long as the engine does. Subscribers see errors published after they
//! subscribed; a subscriber that falls more than `capacity` errors behind
//! receives `RecvError::Lagged` and continues from the oldest retained error.

use jremote_core::Error;
use tokio::sync::broadcast;

/// Default number of errors retained for slow subscribers
pub const DEFAULT_ERROR_CHANNEL_CAPACITY: usize = 64;

/// Broadcast channel for errors with no pending call to receive them
#[derive(Clone)]
pub struct ErrorChannel {
    sender: broadcast::Sender<Error>,
}

impl ErrorChannel {
    /// Create a channel retaining up to `capacity` unread errors per subscriber
    ///
    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to errors published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Error> {
        self.sender.subscribe()
    }

    /// Publish an error to every subscriber
    ///
    /// Returns the number of subscribers reached. With no subscribers the
    /// error is logged instead.
    pub fn publish(&self, error: Error) -> usize {
        match self.sender.send(error) {
            Ok(receivers) => {
                tracing::debug!(receivers, "Published error on general error channel");
                receivers
            }
            Err(broadcast::error::SendError(error)) => {
                tracing::warn!(error = %error, "No subscribers for general error channel");
                0
            }
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ERROR_CHANNEL_CAPACITY)
    }
}
