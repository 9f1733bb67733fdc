//! Notification dispatch for igwatch content events.
//!
//! Sends a message to a messaging-bot webhook whenever the watcher
//! finds a qualifying feed post or story. Delivery is best-effort:
//! failures are logged and swallowed, never propagated to the pollers,
//! so a broken webhook can't turn one piece of content into an endless
//! re-delivery storm (the item is marked seen regardless).
//!
//! # Usage
//!
//! ```no_run
//! use notify::{Notifier, NotifyEvent};
//!
//! # async fn example() {
//! let notifier = Notifier::from_env();
//! notifier
//!     .send(&NotifyEvent::new_story_link("alice", "https://example.com"))
//!     .await;
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for channels
//! - [`WebhookChannel`] implements the `{text, tagall}` webhook contract
//! - [`Notifier`] dispatches events to all enabled channels

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod events;

pub use channels::webhook::WebhookChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use events::NotifyEvent;

use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Central notification dispatcher.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
}

impl Notifier {
    /// Create a notifier from environment variables, auto-detecting
    /// which channels are configured.
    #[must_use]
    pub fn from_env() -> Self {
        let mut channels: Vec<Arc<dyn NotifyChannel>> = vec![];

        let webhook = WebhookChannel::from_env();
        if webhook.enabled() {
            info!("Webhook notifications enabled");
            channels.push(Arc::new(webhook));
        }

        if channels.is_empty() {
            warn!("No notification channels configured");
        }

        Self { channels }
    }

    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        Self { channels }
    }

    /// Create a notifier with no channels (for testing or dry runs).
    #[must_use]
    pub const fn disabled() -> Self {
        Self { channels: vec![] }
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Send a notification to all enabled channels.
    ///
    /// Awaits every channel so callers observe a settled delivery
    /// attempt before updating their own state. Errors are logged but
    /// never propagated.
    pub async fn send(&self, event: &NotifyEvent) {
        if self.channels.is_empty() {
            error!(title = %event.title(), "Dropping notification: no channel configured");
            return;
        }

        for channel in &self.channels {
            let channel_name = channel.name();

            if !channel.enabled() {
                debug!(channel = channel_name, "Channel disabled, skipping");
                continue;
            }

            match channel.send(event).await {
                Ok(()) => {
                    debug!(channel = channel_name, "Notification sent");
                }
                Err(e) => {
                    error!(
                        channel = channel_name,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_notifier() {
        let notifier = Notifier::disabled();
        assert!(!notifier.has_channels());
    }

    #[tokio::test]
    async fn test_send_without_channels_does_not_panic() {
        let notifier = Notifier::disabled();
        notifier
            .send(&NotifyEvent::new_story_link("alice", "http://x"))
            .await;
    }
}
