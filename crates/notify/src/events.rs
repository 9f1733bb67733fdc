//! Notification event types for polled content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events that can trigger notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifyEvent {
    /// A new feed post matched the configured keyword filter.
    NewFeedPost {
        /// Handle of the posting account.
        handle: String,
        /// Caption excerpt, already capped by the caller.
        excerpt: String,
        /// Permalink to the post.
        permalink: String,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// A new story carrying an outbound link.
    NewStoryLink {
        /// Handle of the owning account.
        handle: String,
        /// The outbound link found on the story.
        link: String,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl NotifyEvent {
    /// Build a feed-post event.
    #[must_use]
    pub fn new_feed_post(handle: &str, excerpt: &str, permalink: &str) -> Self {
        Self::NewFeedPost {
            handle: handle.to_string(),
            excerpt: excerpt.to_string(),
            permalink: permalink.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Build a story-link event.
    #[must_use]
    pub fn new_story_link(handle: &str, link: &str) -> Self {
        Self::NewStoryLink {
            handle: handle.to_string(),
            link: link.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Short title used in logs.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::NewFeedPost { handle, .. } => format!("New post from @{handle}"),
            Self::NewStoryLink { handle, .. } => format!("New story from @{handle}"),
        }
    }

    /// The message body sent over the wire.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::NewFeedPost {
                handle,
                excerpt,
                permalink,
                ..
            } => {
                format!("📢 New post from @{handle}\n📝 Caption: {excerpt}\n🔗 Link: {permalink}")
            }
            Self::NewStoryLink { handle, link, .. } => {
                format!("📢 New story from @{handle}\n🔗 Link: {link}")
            }
        }
    }

    /// When the event was created.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::NewFeedPost { timestamp, .. } | Self::NewStoryLink { timestamp, .. } => {
                *timestamp
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_titles() {
        let event = NotifyEvent::new_feed_post("alice", "Flash SALE now", "https://example/p/abc");
        assert_eq!(event.title(), "New post from @alice");

        let event = NotifyEvent::new_story_link("alice", "http://x");
        assert_eq!(event.title(), "New story from @alice");
    }

    #[test]
    fn test_feed_text_contains_all_parts() {
        let event = NotifyEvent::new_feed_post(
            "alice",
            "Flash SALE now",
            "https://www.instagram.com/p/abc123/",
        );
        let text = event.text();
        assert!(text.contains("@alice"));
        assert!(text.contains("Flash SALE now"));
        assert!(text.contains("abc123"));
    }

    #[test]
    fn test_story_text_contains_link() {
        let event = NotifyEvent::new_story_link("alice", "http://x");
        let text = event.text();
        assert!(text.contains("@alice"));
        assert!(text.contains("http://x"));
    }
}
