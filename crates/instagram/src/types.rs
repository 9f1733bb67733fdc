//! Domain types for polled content, one per channel.

use serde::{Deserialize, Serialize};

/// A permanent feed post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// Unique post id.
    pub id: String,
    /// Numeric id of the posting account.
    pub author_id: String,
    /// Caption text, if the post has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Shortcode used to build the post permalink.
    pub code: String,
}

impl FeedItem {
    /// Caption text, or the empty string when absent.
    #[must_use]
    pub fn caption_text(&self) -> &str {
        self.caption.as_deref().unwrap_or("")
    }
}

/// An ephemeral story item.
///
/// Both possible link carriers are kept separate; the notification link
/// is derived by the filter with link-sticker priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryItem {
    /// Unique story id.
    pub id: String,
    /// Numeric id of the owning account.
    pub author_id: String,
    /// URL of the first link sticker, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_sticker_url: Option<String>,
    /// Web URI of the first call-to-action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_url: Option<String>,
}
