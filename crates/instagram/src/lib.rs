//! Instagram client boundary for the igwatch daemon.
//!
//! The daemon core never talks to the network directly: everything it
//! needs from Instagram goes through the [`ContentSource`] trait, which
//! covers login, session export/restore, handle-to-id resolution, and
//! the two content fetches (per-user feed, batched stories).
//!
//! [`HttpSource`] is the production implementation against the private
//! web API. Raw API responses are validated here and converted into the
//! explicit [`FeedItem`]/[`StoryItem`] types; items missing required
//! fields are dropped at this boundary rather than propagated deeper.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ContentSource, HttpSource};
pub use error::SourceError;
pub use session::SessionBlob;
pub use types::{FeedItem, StoryItem};
