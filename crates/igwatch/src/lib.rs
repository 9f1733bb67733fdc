//! Instagram story/feed watcher.
//!
//! Polls a configured set of accounts on a fixed interval, detects feed
//! posts and stories not previously seen, filters feed posts by keyword
//! and stories by presence of an outbound link, and forwards matches to
//! a messaging webhook. Persists its seen-id sets and the content-source
//! session so restarts neither re-notify old content nor force a fresh
//! login.

pub mod config;
pub mod filter;
pub mod poller;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod state;

pub use config::Config;
pub use scheduler::{CycleOutcome, SessionState, Watcher};
pub use session::SessionStore;
pub use state::SeenIds;
