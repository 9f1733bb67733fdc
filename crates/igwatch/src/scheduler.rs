//! Cycle scheduling and the session lifecycle.
//!
//! The [`Watcher`] owns all mutable polling state (the target map and
//! the two seen sets) and drives the fixed-interval cycle loop. Session
//! states run `NoSession → LoggingIn → Active → Invalidated`;
//! `Invalidated` is terminal for the process: the persisted session is
//! cleared and a fatal [`CycleOutcome`] is handed up to `main`, which
//! performs the one intentional process exit. An external supervisor
//! restarting the process re-enters `NoSession` with a fresh login.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use instagram::ContentSource;
use notify::Notifier;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::poller;
use crate::resolver;
use crate::session::SessionStore;
use crate::state::SeenIds;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable session yet.
    NoSession,
    /// Fresh credential login in progress.
    LoggingIn,
    /// Session accepted by the content source.
    Active,
    /// Session rejected; terminal for this process.
    Invalidated,
}

/// What a poll cycle decided about the process's future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Cycle finished; keep scheduling.
    Completed,
    /// The content source rejected the session. The persisted session
    /// has been cleared; the process must exit for a supervised
    /// restart.
    SessionInvalidated,
}

/// Owns the poll loop and all per-run mutable state.
pub struct Watcher {
    config: Config,
    source: Arc<dyn ContentSource>,
    notifier: Notifier,
    session_store: SessionStore,
    session_state: SessionState,
    targets: HashMap<String, String>,
    feed_seen: SeenIds,
    story_seen: SeenIds,
}

impl Watcher {
    /// Bring the watcher to the `Active` state: load or establish a
    /// session, resolve the configured targets once, and load both
    /// channels' seen sets.
    ///
    /// Fails only when no session can be established at all (bad
    /// credentials, source unreachable); everything else is recovered
    /// locally.
    pub async fn bootstrap(
        config: Config,
        source: Arc<dyn ContentSource>,
        notifier: Notifier,
    ) -> Result<Self> {
        let session_store = SessionStore::new(&config.session_file);
        let mut session_state = SessionState::NoSession;

        if let Some(blob) = session_store.load() {
            match source.restore_session(&blob).await {
                Ok(()) => {
                    info!("Using persisted session");
                    session_state = SessionState::Active;
                }
                Err(e) => {
                    warn!(error = %e, "Persisted session unusable, falling back to fresh login");
                }
            }
        }

        if session_state != SessionState::Active {
            session_state = SessionState::LoggingIn;
            info!(username = %config.username, "Logging in with credentials");
            source
                .login(&config.username, &config.password)
                .await
                .context("initial login failed")?;

            match source.export_session().await {
                Ok(blob) => session_store.save(&blob),
                Err(e) => warn!(error = %e, "Could not export session after login"),
            }
            session_state = SessionState::Active;
        }

        let targets = resolver::resolve_targets(source.as_ref(), &config.targets).await;
        info!(
            targets = targets.len(),
            interval_ms = config.poll_interval.as_millis() as u64,
            "Watcher ready"
        );

        let feed_seen = SeenIds::load(&config.seen_feeds_file, "feed");
        let story_seen = SeenIds::load(&config.seen_stories_file, "story");

        Ok(Self {
            config,
            source,
            notifier,
            session_store,
            session_state,
            targets,
            feed_seen,
            story_seen,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// The resolved id → handle map.
    #[must_use]
    pub fn targets(&self) -> &HashMap<String, String> {
        &self.targets
    }

    /// Run one poll cycle: both channels concurrently, then persist the
    /// refreshed session once both have settled.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        debug!("Starting poll cycle");

        let (feed, story) = tokio::join!(
            poller::poll_feeds(
                self.source.as_ref(),
                &self.notifier,
                &self.targets,
                &self.config.keywords,
                &mut self.feed_seen,
                &self.config.seen_feeds_file,
            ),
            poller::poll_stories(
                self.source.as_ref(),
                &self.notifier,
                &self.targets,
                &mut self.story_seen,
                &self.config.seen_stories_file,
            ),
        );

        // Pollers contain everything except the invalidation signal.
        if feed.is_err() || story.is_err() {
            return self.invalidate();
        }

        match self.source.export_session().await {
            Ok(blob) => {
                self.session_store.save(&blob);
                debug!("Session refreshed after cycle");
            }
            Err(e) => warn!(error = %e, "Could not refresh session after cycle"),
        }

        CycleOutcome::Completed
    }

    /// Enter the terminal `Invalidated` state: clear the persisted
    /// session and signal the fatal outcome upward.
    fn invalidate(&mut self) -> CycleOutcome {
        error!("Session rejected by content source, clearing persisted session");
        self.session_store.clear();
        self.session_state = SessionState::Invalidated;
        CycleOutcome::SessionInvalidated
    }

    /// Run cycles on the configured interval until the session is
    /// invalidated.
    ///
    /// Cycles execute inline on this task, so a cycle slower than the
    /// interval delays the next tick instead of overlapping it;
    /// `MissedTickBehavior::Skip` drops the backlog rather than
    /// bursting. The first cycle runs immediately.
    pub async fn run(&mut self) -> CycleOutcome {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if self.run_cycle().await == CycleOutcome::SessionInvalidated {
                return CycleOutcome::SessionInvalidated;
            }
        }
    }
}
