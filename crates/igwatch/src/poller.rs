//! Per-channel content pollers.
//!
//! Each poller owns one cycle of its channel: fetch current items,
//! compare against the channel's seen set, dispatch notifications for
//! new qualifying items, mark everything examined as seen, and persist
//! the set. Ordinary fetch failures are contained here; the only error
//! that escapes is the session-invalidation signal.

use std::collections::HashMap;
use std::path::Path;

use instagram::{ContentSource, SourceError};
use notify::{Notifier, NotifyEvent};
use tracing::{debug, info, warn};

use crate::filter;
use crate::state::SeenIds;

/// Poll the feed channel across all targets.
///
/// With no configured keywords the channel does no work at all: no
/// fetches, no seen-set mutation, no persist. Per-target fetch failures
/// are isolated, so one broken target never blocks the rest.
pub async fn poll_feeds(
    source: &dyn ContentSource,
    notifier: &Notifier,
    targets: &HashMap<String, String>,
    keywords: &[String],
    seen: &mut SeenIds,
    seen_path: &Path,
) -> Result<(), SourceError> {
    if keywords.is_empty() {
        debug!("No filter keywords configured, skipping feed check");
        return Ok(());
    }

    for (user_id, handle) in targets {
        let items = match source.user_feed(user_id).await {
            Ok(items) => items,
            Err(e) if e.is_login_required() => return Err(e),
            Err(e) => {
                warn!(%handle, error = %e, "Feed fetch failed, skipping target");
                continue;
            }
        };

        for item in items {
            if seen.contains(&item.id) {
                continue;
            }

            let caption = item.caption_text();
            if filter::keyword_match(caption, keywords) {
                info!(%handle, id = %item.id, "Found new feed post matching keywords");
                let event = NotifyEvent::new_feed_post(
                    handle,
                    &filter::caption_excerpt(caption),
                    &filter::permalink(&item.code),
                );
                notifier.send(&event).await;
            }

            // Seen whether or not it matched: at-least-once delivery,
            // never re-examined.
            seen.insert(&item.id);
        }
    }

    seen.save(seen_path);
    debug!(seen = seen.len(), "Feed check complete");
    Ok(())
}

/// Poll the story channel with one batched fetch across all targets.
///
/// Stories from accounts that are not currently tracked are skipped
/// without being marked seen (they were never ours to examine); items
/// without an outbound link never notify but are still marked seen.
pub async fn poll_stories(
    source: &dyn ContentSource,
    notifier: &Notifier,
    targets: &HashMap<String, String>,
    seen: &mut SeenIds,
    seen_path: &Path,
) -> Result<(), SourceError> {
    if targets.is_empty() {
        debug!("No resolved targets, skipping story check");
        return Ok(());
    }

    let user_ids: Vec<String> = targets.keys().cloned().collect();
    let items = match source.stories(&user_ids).await {
        Ok(items) => items,
        Err(e) if e.is_login_required() => return Err(e),
        Err(e) => {
            warn!(error = %e, "Story fetch failed for this cycle");
            return Ok(());
        }
    };

    for item in items {
        let Some(handle) = targets.get(&item.author_id) else {
            continue;
        };
        if seen.contains(&item.id) {
            continue;
        }

        if let Some(link) = filter::story_link(&item) {
            info!(%handle, id = %item.id, "Found new story with a link");
            notifier
                .send(&NotifyEvent::new_story_link(handle, link))
                .await;
        }

        seen.insert(&item.id);
    }

    seen.save(seen_path);
    debug!(seen = seen.len(), "Story check complete");
    Ok(())
}
