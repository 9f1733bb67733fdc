//! Startup resolution of configured handles to stable numeric ids.

use std::collections::HashMap;

use instagram::ContentSource;
use tracing::{info, warn};

/// Resolve each configured handle to its numeric account id, returning
/// an id → handle map.
///
/// Resolution failure for one handle is non-fatal: the handle is
/// dropped from the active set with a warning and resolution continues.
/// An empty result is not itself an error: later polling simply has
/// nothing to do.
pub async fn resolve_targets(
    source: &dyn ContentSource,
    handles: &[String],
) -> HashMap<String, String> {
    let mut targets = HashMap::new();

    for handle in handles {
        match source.resolve_user_id(handle).await {
            Ok(id) => {
                info!(%handle, %id, "Resolved target account");
                targets.insert(id, handle.clone());
            }
            Err(e) => {
                warn!(%handle, error = %e, "Could not resolve target account, dropping");
            }
        }
    }

    if targets.is_empty() {
        warn!("No target accounts resolved, polling will find nothing");
    }

    targets
}
