//! Session blob persistence.

use std::path::{Path, PathBuf};

use instagram::SessionBlob;
use tracing::{info, warn};

/// Persists the opaque content-source session across restarts.
///
/// Every failure mode here is recovered locally: a missing file is the
/// normal first run, a corrupt file is treated the same way (the next
/// login recreates it), and a failed write only means the previous
/// on-disk copy lives a little longer.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session, or `None` when no usable session
    /// exists. Never an error: absent and corrupt files both mean a
    /// fresh login is needed.
    #[must_use]
    pub fn load(&self) -> Option<SessionBlob> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No session file, fresh login required");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(blob) => {
                info!(path = %self.path.display(), "Loaded persisted session");
                Some(blob)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Session file is unparsable, treating as first run"
                );
                None
            }
        }
    }

    /// Persist the session, stripping the transient key first. Write
    /// failures are logged; the next cycle's save may succeed.
    pub fn save(&self, blob: &SessionBlob) {
        let mut blob = blob.clone();
        blob.strip_transient();

        let content = match serde_json::to_string(&blob) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to serialize session");
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.path, content) {
            warn!(path = %self.path.display(), error = %e, "Failed to save session");
        }
    }

    /// Delete the persisted session. A missing file is not an error.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Cleared persisted session"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to clear session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blob_with_constants() -> SessionBlob {
        let mut blob = SessionBlob::default();
        blob.0.insert("cookies".into(), json!({"sessionid": "s"}));
        blob.0.insert("constants".into(), json!({"app_version": "x"}));
        blob
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn save_strips_the_transient_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(&path);

        store.save(&blob_with_constants());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("constants"));
        assert!(written.contains("sessionid"));

        // Caller's copy is untouched.
        let reloaded = store.load().unwrap();
        assert!(reloaded.get("constants").is_none());
    }

    #[test]
    fn clear_swallows_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.clear();

        store.save(&blob_with_constants());
        store.clear();
        assert!(store.load().is_none());
    }
}
