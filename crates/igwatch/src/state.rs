//! Persisted seen-id sets, one per content channel.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

/// The set of content ids already evaluated or notified for a channel.
///
/// Grows monotonically within a run; ids are only added. Re-initialized
/// from its persisted file at startup, or empty when the file is absent
/// or corrupt; partial loss only risks re-notification.
#[derive(Debug, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    /// Load a seen set from a JSON array file. Missing and unreadable
    /// files both yield an empty set.
    #[must_use]
    pub fn load(path: &Path, channel: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(channel, path = %path.display(), "No seen-id file, starting empty");
                return Self::default();
            }
            Err(e) => {
                warn!(channel, path = %path.display(), error = %e, "Failed to read seen-id file");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(ids) => {
                let ids: HashSet<String> = ids.into_iter().collect();
                info!(channel, count = ids.len(), "Loaded seen ids");
                Self { ids }
            }
            Err(e) => {
                warn!(
                    channel,
                    path = %path.display(),
                    error = %e,
                    "Seen-id file is unparsable, starting empty"
                );
                Self::default()
            }
        }
    }

    /// Persist the set as a JSON array. A plain overwrite: failures are
    /// logged and the previous copy stays good until the next cycle.
    pub fn save(&self, path: &Path) {
        let ids: Vec<&String> = self.ids.iter().collect();
        let content = match serde_json::to_string(&ids) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to serialize seen ids");
                return;
            }
        };

        if let Err(e) = std::fs::write(path, content) {
            warn!(path = %path.display(), error = %e, "Failed to save seen ids");
        }
    }

    /// Whether an id has already been processed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Mark an id as processed.
    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    /// Number of ids in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let seen = SeenIds::load(&dir.path().join("seen.json"), "feed");
        assert!(seen.is_empty());
    }

    #[test]
    fn corrupt_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let seen = SeenIds::load(&path, "feed");
        assert!(seen.is_empty());
    }

    #[test]
    fn roundtrips_through_a_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");

        let mut seen = SeenIds::default();
        seen.insert("f1");
        seen.insert("f2");
        seen.insert("f1");
        seen.save(&path);

        let reloaded = SeenIds::load(&path, "feed");
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("f1"));
        assert!(reloaded.contains("f2"));

        // On-disk format is a JSON array of strings.
        let raw: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
    }
}
