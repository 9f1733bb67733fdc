//! Opaque session state exchanged with the content source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized authentication state issued by the content source.
///
/// The core treats this as an opaque JSON object: it is produced by
/// [`ContentSource::export_session`](crate::ContentSource::export_session),
/// persisted across restarts, and fed back through
/// [`ContentSource::restore_session`](crate::ContentSource::restore_session).
/// The one key the core knows about is [`Self::TRANSIENT_KEY`], which the
/// client re-derives on every export and which must never reach disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionBlob(pub serde_json::Map<String, Value>);

impl SessionBlob {
    /// Derived request constants included in every export. Not state.
    pub const TRANSIENT_KEY: &'static str = "constants";

    /// Remove the transient key prior to persisting.
    pub fn strip_transient(&mut self) {
        self.0.remove(Self::TRANSIENT_KEY);
    }

    /// Look up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_transient_removes_constants_only() {
        let mut blob = SessionBlob::default();
        blob.0.insert("cookies".into(), json!({"sessionid": "abc"}));
        blob.0
            .insert("constants".into(), json!({"app_version": "x"}));

        blob.strip_transient();

        assert!(blob.get("constants").is_none());
        assert!(blob.get("cookies").is_some());
    }

    #[test]
    fn strip_transient_is_a_noop_when_absent() {
        let mut blob = SessionBlob::default();
        blob.0.insert("device_id".into(), json!("android-123"));
        blob.strip_transient();
        assert!(blob.get("device_id").is_some());
    }
}
