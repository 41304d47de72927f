//! Transcript store: one JSON slot per visitor session.
//!
//! Layout under `{work_dir}/sessions/`:
//! - `{session_id}/ai_chat_history.json`: the whole transcript as a JSON array
//!
//! The slot is rewritten in full on every change. A transcript holding only
//! the greeting is never written. With a cap set, only the newest messages
//! are kept (FIFO, oldest dropped first).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::ChatMessage;
use crate::error::AppError;

/// Fixed key of the transcript slot.
pub const CHAT_HISTORY_KEY: &str = "ai_chat_history";

#[derive(Debug, Clone)]
pub struct TranscriptStore {
    root: PathBuf,
    cap: Option<usize>,
}

impl TranscriptStore {
    pub fn new(root: impl Into<PathBuf>, cap: Option<usize>) -> Self {
        Self { root: root.into(), cap }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Session ids become directory names: only ASCII alphanumerics, `-`
    /// and `_` are accepted.
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= 64
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    fn slot_path(&self, id: &str) -> Result<PathBuf, AppError> {
        if !Self::is_valid_id(id) {
            return Err(AppError::Storage(format!("invalid session id: {id:?}")));
        }
        Ok(self.root.join(id).join(format!("{CHAT_HISTORY_KEY}.json")))
    }

    /// Restore a transcript. Missing or malformed data yields an empty list.
    pub fn load(&self, id: &str) -> Vec<ChatMessage> {
        let path = match self.slot_path(id) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "transcript load skipped");
                return Vec::new();
            }
        };
        let data = match fs::read_to_string(&path) {
            Ok(d) => d,
            Err(_) => {
                debug!(session_id = %id, "no stored transcript");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ChatMessage>>(&data) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse chat history");
                Vec::new()
            }
        }
    }

    /// Overwrite the slot. Returns `Ok(false)` without touching disk when
    /// the transcript is just the greeting.
    pub fn save(&self, id: &str, messages: &[ChatMessage]) -> Result<bool, AppError> {
        if messages.len() <= 1 {
            return Ok(false);
        }
        let path = self.slot_path(id)?;
        let start = match self.cap {
            Some(cap) => messages.len().saturating_sub(cap),
            None => 0,
        };
        let data = serde_json::to_string(&messages[start..])
            .map_err(|e| AppError::Storage(format!("serialise transcript: {e}")))?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| AppError::Storage(format!("cannot create {}: {e}", dir.display())))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)
            .map_err(|e| AppError::Storage(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| AppError::Storage(format!("cannot replace {}: {e}", path.display())))?;
        debug!(session_id = %id, messages = messages.len() - start, "transcript saved");
        Ok(true)
    }

    /// Delete the slot. Removing a slot that does not exist is not an error.
    pub fn remove(&self, id: &str) -> Result<bool, AppError> {
        let path = self.slot_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!("cannot remove {}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{greeting, Sender};
    use tempfile::TempDir;

    fn msg(sender: Sender, text: &str) -> ChatMessage {
        ChatMessage { sender, text: text.into() }
    }

    fn setup(cap: Option<usize>) -> (TempDir, TranscriptStore) {
        let dir = TempDir::new().unwrap();
        let store = TranscriptStore::new(dir.path().join("sessions"), cap);
        (dir, store)
    }

    #[test]
    fn missing_slot_loads_empty() {
        let (_dir, store) = setup(None);
        assert!(store.load("abc").is_empty());
    }

    #[test]
    fn greeting_only_is_not_written() {
        let (_dir, store) = setup(None);
        assert!(!store.save("abc", &[greeting()]).unwrap());
        assert!(!store.root().join("abc").exists());
    }

    #[test]
    fn save_then_load() {
        let (_dir, store) = setup(None);
        let t = vec![greeting(), msg(Sender::Visitor, "hi"), msg(Sender::Assistant, "hello")];
        assert!(store.save("abc", &t).unwrap());
        assert_eq!(store.load("abc"), t);
        let file = store.root().join("abc").join("ai_chat_history.json");
        let raw = fs::read_to_string(file).unwrap();
        assert!(raw.contains("\"sender\":\"user\""));
        assert!(raw.contains("\"sender\":\"ai\""));
    }

    #[test]
    fn malformed_slot_loads_empty() {
        let (_dir, store) = setup(None);
        let dir = store.root().join("abc");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ai_chat_history.json"), "{not json").unwrap();
        assert!(store.load("abc").is_empty());
    }

    #[test]
    fn cap_keeps_newest() {
        let (_dir, store) = setup(Some(2));
        let t = vec![
            greeting(),
            msg(Sender::Visitor, "q1"),
            msg(Sender::Assistant, "a1"),
        ];
        store.save("abc", &t).unwrap();
        let loaded = store.load("abc");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "q1");
    }

    #[test]
    fn remove_slot() {
        let (_dir, store) = setup(None);
        store.save("abc", &[greeting(), msg(Sender::Visitor, "hi")]).unwrap();
        assert!(store.remove("abc").unwrap());
        assert!(store.load("abc").is_empty());
        assert!(!store.remove("abc").unwrap());
    }

    #[test]
    fn path_like_ids_are_rejected() {
        let (_dir, store) = setup(None);
        assert!(!TranscriptStore::is_valid_id("../etc"));
        assert!(!TranscriptStore::is_valid_id(""));
        assert!(store.save("../x", &[greeting(), greeting()]).is_err());
        assert!(store.load("a/b").is_empty());
    }
}
