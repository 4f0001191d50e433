use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use time::OffsetDateTime;

use crate::lock;
use crate::save_handler::SaveHandler;

#[derive(Debug, Clone)]
struct Entry {
    data: Vec<u8>,
    updated_at: i64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    opened: Option<(String, String)>,
}

/// In-memory save handler (no persistence across processes).
///
/// Clones share the same entries, so a test can keep one clone for inspection
/// while the manager owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemorySaveHandler {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySaveHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(save_path, session_name)` of the last `open` call.
    pub fn opened_with(&self) -> Option<(String, String)> {
        lock::read(&self.inner).opened.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        lock::read(&self.inner).entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        lock::read(&self.inner).entries.get(id).map(|e| e.data.clone())
    }

    /// Seeds a blob, e.g. to simulate a session persisted by an earlier request.
    pub fn insert(&self, id: &str, data: impl Into<Vec<u8>>) {
        lock::write(&self.inner).entries.insert(
            id.to_string(),
            Entry {
                data: data.into(),
                updated_at: now(),
            },
        );
    }

    /// Ids currently stored, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock::read(&self.inner).entries.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        lock::read(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        lock::read(&self.inner).entries.is_empty()
    }

    /// Rewrites the last-modified time of `id`, used to age entries for `gc`.
    pub fn set_updated_at(&self, id: &str, unix: i64) {
        if let Some(entry) = lock::write(&self.inner).entries.get_mut(id) {
            entry.updated_at = unix;
        }
    }

    fn gc_at(&self, max_lifetime: u64, now: i64) -> usize {
        let cutoff = now.saturating_sub_unsigned(max_lifetime);
        let mut inner = lock::write(&self.inner);
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.updated_at >= cutoff);
        before - inner.entries.len()
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

impl SaveHandler for InMemorySaveHandler {
    fn open(&self, save_path: &str, session_name: &str) -> Result<()> {
        lock::write(&self.inner).opened = Some((save_path.to_string(), session_name.to_string()));
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        Ok(self.get(id).unwrap_or_default())
    }

    fn write(&self, id: &str, data: &[u8]) -> Result<()> {
        self.insert(id, data);
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<()> {
        lock::write(&self.inner).entries.remove(id);
        Ok(())
    }

    fn gc(&self, max_lifetime: u64) -> Result<usize> {
        let removed = self.gc_at(max_lifetime, now());
        if removed > 0 {
            log::debug!("Collected {removed} expired session(s)");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_contract() {
        let handler = InMemorySaveHandler::new();
        handler.open("/tmp/sessions", "SESSIONID").unwrap();
        assert_eq!(
            handler.opened_with(),
            Some(("/tmp/sessions".to_string(), "SESSIONID".to_string()))
        );

        // unknown ids read as empty
        assert!(handler.read("nope").unwrap().is_empty());

        handler.write("abc", b"{}").unwrap();
        assert_eq!(handler.read("abc").unwrap(), b"{}".to_vec());

        // overwrite
        handler.write("abc", b"{\"a\":1}").unwrap();
        assert_eq!(handler.read("abc").unwrap(), b"{\"a\":1}".to_vec());

        // destroy is idempotent
        handler.destroy("abc").unwrap();
        handler.destroy("abc").unwrap();
        assert!(!handler.contains("abc"));
    }

    #[test]
    fn clones_share_entries() {
        let a = InMemorySaveHandler::new();
        let b = a.clone();
        a.write("x", b"1").unwrap();
        assert_eq!(b.get("x"), Some(b"1".to_vec()));
        assert_eq!(b.ids(), vec!["x".to_string()]);
    }

    #[test]
    fn gc_removes_only_stale_entries() {
        let handler = InMemorySaveHandler::new();
        handler.insert("fresh", "{}");
        handler.insert("stale", "{}");
        handler.set_updated_at("fresh", 1_000);
        handler.set_updated_at("stale", 100);

        assert_eq!(handler.gc_at(500, 1_200), 1);
        assert_eq!(handler.ids(), vec!["fresh".to_string()]);
        assert_eq!(handler.gc(1440).unwrap(), 1);
        assert!(handler.is_empty());
    }
}
