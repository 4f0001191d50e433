use std::collections::HashMap;
use std::sync::RwLock;

use super::area::Storage;
use crate::lock;

/// Registry holding the canonical state of every session known to this process.
///
/// `bind` for an id that is already registered returns a view of the existing
/// state, so every manager resuming the same session works on one shared state.
#[derive(Debug, Default)]
pub struct StorageArena {
    sessions: RwLock<HashMap<String, Storage>>,
}

impl StorageArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared view for `id`, adopting `storage` as the canonical state if the
    /// id is not registered yet.
    pub fn bind(&self, id: &str, storage: &Storage) -> Storage {
        lock::write(&self.sessions)
            .entry(id.to_string())
            .or_insert_with(|| storage.clone())
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Storage> {
        lock::read(&self.sessions).get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        lock::read(&self.sessions).contains_key(id)
    }

    /// Moves the state registered under `old` to `new`.
    pub fn rekey(&self, old: &str, new: &str) -> Option<Storage> {
        let mut sessions = lock::write(&self.sessions);
        let storage = sessions.remove(old)?;
        sessions.insert(new.to_string(), storage.clone());
        Some(storage)
    }

    pub fn remove(&self, id: &str) -> Option<Storage> {
        lock::write(&self.sessions).remove(id)
    }

    pub fn len(&self) -> usize {
        lock::read(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock::read(&self.sessions).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_id_shares_state_different_ids_isolate() {
        let arena = StorageArena::new();

        let a1 = arena.bind("a", &Storage::new());
        let a2 = arena.bind("a", &Storage::new());
        a1.set("k", "v").unwrap();
        assert!(Storage::ptr_eq(&a1, &a2));
        assert_eq!(a2.get("k"), Some(json!("v")));

        let b = arena.bind("b", &Storage::new());
        assert!(b.get("k").is_none());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn bind_adopts_the_given_storage() {
        let arena = StorageArena::new();
        let local = Storage::new();
        local.set("pre", 1).unwrap();

        let bound = arena.bind("x", &local);
        assert!(Storage::ptr_eq(&bound, &local));
        assert!(arena.contains("x"));
    }

    #[test]
    fn rekey_moves_state() {
        let arena = StorageArena::new();
        let s = arena.bind("old", &Storage::new());
        s.set("cart", json!([1, 2])).unwrap();

        let moved = arena.rekey("old", "new").unwrap();
        assert!(Storage::ptr_eq(&moved, &s));
        assert!(arena.get("old").is_none());
        assert_eq!(arena.get("new").and_then(|s| s.get("cart")), Some(json!([1, 2])));
        assert!(arena.rekey("missing", "other").is_none());
    }

    #[test]
    fn remove_drops_only_that_session() {
        let arena = StorageArena::new();
        arena.bind("a", &Storage::new());
        arena.bind("b", &Storage::new());

        assert!(arena.remove("a").is_some());
        assert!(!arena.contains("a"));
        assert!(arena.contains("b"));
        assert!(arena.remove("a").is_none());
    }
}
