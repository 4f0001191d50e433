use std::fmt;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use serde_json::{Map, Value};

use super::metadata::{self, METADATA_KEY};
use super::value;
use crate::errors::{Result, SessionError};
use crate::lock;

#[derive(Debug, Default)]
struct StorageState {
    data: Map<String, Value>,
    metadata: Map<String, Value>,
    immutable: bool,
}

/// Key/value view over the state of one session.
///
/// Cloning a `Storage` yields another view of the **same** state: writes through
/// any handle are visible through all of them, and [`Storage::mark_immutable`]
/// is observed by every handle.
#[derive(Clone, Default)]
pub struct Storage {
    state: Arc<RwLock<StorageState>>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock::read(&self.state);
        f.debug_struct("Storage")
            .field("keys", &state.data.len())
            .field("immutable", &state.immutable)
            .finish_non_exhaustive()
    }
}

impl Storage {
    /// Creates an empty, detached storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage from a raw snapshot (user keys plus an optional metadata map).
    pub fn from_map(map: Map<String, Value>) -> Self {
        let (data, metadata) = split_snapshot(map);
        Self {
            state: Arc::new(RwLock::new(StorageState { data, metadata, immutable: false })),
        }
    }

    /// Returns true when both handles view the same session state.
    pub fn ptr_eq(a: &Storage, b: &Storage) -> bool {
        Arc::ptr_eq(&a.state, &b.state)
    }

    fn mutable(&self) -> Result<RwLockWriteGuard<'_, StorageState>> {
        let guard = lock::write(&self.state);
        if guard.immutable {
            return Err(SessionError::ImmutableStorage);
        }
        Ok(guard)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        lock::read(&self.state).data.get(key).cloned()
    }

    pub fn get_path(&self, path: &[&str]) -> Option<Value> {
        value::get_path(&lock::read(&self.state).data, path).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.set_path(&[key], value)
    }

    pub fn set_path(&self, path: &[&str], value: impl Into<Value>) -> Result<()> {
        check_user_path(path)?;
        let mut state = self.mutable()?;
        value::set_path(&mut state.data, path, value.into())
    }

    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        self.remove_path(&[key])
    }

    pub fn remove_path(&self, path: &[&str]) -> Result<Option<Value>> {
        let mut state = self.mutable()?;
        Ok(value::remove_path(&mut state.data, path))
    }

    pub fn contains(&self, key: &str) -> bool {
        lock::read(&self.state).data.contains_key(key)
    }

    /// User keys, metadata excluded.
    pub fn keys(&self) -> Vec<String> {
        lock::read(&self.state).data.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock::read(&self.state).data.len()
    }

    pub fn is_empty(&self) -> bool {
        lock::read(&self.state).data.is_empty()
    }

    /// Removes every user key. Metadata is kept.
    pub fn clear(&self) -> Result<()> {
        self.mutable()?.data.clear();
        Ok(())
    }

    /// Removes every user key and all metadata.
    pub fn clear_all(&self) -> Result<()> {
        let mut state = self.mutable()?;
        state.data.clear();
        state.metadata.clear();
        Ok(())
    }

    /// One-way switch: every later mutation through any handle fails.
    pub fn mark_immutable(&self) {
        lock::write(&self.state).immutable = true;
    }

    pub fn is_immutable(&self) -> bool {
        lock::read(&self.state).immutable
    }

    pub fn set_metadata(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.mutable()?.metadata.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> Option<Value> {
        lock::read(&self.state).metadata.get(key).cloned()
    }

    pub fn remove_metadata(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.mutable()?.metadata.remove(key))
    }

    /// The whole metadata namespace.
    pub fn metadata(&self) -> Map<String, Value> {
        lock::read(&self.state).metadata.clone()
    }

    pub fn request_access_time(&self) -> Option<i64> {
        lock::read(&self.state)
            .metadata
            .get(metadata::REQUEST_ACCESS_TIME)
            .and_then(Value::as_i64)
    }

    pub(crate) fn touch(&self, now: i64) -> Result<()> {
        self.set_metadata(metadata::REQUEST_ACCESS_TIME, now)
    }

    /// Fingerprints recorded by validators, keyed by validator name.
    pub fn validation_fingerprints(&self) -> Map<String, Value> {
        metadata::sub_map(&lock::read(&self.state).metadata, metadata::VALID)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn record_fingerprints(&self, fingerprints: Map<String, Value>) -> Result<()> {
        let mut state = self.mutable()?;
        let valid = metadata::sub_map_mut(&mut state.metadata, metadata::VALID);
        valid.extend(fingerprints);
        Ok(())
    }

    /// Drops `key` after it survived `hops` more session starts.
    pub fn set_expiration_hops(&self, key: &str, hops: u32) -> Result<()> {
        check_user_path(&[key])?;
        let mut state = self.mutable()?;
        metadata::sub_map_mut(&mut state.metadata, metadata::EXPIRE_HOPS).insert(key.to_string(), hops.into());
        Ok(())
    }

    /// Drops `key` once the unix time reaches `deadline`.
    pub fn set_expiration_deadline(&self, key: &str, deadline: i64) -> Result<()> {
        check_user_path(&[key])?;
        let mut state = self.mutable()?;
        metadata::sub_map_mut(&mut state.metadata, metadata::EXPIRE).insert(key.to_string(), deadline.into());
        Ok(())
    }

    pub fn set_expiration_seconds(&self, key: &str, seconds: u64) -> Result<()> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.set_expiration_deadline(key, now.saturating_add_unsigned(seconds))
    }

    /// Applies hop and deadline expiry. Returns the keys that were dropped.
    pub fn expire_keys(&self, now: i64) -> Result<Vec<String>> {
        let mut state = self.mutable()?;
        let StorageState { data, metadata: meta, .. } = &mut *state;
        Ok(metadata::sweep_expired(data, meta, now))
    }

    /// Snapshot of the user keys, and of the metadata under [`METADATA_KEY`] when requested.
    pub fn to_map(&self, include_metadata: bool) -> Map<String, Value> {
        let state = lock::read(&self.state);
        let mut map = state.data.clone();
        if include_metadata {
            map.insert(METADATA_KEY.to_string(), Value::Object(state.metadata.clone()));
        }
        map
    }

    /// Replaces user keys and metadata with the contents of `map`.
    pub fn load_map(&self, map: Map<String, Value>) -> Result<()> {
        let (data, metadata) = split_snapshot(map);
        let mut state = self.mutable()?;
        state.data = data;
        state.metadata = metadata;
        Ok(())
    }

    /// Serialized form handed to a save handler.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_map(true))?)
    }

    /// Replaces the contents with a blob produced by [`Storage::to_blob`].
    pub fn load_blob(&self, blob: &[u8]) -> Result<()> {
        let map: Map<String, Value> = serde_json::from_slice(blob)?;
        self.load_map(map)
    }
}

fn check_user_path(path: &[&str]) -> Result<()> {
    if path.first() == Some(&METADATA_KEY) {
        return Err(SessionError::InvalidArgument(format!("{METADATA_KEY} is a reserved key")));
    }
    Ok(())
}

fn split_snapshot(mut map: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let metadata = match map.remove(METADATA_KEY) {
        Some(Value::Object(metadata)) => metadata,
        Some(other) => {
            log::warn!("Ignoring malformed session metadata of type {}", type_name(&other));
            Map::new()
        }
        None => Map::new(),
    };
    (map, metadata)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
