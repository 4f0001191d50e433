//! Reserved metadata namespace.
//!
//! Metadata lives next to the user keys in the persisted blob, under
//! [`METADATA_KEY`]. It is never returned by plain key iteration.

use serde_json::{Map, Value};

/// Top-level key of the metadata map inside a persisted session blob.
pub const METADATA_KEY: &str = "__SESSION_META__";
/// Unix timestamp of the last successful session start.
pub const REQUEST_ACCESS_TIME: &str = "_REQUEST_ACCESS_TIME";
/// Validator name -> fingerprint recorded at the last successful start.
pub const VALID: &str = "_VALID";
/// User key -> remaining request hops before the key is dropped.
pub const EXPIRE_HOPS: &str = "_EXPIRE_HOPS";
/// User key -> unix deadline after which the key is dropped.
pub const EXPIRE: &str = "_EXPIRE";

pub(crate) fn sub_map<'a>(metadata: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    metadata.get(key).and_then(Value::as_object)
}

pub(crate) fn sub_map_mut<'a>(metadata: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = metadata.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced by an object"),
    }
}

/// Drops user keys whose hop counter ran out or whose deadline passed, and advances the
/// remaining hop counters by one request. Returns the dropped keys.
pub(crate) fn sweep_expired(data: &mut Map<String, Value>, metadata: &mut Map<String, Value>, now: i64) -> Vec<String> {
    let mut expired = Vec::new();

    if let Some(Value::Object(hops)) = metadata.get_mut(EXPIRE_HOPS) {
        let keys: Vec<String> = hops.keys().cloned().collect();
        for key in keys {
            let remaining = hops.get(&key).and_then(Value::as_u64).unwrap_or(0);
            if remaining == 0 || !data.contains_key(&key) {
                hops.remove(&key);
                if data.remove(&key).is_some() {
                    expired.push(key);
                }
            } else {
                hops.insert(key, Value::from(remaining - 1));
            }
        }
    }

    if let Some(Value::Object(deadlines)) = metadata.get_mut(EXPIRE) {
        let keys: Vec<String> = deadlines.keys().cloned().collect();
        for key in keys {
            let deadline = deadlines.get(&key).and_then(Value::as_i64).unwrap_or(i64::MIN);
            if now >= deadline || !data.contains_key(&key) {
                deadlines.remove(&key);
                if data.remove(&key).is_some() && !expired.contains(&key) {
                    expired.push(key);
                }
            }
        }
    }

    expired
}
