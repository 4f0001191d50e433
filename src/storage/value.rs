//! Path-addressed access into nested session values.
//!
//! Stored values are [`serde_json::Value`] trees. A key path is a slice of
//! segments: map segments are keys, sequence segments are decimal indexes.

use serde_json::{Map, Value};

use crate::errors::{Result, SessionError};

/// Value type stored in a session.
pub type SessionValue = Value;

pub fn get_path<'a>(root: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = root.get(*first)?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn get_path_mut<'a>(root: &'a mut Map<String, Value>, path: &[&str]) -> Option<&'a mut Value> {
    let (first, rest) = path.split_first()?;
    let mut current = root.get_mut(*first)?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get_mut(*segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Assigns `value` at `path`, creating intermediate maps for missing or null segments.
///
/// An index equal to a sequence's length appends. Descending into a scalar or past the
/// end of a sequence fails with [`SessionError::InvalidArgument`].
pub fn set_path(root: &mut Map<String, Value>, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Err(SessionError::InvalidArgument("empty key path".to_string()));
    };
    let Some((first, middle)) = parents.split_first() else {
        root.insert(last.to_string(), value);
        return Ok(());
    };

    let mut current = root.entry(first.to_string()).or_insert(Value::Null);
    for (depth, segment) in middle.iter().enumerate() {
        current = descend(current, segment, &path[..depth + 2])?;
    }
    assign(current, last, value, path)
}

/// Removes and returns the value at `path`, if present.
pub fn remove_path(root: &mut Map<String, Value>, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    if parents.is_empty() {
        return root.remove(*last);
    }

    match get_path_mut(root, parents)? {
        Value::Object(map) => map.remove(*last),
        Value::Array(items) => {
            let idx = last.parse::<usize>().ok()?;
            (idx < items.len()).then(|| items.remove(idx))
        }
        _ => None,
    }
}

fn descend<'a>(node: &'a mut Value, segment: &str, at: &[&str]) -> Result<&'a mut Value> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let idx = parse_index(segment, items.len(), at)?;
            if idx == items.len() {
                items.push(Value::Null);
            }
            Ok(&mut items[idx])
        }
        _ => Err(not_a_container(at)),
    }
}

fn assign(node: &mut Value, segment: &str, value: Value, at: &[&str]) -> Result<()> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let idx = parse_index(segment, items.len(), at)?;
            if idx == items.len() {
                items.push(value);
            } else {
                items[idx] = value;
            }
            Ok(())
        }
        _ => Err(not_a_container(at)),
    }
}

fn parse_index(segment: &str, len: usize, at: &[&str]) -> Result<usize> {
    match segment.parse::<usize>() {
        Ok(idx) if idx <= len => Ok(idx),
        _ => Err(SessionError::InvalidArgument(format!(
            "{:?} is not a valid index into a sequence of length {len} at {}",
            segment,
            at.join(".")
        ))),
    }
}

fn not_a_container(at: &[&str]) -> SessionError {
    SessionError::InvalidArgument(format!("cannot descend into a scalar value at {}", at.join(".")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn get_walks_maps_and_sequences() {
        let r = root(json!({ "cart": { "items": [ { "sku": "A1" }, { "sku": "B2" } ] } }));
        assert_eq!(get_path(&r, &["cart", "items", "1", "sku"]), Some(&json!("B2")));
        assert_eq!(get_path(&r, &["cart", "items", "7"]), None);
        assert_eq!(get_path(&r, &["cart", "items", "x"]), None);
        assert_eq!(get_path(&r, &[]), None);
    }

    #[test]
    fn set_creates_intermediate_maps() {
        let mut r = Map::new();
        set_path(&mut r, &["user", "prefs", "theme"], json!("dark")).unwrap();
        assert_eq!(Value::Object(r), json!({ "user": { "prefs": { "theme": "dark" } } }));
    }

    #[test]
    fn set_on_sequence_replaces_or_appends() {
        let mut r = root(json!({ "list": [1, 2] }));
        set_path(&mut r, &["list", "0"], json!(10)).unwrap();
        set_path(&mut r, &["list", "2"], json!(3)).unwrap();
        assert_eq!(r["list"], json!([10, 2, 3]));

        let err = set_path(&mut r, &["list", "9"], json!(0)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
    }

    #[test]
    fn set_refuses_to_descend_into_scalars() {
        let mut r = root(json!({ "count": 3 }));
        let err = set_path(&mut r, &["count", "nested"], json!(true)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidArgument(ref m) if m.contains("count")));
        assert_eq!(r["count"], json!(3));
    }

    #[test]
    fn remove_returns_value_at_depth() {
        let mut r = root(json!({ "a": { "b": { "c": 1, "d": 2 } }, "l": ["x", "y"] }));
        assert_eq!(remove_path(&mut r, &["a", "b", "c"]), Some(json!(1)));
        assert_eq!(remove_path(&mut r, &["a", "b", "c"]), None);
        assert_eq!(remove_path(&mut r, &["l", "0"]), Some(json!("x")));
        assert_eq!(Value::Object(r), json!({ "a": { "b": { "d": 2 } }, "l": ["y"] }));
    }
}
