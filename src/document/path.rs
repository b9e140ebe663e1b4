//! Deep-path assignment into JSON documents
//!
//! A path is a dot-separated list of segments; a segment that is all
//! ASCII digits addresses an array index, anything else an object key.
//! Assigning through a path creates every missing intermediate
//! container: the container's kind is decided by the *next* segment,
//! so `items.0.name` creates an array under `items` while
//! `items.name` creates an object.

use serde_json::Value;

use crate::errors::{InputError, InputResult};

/// Split a path into its non-empty segments.
///
/// Fails when nothing remains after discarding empty segments, so
/// `""`, `"."` and `".."` are all rejected.
pub fn split_path(path: &str) -> InputResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(InputError::EmptyPath(path.to_string()));
    }
    Ok(segments)
}

/// Whether a segment addresses an array index.
pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Assign `value` at `path` inside `root`, creating intermediate
/// containers as needed.
///
/// `root` is mutated in place. An intermediate segment that runs into
/// an existing scalar fails with [`InputError::TypeConflict`] rather
/// than overwriting it.
pub fn assign(root: &mut Value, path: &str, value: Value) -> InputResult<()> {
    let segments = split_path(path)?;
    let (leaf, parents) = match segments.split_last() {
        Some(parts) => parts,
        None => return Err(InputError::EmptyPath(path.to_string())),
    };

    let mut cursor = root;
    for (i, segment) in parents.iter().enumerate() {
        let following = parents.get(i + 1).copied().unwrap_or(leaf);
        cursor = descend(cursor, segment, following, path)?;
    }

    match cursor {
        Value::Array(items) if is_index(leaf) => {
            let idx = parse_index(leaf)?;
            if idx >= items.len() {
                items.resize(idx + 1, Value::Null);
            }
            items[idx] = value;
        }
        Value::Object(map) => {
            map.insert(leaf.to_string(), value);
        }
        other => {
            return Err(InputError::TypeConflict {
                path: path.to_string(),
                segment: leaf.to_string(),
                found: kind_of(other),
            })
        }
    }
    Ok(())
}

/// Step one segment into `cursor`, creating the slot when absent.
///
/// `following` is the segment after this one; it decides whether a
/// freshly created slot becomes an array or an object.
fn descend<'a>(
    cursor: &'a mut Value,
    segment: &str,
    following: &str,
    path: &str,
) -> InputResult<&'a mut Value> {
    match cursor {
        Value::Array(items) => {
            if !is_index(segment) {
                return Err(InputError::TypeConflict {
                    path: path.to_string(),
                    segment: segment.to_string(),
                    found: "array",
                });
            }
            let idx = parse_index(segment)?;
            if idx >= items.len() {
                items.resize(idx + 1, Value::Null);
            }
            prepare_slot(&mut items[idx], segment, following, path)
        }
        Value::Object(map) => {
            let slot = map.entry(segment.to_string()).or_insert(Value::Null);
            prepare_slot(slot, segment, following, path)
        }
        other => Err(InputError::TypeConflict {
            path: path.to_string(),
            segment: segment.to_string(),
            found: kind_of(other),
        }),
    }
}

fn prepare_slot<'a>(
    slot: &'a mut Value,
    segment: &str,
    following: &str,
    path: &str,
) -> InputResult<&'a mut Value> {
    if slot.is_null() {
        *slot = if is_index(following) {
            Value::Array(Vec::new())
        } else {
            Value::Object(serde_json::Map::new())
        };
    }
    match slot {
        Value::Object(_) | Value::Array(_) => Ok(slot),
        other => Err(InputError::TypeConflict {
            path: path.to_string(),
            segment: segment.to_string(),
            found: kind_of(other),
        }),
    }
}

fn parse_index(segment: &str) -> InputResult<usize> {
    segment
        .parse::<usize>()
        .map_err(|_| InputError::InvalidIndex(segment.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
