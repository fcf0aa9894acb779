//! Payload compaction: rename known keys to short codes before encryption
//!
//! Purely a size reduction; it carries no secrecy. Keys missing from the
//! table pass through untouched in both directions, so payloads written by a
//! client with a newer table still expand to something usable.

use gptlink_core::{LinkError, LinkResult};
use serde_json::{Map, Value};

use crate::keymap::{long_name, short_code};

/// Replace every mapped object key with its short code, recursively.
///
/// Fails with [`LinkError::Format`] when an object already holds a key equal
/// to the code a sibling key would be renamed to.
pub fn compact(value: &Value) -> LinkResult<Value> {
    rename_keys(value, short_code)
}

/// Replace every short code with its verbose key, recursively.
///
/// Fails when an object holds both a short code and its verbose key.
pub fn expand(value: &Value) -> LinkResult<Value> {
    rename_keys(value, long_name)
}

fn rename_keys(value: &Value, lookup: fn(&str) -> Option<&'static str>) -> LinkResult<Value> {
    match value {
        Value::Object(obj) => {
            let mut renamed = Map::with_capacity(obj.len());
            for (key, inner) in obj {
                let target = lookup(key).map_or_else(|| key.clone(), str::to_owned);
                if renamed.contains_key(&target) {
                    return Err(LinkError::Format(format!(
                        "key collision: \"{key}\" and a sibling both map to \"{target}\""
                    )));
                }
                renamed.insert(target, rename_keys(inner, lookup)?);
            }
            Ok(Value::Object(renamed))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| rename_keys(v, lookup))
            .collect::<LinkResult<Vec<_>>>()
            .map(Value::Array),
        scalar => Ok(scalar.clone()),
    }
}
