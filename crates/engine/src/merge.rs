//! Deep merge of a stored or imported document onto the default document.
//!
//! Objects merge key by key; every other value, arrays included, replaces the
//! target wholesale. Record collections are therefore taken as a unit from
//! the source, while singleton objects (`settings`, `creditCard`) keep any
//! default field the source does not mention.

use serde_json::{Map, Value};

/// Overlays `source` onto `target` in place.
///
/// Keys only present in `target` survive. Keys only present in `source` are
/// copied, known or not.
pub fn merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(slot) = slot {
                    merge(slot, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}
