//! Merge newly produced values into whatever already sits at a key.
//!
//! Nothing previously stored is ever dropped: existing content always ends up
//! at the front of the result. A single new value is stored bare unless it has
//! to share the slot with existing content.

use serde_yaml::Value;

use crate::document::{Document, Slot};
use crate::error::EncfigError;
use crate::keypath::KeyPath;

/// Combine `existing` with `incoming` (non-empty, in order).
pub fn merge_values(existing: Slot, mut incoming: Vec<Value>) -> Value {
    match existing {
        Slot::Missing if incoming.len() == 1 => incoming.remove(0),
        Slot::Missing => Value::Sequence(incoming),
        Slot::Sequence(mut seq) => {
            seq.append(&mut incoming);
            Value::Sequence(seq)
        }
        Slot::Scalar(old) => prepend(old, incoming),
        Slot::Map(old) => prepend(Value::Mapping(old), incoming),
    }
}

fn prepend(old: Value, incoming: Vec<Value>) -> Value {
    let mut seq = Vec::with_capacity(incoming.len() + 1);
    seq.push(old);
    seq.extend(incoming);
    Value::Sequence(seq)
}

/// Store `values` at `key` inside `doc`, creating or coercing ancestors as
/// needed and merging with any existing content at the terminal key.
pub fn store_values(
    doc: &mut Document,
    key: &KeyPath,
    values: Vec<Value>,
) -> Result<(), EncfigError> {
    if values.is_empty() {
        return Err(EncfigError::NothingToEncrypt);
    }

    let parent = doc.parent_mut(key.ancestors());
    let existing = Slot::take(parent, key.terminal());
    let merged = merge_values(existing, values);

    let slot = parent
        .entry(Value::String(key.terminal().to_owned()))
        .or_insert(Value::Null);
    *slot = merged;

    tracing::debug!(key = %key, "stored values");
    Ok(())
}
