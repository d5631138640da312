// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON merge patch for session metadata (RFC 7386)

use crate::record::Metadata;
use serde_json::Value;

/// Apply `patch` to `target` in place.
///
/// Nested objects merge key by key, `null` removes a key, and any other value
/// replaces whatever was there. Applying the same patch again is a no-op.
pub fn merge_patch(target: &mut Metadata, patch: &Metadata) {
    for (key, value) in patch {
        match value {
            Value::Null => {
                target.remove(key);
            }
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Metadata::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Metadata::new());
                }
                if let Value::Object(existing) = slot {
                    merge_patch(existing, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

/// Apply a sequence of patches in order, returning the merged result
pub fn merge_all<'a>(base: &Metadata, patches: impl IntoIterator<Item = &'a Metadata>) -> Metadata {
    let mut merged = base.clone();
    for patch in patches {
        merge_patch(&mut merged, patch);
    }
    merged
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
