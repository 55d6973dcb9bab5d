//! Canonical (key-sorted) rendering of message trees
//!
//! Used for change detection: a file is rewritten only when the canonical
//! text of the new tree differs from that of the tree already on disk.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Error computing a content digest
#[derive(Debug, thiserror::Error)]
#[error("JCS serialization failed: {0}")]
pub struct DigestError(String);

/// Return a copy of `tree` whose objects have their keys in sorted order.
///
/// Keys are ordered by Unicode code point, which is the same as UTF-8 byte
/// order and the iteration order of `serde_json::Map`. This differs from
/// JavaScript's default UTF-16 code unit sort only when one key has a
/// character above U+FFFF where another has one in U+E000..=U+FFFF; there
/// the code point order puts the U+E000..=U+FFFF key first.
///
/// Array element order is preserved.
pub fn canonicalize(tree: &Value) -> Value {
    match tree {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key.clone(), canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        scalar => scalar.clone(),
    }
}

/// Serialize a tree as pretty-printed JSON (two-space indent) with sorted keys.
pub fn canonical_serialize(tree: &Value) -> String {
    let canonical = canonicalize(tree);
    // Display on Value cannot fail; `{:#}` is the pretty form
    format!("{:#}", canonical)
}

/// True when `merged` would serialize to the same canonical text as `existing`.
pub fn is_unchanged(existing: &Value, merged: &Value) -> bool {
    canonical_serialize(existing) == canonical_serialize(merged)
}

/// SHA-256 hex digest of the RFC 8785 (JCS) encoding of a tree
pub fn content_digest(tree: &Value) -> Result<String, DigestError> {
    let jcs_bytes =
        serde_json_canonicalizer::to_vec(tree).map_err(|e| DigestError(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}
