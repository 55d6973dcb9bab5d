//! Message tree merging for globalize-tasks
//!
//! Combines nested JSON message trees (objects, arrays, scalars) and renders
//! them in a canonical, key-sorted form so that two trees can be compared
//! regardless of the order their keys were inserted in.

mod canonical;
mod merge;

pub use canonical::{canonical_serialize, canonicalize, content_digest, is_unchanged, DigestError};
pub use merge::{deep_merge, merge, merge_refs};
