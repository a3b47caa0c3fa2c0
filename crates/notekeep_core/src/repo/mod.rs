//! Repository layer: the key-value persistence boundary.
//!
//! # Responsibility
//! - Define the `load`/`save` contract the note store persists through.
//! - Isolate SQLite and JSON details from store orchestration.
//!
//! # Invariants
//! - Values are stored as JSON text keyed by string.
//! - Loading an absent key seeds it with the caller's default.

pub mod kv_repo;
pub mod memory_repo;
