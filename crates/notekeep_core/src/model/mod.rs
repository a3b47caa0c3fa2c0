//! Domain model for notes and tags.
//!
//! # Responsibility
//! - Define the persisted shapes (`RawNote`, `Tag`) and the resolved view
//!   shape (`Note`) consumed by presentation layers.
//!
//! # Invariants
//! - Notes reference tags by id only; the tag collection is flat.
//! - Ids are opaque strings and never reused.

pub mod note;
pub mod tag;
