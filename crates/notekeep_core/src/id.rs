//! Identifier generation for notes and tags.
//!
//! # Invariants
//! - Every id returned by one generator instance is distinct.
//! - Ids are opaque; nothing downstream parses them.

use uuid::Uuid;

/// Source of fresh, unique identifiers.
pub trait IdGenerator {
    fn new_id(&mut self) -> String;
}

/// Random UUID v4 ids in hyphenated text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` ids, counting from 1.
///
/// Only unique within one instance; meant for tests and fixtures.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
