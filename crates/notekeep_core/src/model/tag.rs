//! Tag domain model.

use serde::{Deserialize, Serialize};

/// Opaque tag identifier.
pub type TagId = String;

/// A user-defined label that notes reference by id.
///
/// Identity is `id`; `label` may be edited freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    pub fn new(id: impl Into<TagId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
