//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note shape (`RawNote`) and its tag-resolved
//!   projection (`Note`).
//! - Own the id join between notes and tags.
//!
//! # Invariants
//! - `RawNote::tag_ids` keeps insertion order and duplicates.
//! - `Note::tags` only ever contains tags that exist in the collection it
//!   was resolved against.

use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque note identifier.
pub type NoteId = String;

/// Persisted note record.
///
/// Serialized with camelCase field names (`tagIds`) to stay compatible with
/// previously stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNote {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    /// May contain ids of tags that were deleted since.
    pub tag_ids: Vec<TagId>,
}

impl RawNote {
    /// Builds a persisted note from a create/update payload.
    pub fn from_data(id: impl Into<NoteId>, data: &NoteData) -> Self {
        Self {
            id: id.into(),
            title: data.title.clone(),
            markdown: data.markdown.clone(),
            tag_ids: data.tag_ids(),
        }
    }

    /// Replaces title, markdown and tag ids from `data`; `id` is kept.
    pub fn apply(&mut self, data: &NoteData) {
        self.title = data.title.clone();
        self.markdown = data.markdown.clone();
        self.tag_ids = data.tag_ids();
    }

    /// Resolves tag ids against `tags`, dropping ids with no live tag.
    pub fn resolve(&self, tags: &[Tag]) -> Note {
        let index = tag_index(tags);
        self.resolve_with(&index)
    }

    fn resolve_with(&self, index: &HashMap<&str, &Tag>) -> Note {
        Note {
            id: self.id.clone(),
            title: self.title.clone(),
            markdown: self.markdown.clone(),
            tags: self
                .tag_ids
                .iter()
                .filter_map(|tag_id| index.get(tag_id.as_str()).map(|tag| (*tag).clone()))
                .collect(),
        }
    }
}

/// Tag-resolved note projection handed to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl Note {
    /// Returns whether any resolved tag carries `tag_id`.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }
}

/// Payload for note create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteData {
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl NoteData {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tags,
        }
    }

    fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|tag| tag.id.clone()).collect()
    }
}

/// Joins every raw note with its live tags, preserving note order.
///
/// Ids that resolve to no tag are dropped from the view; storage keeps them.
/// When `tags` holds duplicate ids the first occurrence wins.
pub fn resolve_notes(notes: &[RawNote], tags: &[Tag]) -> Vec<Note> {
    let index = tag_index(tags);
    notes.iter().map(|note| note.resolve_with(&index)).collect()
}

fn tag_index(tags: &[Tag]) -> HashMap<&str, &Tag> {
    let mut index = HashMap::with_capacity(tags.len());
    for tag in tags {
        index.entry(tag.id.as_str()).or_insert(tag);
    }
    index
}
