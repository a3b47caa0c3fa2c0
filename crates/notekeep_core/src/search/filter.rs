//! Title/tag filters over resolved notes.
//!
//! # Invariants
//! - Filters never reorder their input.
//! - An empty filter matches everything.
//! - Title and label matching is case-insensitive substring matching on the
//!   trimmed query.

use crate::model::note::Note;
use crate::model::tag::{Tag, TagId};

/// Browse criteria for the note list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Title substring; blank means no title constraint.
    pub title: String,
    /// Every listed tag must be attached to a matching note.
    pub tag_ids: Vec<TagId>,
}

impl NoteFilter {
    pub fn new(title: impl Into<String>, tag_ids: Vec<TagId>) -> Self {
        Self {
            title: title.into(),
            tag_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.tag_ids.is_empty()
    }

    /// Returns whether `note` satisfies both the title and tag constraints.
    pub fn matches(&self, note: &Note) -> bool {
        contains_ignore_case(&note.title, &self.title)
            && self.tag_ids.iter().all(|tag_id| note.has_tag(tag_id))
    }
}

/// Returns the notes matching `filter`, in input order.
pub fn filter_notes<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    filter: &NoteFilter,
) -> Vec<&'a Note> {
    notes.into_iter().filter(|note| filter.matches(note)).collect()
}

/// Returns the tags whose label contains `query`, in input order.
pub fn filter_tags<'a>(tags: &'a [Tag], query: &str) -> Vec<&'a Tag> {
    tags.iter()
        .filter(|tag| contains_ignore_case(&tag.label, query))
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{contains_ignore_case, filter_tags, NoteFilter};
    use crate::model::tag::Tag;

    #[test]
    fn blank_query_matches_anything() {
        assert!(contains_ignore_case("anything", "   "));
        assert!(NoteFilter::new(" ", Vec::new()).is_empty());
    }

    #[test]
    fn substring_match_ignores_case() {
        assert!(contains_ignore_case("Weekly Review", "REVIEW"));
        assert!(!contains_ignore_case("Weekly Review", "daily"));
    }

    #[test]
    fn filter_tags_keeps_input_order() {
        let tags = vec![
            Tag::new("1", "Work"),
            Tag::new("2", "Home"),
            Tag::new("3", "Homework"),
        ];
        let labels: Vec<&str> = filter_tags(&tags, "work")
            .into_iter()
            .map(|tag| tag.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Work", "Homework"]);
    }
}
