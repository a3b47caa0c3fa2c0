//! Note/tag store.
//!
//! # Responsibility
//! - Own the persisted note and tag collections and their collaborators.
//! - Expose the tag-resolved note view and the note/tag mutations.
//!
//! # Invariants
//! - In-memory collections always equal the last successfully saved values.
//! - Update/delete of an unknown id is a no-op, never an error.
//! - With `TagDeletePolicy::Retain`, deleting a tag never touches notes;
//!   stale ids stay in storage and are dropped from the resolved view.
//! - Only persistence failures surface as `StoreError`.

use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory};
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::model::note::{resolve_notes, Note, NoteData, NoteId, RawNote};
use crate::model::tag::Tag;
use crate::repo::kv_repo::{KeyValueRepository, RepoError, SqliteKeyValueRepository};
use crate::search::filter::NoteFilter;
use log::{debug, error, info};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key for the raw note collection.
pub const NOTES_KEY: &str = "NOTES";
/// Storage key for the tag collection.
pub const TAGS_KEY: &str = "TAGS";

/// What happens to note tag references when a tag is deleted.
///
/// Deserializes with the same rules as [`TagDeletePolicy::parse`], so config
/// files and environment overrides accept the same spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagDeletePolicy {
    /// Keep stale ids in notes; the resolved view hides them.
    #[default]
    Retain,
    /// Strip the deleted id from every note in the same operation.
    Cascade,
}

impl TagDeletePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Cascade => "cascade",
        }
    }

    /// Parses a policy name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retain" => Some(Self::Retain),
            "cascade" => Some(Self::Cascade),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for TagDeletePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| de::Error::unknown_variant(raw.trim(), &["retain", "cascade"]))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error. Domain misses are not errors.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "note store persistence failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Single owner of the note and tag collections.
///
/// Every mutation computes the next collection, saves it, and only then
/// replaces the in-memory copy, so a failed save leaves the store unchanged.
pub struct NoteStore<R: KeyValueRepository, G: IdGenerator> {
    repo: R,
    ids: G,
    notes: Vec<RawNote>,
    tags: Vec<Tag>,
    tag_delete_policy: TagDeletePolicy,
}

impl<R: KeyValueRepository, G: IdGenerator> NoteStore<R, G> {
    /// Loads both collections with the default tag delete policy.
    pub fn open(repo: R, ids: G) -> StoreResult<Self> {
        Self::with_policy(repo, ids, TagDeletePolicy::default())
    }

    /// Loads both collections, seeding empty ones on first use.
    pub fn with_policy(
        mut repo: R,
        ids: G,
        tag_delete_policy: TagDeletePolicy,
    ) -> StoreResult<Self> {
        let notes: Vec<RawNote> = repo.load(NOTES_KEY, Vec::new())?;
        let tags: Vec<Tag> = repo.load(TAGS_KEY, Vec::new())?;
        info!(
            "event=store_open module=store status=ok note_count={} tag_count={} tag_delete_policy={}",
            notes.len(),
            tags.len(),
            tag_delete_policy.as_str()
        );
        Ok(Self {
            repo,
            ids,
            notes,
            tags,
            tag_delete_policy,
        })
    }

    pub fn tag_delete_policy(&self) -> TagDeletePolicy {
        self.tag_delete_policy
    }

    /// Persisted notes, including any stale tag ids.
    pub fn raw_notes(&self) -> &[RawNote] {
        &self.notes
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Notes joined with their live tags, in creation order.
    pub fn resolved_notes(&self) -> Vec<Note> {
        resolve_notes(&self.notes, &self.tags)
    }

    /// Resolves a single note; `None` when the id is unknown.
    pub fn get_note(&self, id: &str) -> Option<Note> {
        self.notes
            .iter()
            .find(|note| note.id == id)
            .map(|note| note.resolve(&self.tags))
    }

    /// Resolved notes narrowed by `filter`, in creation order.
    pub fn filtered_notes(&self, filter: &NoteFilter) -> Vec<Note> {
        if filter.is_empty() {
            return self.resolved_notes();
        }
        self.resolved_notes()
            .into_iter()
            .filter(|note| filter.matches(note))
            .collect()
    }

    /// Appends a note with a fresh id and returns that id.
    pub fn create_note(&mut self, data: &NoteData) -> StoreResult<NoteId> {
        let id = self.ids.new_id();
        let mut next = self.notes.clone();
        next.push(RawNote::from_data(id.clone(), data));
        self.commit_notes(next)?;
        info!(
            "event=note_create module=store status=ok note_count={} tag_ref_count={}",
            self.notes.len(),
            data.tags.len()
        );
        Ok(id)
    }

    /// Replaces title, markdown and tags of note `id`, keeping its id.
    pub fn update_note(&mut self, id: &str, data: &NoteData) -> StoreResult<()> {
        let mut matched = false;
        let next = self
            .notes
            .iter()
            .map(|note| {
                if note.id == id {
                    matched = true;
                    let mut updated = note.clone();
                    updated.apply(data);
                    updated
                } else {
                    note.clone()
                }
            })
            .collect();
        self.commit_notes(next)?;
        info!(
            "event=note_update module=store status={} tag_ref_count={}",
            outcome(matched),
            data.tags.len()
        );
        Ok(())
    }

    pub fn delete_note(&mut self, id: &str) -> StoreResult<()> {
        let before = self.notes.len();
        let next: Vec<RawNote> = self
            .notes
            .iter()
            .filter(|note| note.id != id)
            .cloned()
            .collect();
        let matched = next.len() != before;
        self.commit_notes(next)?;
        info!(
            "event=note_delete module=store status={} note_count={}",
            outcome(matched),
            self.notes.len()
        );
        Ok(())
    }

    /// Appends a caller-built tag. Ids are not checked for duplicates.
    pub fn add_tag(&mut self, tag: Tag) -> StoreResult<()> {
        let mut next = self.tags.clone();
        next.push(tag);
        self.commit_tags(next)?;
        info!(
            "event=tag_add module=store status=ok tag_count={}",
            self.tags.len()
        );
        Ok(())
    }

    /// Builds a tag with a fresh id, appends it, and returns it.
    pub fn create_tag(&mut self, label: impl Into<String>) -> StoreResult<Tag> {
        let tag = Tag::new(self.ids.new_id(), label);
        self.add_tag(tag.clone())?;
        Ok(tag)
    }

    pub fn update_tag_label(&mut self, id: &str, label: impl Into<String>) -> StoreResult<()> {
        let label = label.into();
        let mut matched = false;
        let next = self
            .tags
            .iter()
            .map(|tag| {
                if tag.id == id {
                    matched = true;
                    Tag::new(tag.id.clone(), label.clone())
                } else {
                    tag.clone()
                }
            })
            .collect();
        self.commit_tags(next)?;
        info!("event=tag_update module=store status={}", outcome(matched));
        Ok(())
    }

    /// Removes tag `id`; note references follow the configured policy.
    ///
    /// Under `Cascade` both collections are written. When the note write
    /// fails, the previous tags are written back and memory is untouched.
    pub fn delete_tag(&mut self, id: &str) -> StoreResult<()> {
        let before = self.tags.len();
        let next_tags: Vec<Tag> = self
            .tags
            .iter()
            .filter(|tag| tag.id != id)
            .cloned()
            .collect();
        let matched = next_tags.len() != before;

        let mut stripped = 0;
        let mut next_notes = None;
        if self.tag_delete_policy == TagDeletePolicy::Cascade {
            let mut notes = self.notes.clone();
            for note in &mut notes {
                let len = note.tag_ids.len();
                note.tag_ids.retain(|tag_id| tag_id != id);
                stripped += len - note.tag_ids.len();
            }
            if stripped > 0 {
                next_notes = Some(notes);
            }
        }

        self.repo.save(TAGS_KEY, &next_tags)?;
        if let Some(notes) = next_notes.as_ref() {
            if let Err(err) = self.repo.save(NOTES_KEY, notes) {
                if let Err(restore_err) = self.repo.save(TAGS_KEY, &self.tags) {
                    error!(
                        "event=tag_delete module=store status=error error_code=tag_restore_failed error={}",
                        restore_err
                    );
                }
                return Err(err.into());
            }
        }

        self.tags = next_tags;
        if let Some(notes) = next_notes {
            self.notes = notes;
        }
        info!(
            "event=tag_delete module=store status={} policy={} stripped_refs={}",
            outcome(matched),
            self.tag_delete_policy.as_str(),
            stripped
        );
        Ok(())
    }

    /// Removes tag ids that resolve to no tag from every note.
    ///
    /// Returns the number of ids removed. Notes are only saved when at least
    /// one id was removed.
    pub fn prune_dangling_tag_ids(&mut self) -> StoreResult<usize> {
        let live: HashSet<&str> = self.tags.iter().map(|tag| tag.id.as_str()).collect();
        let mut next = self.notes.clone();
        let mut removed = 0;
        for note in &mut next {
            let len = note.tag_ids.len();
            note.tag_ids.retain(|tag_id| live.contains(tag_id.as_str()));
            removed += len - note.tag_ids.len();
        }

        if removed > 0 {
            self.commit_notes(next)?;
        }
        info!(
            "event=tag_prune module=store status=ok removed_refs={}",
            removed
        );
        Ok(removed)
    }

    /// Releases the underlying repository.
    pub fn into_repository(self) -> R {
        self.repo
    }

    fn commit_notes(&mut self, next: Vec<RawNote>) -> StoreResult<()> {
        self.repo.save(NOTES_KEY, &next)?;
        debug!(
            "event=store_save module=store key={} len={}",
            NOTES_KEY,
            next.len()
        );
        self.notes = next;
        Ok(())
    }

    fn commit_tags(&mut self, next: Vec<Tag>) -> StoreResult<()> {
        self.repo.save(TAGS_KEY, &next)?;
        debug!(
            "event=store_save module=store key={} len={}",
            TAGS_KEY,
            next.len()
        );
        self.tags = next;
        Ok(())
    }
}

impl NoteStore<SqliteKeyValueRepository, UuidIdGenerator> {
    /// Opens the SQLite-backed store described by `config`.
    ///
    /// Uses `config.db_path` when set and an in-memory database otherwise.
    pub fn open_configured(config: &CoreConfig) -> StoreResult<Self> {
        let conn = match config.db_path.as_ref() {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
        .map_err(RepoError::from)?;
        let repo = SqliteKeyValueRepository::try_new(conn)?;
        Self::with_policy(repo, UuidIdGenerator, config.tag_delete_policy)
    }
}

fn outcome(matched: bool) -> &'static str {
    if matched {
        "ok"
    } else {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteStore, StoreError, TagDeletePolicy, NOTES_KEY, TAGS_KEY};
    use crate::id::SequentialIdGenerator;
    use crate::model::note::{NoteData, RawNote};
    use crate::model::tag::Tag;
    use crate::repo::kv_repo::{KeyValueRepository, RepoError, RepoResult};
    use crate::repo::memory_repo::MemoryKeyValueRepository;

    /// Accepts reads; rejects writes to `rejected_key` and every write after
    /// the first `allowed` ones.
    struct FlakyRepo {
        inner: MemoryKeyValueRepository,
        allowed: usize,
        rejected_key: Option<&'static str>,
    }

    impl FlakyRepo {
        fn new(allowed: usize) -> Self {
            Self {
                inner: MemoryKeyValueRepository::new(),
                allowed,
                rejected_key: None,
            }
        }
    }

    impl KeyValueRepository for FlakyRepo {
        fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
            self.inner.load_raw(key)
        }

        fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()> {
            if self.allowed == 0 || self.rejected_key == Some(key) {
                return Err(RepoError::MissingRequiredTable("kv_entries"));
            }
            self.allowed -= 1;
            self.inner.save_raw(key, value)
        }
    }

    #[test]
    fn policy_parse_accepts_known_names() {
        assert_eq!(TagDeletePolicy::parse(" Cascade "), Some(TagDeletePolicy::Cascade));
        assert_eq!(TagDeletePolicy::parse("retain"), Some(TagDeletePolicy::Retain));
        assert_eq!(TagDeletePolicy::parse("purge"), None);
    }

    #[test]
    fn failed_save_leaves_memory_unchanged() {
        // Two writes seed NOTES and TAGS on open; the third is rejected.
        let repo = FlakyRepo::new(2);
        let mut store = NoteStore::open(repo, SequentialIdGenerator::new("n")).unwrap();

        let err = store
            .create_note(&NoteData::new("t", "m", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Repo(_)));
        assert!(store.raw_notes().is_empty());

        let repo = store.into_repository();
        assert_eq!(repo.inner.load_raw(NOTES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn cascade_delete_tag_rolls_back_when_note_write_fails() {
        let mut store = NoteStore::with_policy(
            FlakyRepo::new(usize::MAX),
            SequentialIdGenerator::new("n"),
            TagDeletePolicy::Cascade,
        )
        .unwrap();
        store.add_tag(Tag::new("t1", "work")).unwrap();
        let note_id = store
            .create_note(&NoteData::new("t", "m", vec![Tag::new("t1", "work")]))
            .unwrap();

        store.repo.rejected_key = Some(NOTES_KEY);
        let err = store.delete_tag("t1").unwrap_err();
        assert!(matches!(err, StoreError::Repo(_)));

        assert_eq!(store.tags(), &[Tag::new("t1", "work")]);
        assert_eq!(store.raw_notes()[0].tag_ids, vec!["t1".to_string()]);
        assert_eq!(store.get_note(&note_id).unwrap().tags.len(), 1);

        let repo = store.into_repository();
        let stored_tags: Vec<Tag> =
            serde_json::from_str(&repo.inner.load_raw(TAGS_KEY).unwrap().unwrap()).unwrap();
        let stored_notes: Vec<RawNote> =
            serde_json::from_str(&repo.inner.load_raw(NOTES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored_tags, vec![Tag::new("t1", "work")]);
        assert_eq!(stored_notes[0].tag_ids, vec!["t1".to_string()]);
    }
}
