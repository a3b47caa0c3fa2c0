//! Core domain logic for notekeep.
//! Owns note/tag normalization and its persistence through a local
//! key-value store.

pub mod config;
pub mod db;
pub mod id;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{load_config, ConfigError, CoreConfig};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::note::{resolve_notes, Note, NoteData, NoteId, RawNote};
pub use model::tag::{Tag, TagId};
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository};
pub use repo::memory_repo::MemoryKeyValueRepository;
pub use search::filter::{filter_notes, filter_tags, NoteFilter};
pub use service::note_store::{
    NoteStore, StoreError, StoreResult, TagDeletePolicy, NOTES_KEY, TAGS_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
