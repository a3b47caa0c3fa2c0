//! In-memory key-value repository.
//!
//! Used for ephemeral sessions and tests; contents vanish on drop.

use crate::repo::kv_repo::{KeyValueRepository, RepoResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueRepository {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueRepository for MemoryKeyValueRepository {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
