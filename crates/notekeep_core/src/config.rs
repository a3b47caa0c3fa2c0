//! Core configuration loading.
//!
//! # Responsibility
//! - Read `CoreConfig` from an optional TOML file.
//! - Apply `NOTEKEEP_*` environment overrides on top of file values.
//!
//! # Invariants
//! - A missing config file yields defaults, not an error.
//! - Unrecognized override values are ignored and logged, never fatal.

use crate::logging::default_log_level;
use crate::service::note_store::TagDeletePolicy;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "NOTEKEEP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEKEEP_LOG_DIR";
pub const ENV_DB_PATH: &str = "NOTEKEEP_DB_PATH";
pub const ENV_TAG_DELETE_POLICY: &str = "NOTEKEEP_TAG_DELETE_POLICY";

/// Runtime configuration for the note core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite file backing the store; in-memory when unset.
    pub db_path: Option<PathBuf>,
    pub tag_delete_policy: TagDeletePolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
            tag_delete_policy: TagDeletePolicy::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Loads config from `path` (if present) and applies environment overrides.
pub fn load_config(path: &Path) -> Result<CoreConfig, ConfigError> {
    let mut config = load_config_file(path)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Loads config from `path` without consulting the environment.
pub fn load_config_file(path: &Path) -> Result<CoreConfig, ConfigError> {
    if !path.exists() {
        return Ok(CoreConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies `NOTEKEEP_*` process environment overrides.
pub fn apply_env_overrides(config: &mut CoreConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Applies overrides from an arbitrary variable lookup.
pub fn apply_overrides(config: &mut CoreConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
        config.log_level = level;
    }
    if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
        config.log_dir = Some(PathBuf::from(dir));
    }
    if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
        config.db_path = Some(PathBuf::from(path));
    }
    if let Some(raw) = non_blank(lookup(ENV_TAG_DELETE_POLICY)) {
        match TagDeletePolicy::parse(&raw) {
            Some(policy) => config.tag_delete_policy = policy,
            None => warn!(
                "event=config_override module=config status=ignored var={} reason=unknown_value",
                ENV_TAG_DELETE_POLICY
            ),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_overrides, load_config_file, ConfigError, CoreConfig, ENV_DB_PATH,
        ENV_TAG_DELETE_POLICY,
    };
    use crate::service::note_store::TagDeletePolicy;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.tag_delete_policy, TagDeletePolicy::Retain);
    }

    #[test]
    fn file_values_fill_only_listed_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "db_path = \"/tmp/notes.sqlite3\"").unwrap();
        writeln!(file, "tag_delete_policy = \"cascade\"").unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/notes.sqlite3")));
        assert_eq!(config.tag_delete_policy, TagDeletePolicy::Cascade);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, CoreConfig::default().log_level);
    }

    #[test]
    fn file_policy_accepts_env_spellings() {
        for (raw, expected) in [
            ("Cascade", TagDeletePolicy::Cascade),
            (" RETAIN ", TagDeletePolicy::Retain),
        ] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "tag_delete_policy = \"{raw}\"").unwrap();

            let config = load_config_file(file.path()).unwrap();
            assert_eq!(config.tag_delete_policy, expected, "value {raw:?}");
            assert_eq!(TagDeletePolicy::parse(raw), Some(expected));
        }
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tag_delete_policy = \"sometimes\"").unwrap();

        let err = load_config_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_replace_file_values_and_skip_unknown_policy() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, " /data/notes.sqlite3 "),
            (ENV_TAG_DELETE_POLICY, "eventually"),
        ]);
        let mut config = CoreConfig {
            tag_delete_policy: TagDeletePolicy::Cascade,
            ..CoreConfig::default()
        };

        apply_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.db_path, Some(PathBuf::from("/data/notes.sqlite3")));
        assert_eq!(config.tag_delete_policy, TagDeletePolicy::Cascade);
    }
}
