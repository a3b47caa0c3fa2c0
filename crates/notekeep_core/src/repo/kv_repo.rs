//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed `load`/`save` over raw JSON text entries.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - One row per key in `kv_entries`; `save` overwrites in place.
//! - A stored value that does not decode into the requested type is
//!   reported as `RepoError::Decode`, never replaced silently.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-boundary error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode {
        key: String,
        source: serde_json::Error,
    },
    Decode {
        key: String,
        source: serde_json::Error,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { key, source } => {
                write!(f, "failed to encode value for `{key}`: {source}")
            }
            Self::Decode { key, source } => {
                write!(f, "stored value for `{key}` is not decodable: {source}")
            }
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed store of JSON values.
///
/// Implementors only provide raw text access; typed access is derived.
pub trait KeyValueRepository {
    /// Returns the raw stored text for `key`, if any.
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>>;
    /// Stores raw text under `key`, replacing any previous value.
    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()>;

    /// Loads and decodes the value under `key`.
    ///
    /// When the key is absent, `default` is written and returned.
    fn load<T>(&mut self, key: &str, default: T) -> RepoResult<T>
    where
        Self: Sized,
        T: Serialize + DeserializeOwned,
    {
        match self.load_raw(key)? {
            Some(text) => serde_json::from_str(&text).map_err(|source| RepoError::Decode {
                key: key.to_string(),
                source,
            }),
            None => {
                self.save(key, &default)?;
                Ok(default)
            }
        }
    }

    /// Encodes `value` as JSON and stores it under `key`.
    fn save<T>(&mut self, key: &str, value: &T) -> RepoResult<()>
    where
        Self: Sized,
        T: Serialize + ?Sized,
    {
        let text = serde_json::to_string(value).map_err(|source| RepoError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.save_raw(key, &text)
    }
}

/// SQLite-backed key-value repository.
pub struct SqliteKeyValueRepository {
    conn: Connection,
}

impl SqliteKeyValueRepository {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `kv_entries` is absent, which means the
    ///   connection was not opened through `db::open_db*`.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        if !table_exists(&conn, "kv_entries")? {
            return Err(RepoError::MissingRequiredTable("kv_entries"));
        }
        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl KeyValueRepository for SqliteKeyValueRepository {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
