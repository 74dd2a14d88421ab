//! Key-value storage contracts and implementations.
//!
//! # Responsibility
//! - Define the `get`/`set` contract the note store persists through.
//! - Provide a SQLite-backed implementation and an in-memory one.
//!
//! # Invariants
//! - `set` replaces the whole value for a key in one atomic statement.
//! - `get` of an unknown key is `Ok(None)`, never an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer error for key-value reads and writes.
#[derive(Debug)]
pub enum StorageError {
    /// Reading a key failed.
    Read { key: String, message: String },
    /// Writing a key failed.
    Write { key: String, message: String },
    /// Writing was withheld so a document this build cannot read survives.
    WriteBlocked { key: String, reason: String },
    /// Connection bootstrap or migration failure.
    Db(DbError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { key, message } => write!(f, "failed to read key `{key}`: {message}"),
            Self::Write { key, message } => write!(f, "failed to write key `{key}`: {message}"),
            Self::WriteBlocked { key, reason } => {
                write!(f, "refusing to overwrite key `{key}`: {reason}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage is not migrated: missing table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "storage is not migrated: missing column `{table}.{column}`"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Durable string storage addressed by key.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

/// SQLite-backed key-value store over the `kv_entries` table.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// Rejects connections whose schema lacks the key-value table.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        ensure_kv_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Read access for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| StorageError::Read {
                key: key.to_string(),
                message: err.to_string(),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                message: err.to_string(),
            })
    }
}

/// Process-local store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn ensure_kv_connection_ready(conn: &Connection) -> StorageResult<()> {
    if !table_exists(conn, "kv_entries")? {
        return Err(StorageError::MissingRequiredTable("kv_entries"));
    }

    for column in ["key", "value", "updated_at"] {
        if !table_has_column(conn, "kv_entries", column)? {
            return Err(StorageError::MissingRequiredColumn {
                table: "kv_entries",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .map_err(|err| StorageError::Db(DbError::Sqlite(err)))?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StorageResult<bool> {
    let columns = (|| -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(1)?);
        }
        Ok(names)
    })()
    .map_err(|err| StorageError::Db(DbError::Sqlite(err)))?;
    Ok(columns.iter().any(|current| current == column))
}
