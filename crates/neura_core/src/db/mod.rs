//! SQLite backing file for the key-value store.
//!
//! The database holds a single `kv_entries` table; the note collection lives
//! in one of its rows as a snapshot document. This module only owns the
//! table layout, never the document inside it.
//!
//! # Invariants
//! - The table layout version lives in `PRAGMA user_version` and is
//!   independent of the snapshot `schema_version`.
//! - A file whose layout is newer than this build is refused untouched.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer build.
    LayoutTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::LayoutTooNew { found, supported } => write!(
                f,
                "kv table layout v{found} is newer than this build supports (v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::LayoutTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
