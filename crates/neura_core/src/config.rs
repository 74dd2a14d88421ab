//! Store configuration and environment overrides.
//!
//! # Responsibility
//! - Hold the knobs the note store needs: database path, storage key and
//!   search scope.
//! - Resolve overrides from `NEURA_*` environment variables.
//!
//! # Invariants
//! - The storage key is never blank.
//! - Unset or blank environment variables fall back to defaults.

use crate::search::filter::{SearchScope, UnknownSearchScope};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Key holding the serialized collection.
pub const DEFAULT_STORAGE_KEY: &str = "neura.notes";
/// File name used when no database path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "neura_notes.sqlite3";

pub const ENV_DB_PATH: &str = "NEURA_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "NEURA_STORAGE_KEY";
pub const ENV_SEARCH_SCOPE: &str = "NEURA_SEARCH_SCOPE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorageKey,
    InvalidSearchScope(UnknownSearchScope),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorageKey => write!(f, "storage key must not be blank"),
            Self::InvalidSearchScope(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSearchScope(err) => Some(err),
            Self::EmptyStorageKey => None,
        }
    }
}

/// Runtime configuration for a note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,
    /// Key under which the snapshot document is stored.
    pub storage_key: String,
    /// Participation of non-text notes in `filter`.
    pub search_scope: SearchScope,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            search_scope: SearchScope::default(),
        }
    }
}

impl StoreConfig {
    /// Builds a config from defaults plus `NEURA_*` environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = non_blank(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        if let Some(scope) = non_blank(ENV_SEARCH_SCOPE) {
            config.search_scope = scope
                .parse::<SearchScope>()
                .map_err(ConfigError::InvalidSearchScope)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }
}
