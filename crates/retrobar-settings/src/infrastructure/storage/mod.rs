//! Storage infrastructure: settings file persistence.
//!
//! The facade talks to storage only through [`SettingsRepository`]:
//!
//! - [`json_store::JsonFileRepository`] – the production store, one JSON
//!   file written atomically on every save.
//! - [`memory::InMemoryRepository`] – keeps the last saved snapshot in
//!   memory and counts saves; used by tests and by hosts that do not want
//!   anything written to disk.
//!
//! [`load_or_default`] is the fail-soft entry point used at startup: a
//! missing, empty, unreadable or corrupt store always yields a usable
//! snapshot.

use std::path::PathBuf;

use retrobar_settings_core::SettingsSnapshot;
use thiserror::Error;

pub mod json_store;
pub mod memory;
pub mod paths;

/// Error type for settings storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The per-user configuration directory could not be determined.
    #[error("could not determine per-user configuration directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored JSON could not be parsed.
    #[error("failed to parse settings JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The snapshot could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A test double was told to fail.
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Loads and saves whole [`SettingsSnapshot`]s.
pub trait SettingsRepository: Send + Sync {
    /// Reads the stored snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet (missing or
    /// empty file).
    fn load(&self) -> Result<Option<SettingsSnapshot>, StorageError>;

    /// Overwrites the store with the full `snapshot`.
    fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), StorageError>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}

/// Loads a snapshot from `repository`, falling back to defaults.
///
/// Never fails: a missing store is logged at info level, an unreadable or
/// corrupt one at warn level.
pub fn load_or_default(repository: &dyn SettingsRepository) -> SettingsSnapshot {
    match repository.load() {
        Ok(Some(snapshot)) => {
            tracing::info!(location = %repository.location(), "loaded settings");
            snapshot
        }
        Ok(None) => {
            tracing::info!(location = %repository.location(), "no stored settings; using defaults");
            SettingsSnapshot::default()
        }
        Err(e) => {
            tracing::warn!(location = %repository.location(), error = %e, "cannot load settings; using defaults");
            SettingsSnapshot::default()
        }
    }
}
