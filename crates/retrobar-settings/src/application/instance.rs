//! The process-wide settings instance.
//!
//! The first call to [`instance`] loads the default settings file and
//! publishes it; every later call returns the same facade.  The once-only
//! guard makes concurrent first access safe: exactly one thread loads, the
//! others block until the facade is published.
//!
//! Hosts that need a different store (a portable install, an in-memory
//! store in tests) call [`install`] before anything touches [`instance`].
//! Components that need settings should take a `&Settings` parameter and be
//! handed `instance()` by the host rather than reaching for it themselves.

use std::path::PathBuf;

use once_cell::sync::OnceCell;

use super::settings_facade::{Settings, SettingsError};
use crate::infrastructure::storage::{
    json_store::JsonFileRepository,
    paths::{default_settings_path, SETTINGS_FILE_NAME},
};

static INSTANCE: OnceCell<Settings> = OnceCell::new();

/// Returns the process-wide settings, loading them on first access.
pub fn instance() -> &'static Settings {
    INSTANCE.get_or_init(|| Settings::open(default_repository()))
}

/// Returns the process-wide settings only if they already exist.
pub fn try_instance() -> Option<&'static Settings> {
    INSTANCE.get()
}

/// Publishes `settings` as the process-wide instance.
///
/// # Errors
///
/// Returns [`SettingsError::AlreadyInitialized`] if an instance already
/// exists; `settings` is dropped in that case.
pub fn install(settings: Settings) -> Result<&'static Settings, SettingsError> {
    INSTANCE
        .set(settings)
        .map_err(|_| SettingsError::AlreadyInitialized)?;
    Ok(instance())
}

fn default_repository() -> JsonFileRepository {
    let path = default_settings_path().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to settings file in working directory");
        PathBuf::from(SETTINGS_FILE_NAME)
    });
    JsonFileRepository::new(path)
}
