//! Per-user settings location.
//!
//! | Platform | Directory                                   |
//! |----------|---------------------------------------------|
//! | Windows  | `%LOCALAPPDATA%\RetroBar`                   |
//! | Linux    | `$XDG_CONFIG_HOME/RetroBar` (`~/.config`)   |
//! | macOS    | `~/Library/Application Support/RetroBar`    |
//!
//! Setting `RETROBAR_SETTINGS_DIR` overrides the directory on every
//! platform (portable installs, tests).

use std::path::PathBuf;

use directories::BaseDirs;

use super::StorageError;

/// File name of the persisted settings snapshot.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Environment variable that overrides the settings directory.
pub const SETTINGS_DIR_ENV: &str = "RETROBAR_SETTINGS_DIR";

const APP_DIR_NAME: &str = "RetroBar";

/// Determines the directory settings files live in.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when no override is set and
/// the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    if let Some(dir) = std::env::var_os(SETTINGS_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    BaseDirs::new()
        .map(|dirs| dirs.config_local_dir().join(APP_DIR_NAME))
        .ok_or(StorageError::NoPlatformConfigDir)
}

/// Maps a file name to its location in the per-user settings directory.
///
/// # Errors
///
/// See [`config_dir`].
pub fn resolve_config_path(name: &str) -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join(name))
}

/// Full path of the default settings file.
///
/// # Errors
///
/// See [`config_dir`].
pub fn default_settings_path() -> Result<PathBuf, StorageError> {
    resolve_config_path(SETTINGS_FILE_NAME)
}
