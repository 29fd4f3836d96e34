//! JSON file persistence for [`SettingsSnapshot`].
//!
//! The file holds a single object keyed by setting name:
//!
//! ```json
//! {
//!   "Language": "System",
//!   "ShowClock": true,
//!   "Edge": "Bottom",
//!   "TaskbarScale": 1.0
//! }
//! ```
//!
//! Saves rewrite the whole file through a sibling temp file and a rename,
//! so a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use retrobar_settings_core::SettingsSnapshot;

use super::{SettingsRepository, StorageError};

/// Settings repository backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

impl SettingsRepository for JsonFileRepository {
    fn load(&self) -> Result<Option<SettingsSnapshot>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // Editors on Windows like to prepend a byte-order mark.
        let content = content.trim_start_matches('\u{feff}');
        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(content)
            .map(Some)
            .map_err(StorageError::Parse)
    }

    fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(snapshot).map_err(StorageError::Serialize)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ── Atomic write ──────────────────────────────────────────────────────────────

/// Writes `contents` to a sibling temp file, then renames it over `path`.
///
/// On any failure the temp file is removed, so a failed save leaves the
/// directory exactly as it was.
fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    let result = write_synced(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        fs::remove_file(&tmp_path).ok();
    }
    result
}

fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use retrobar_settings_core::AppBarEdge;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retrobar_json_store_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let repo = JsonFileRepository::new("/nonexistent/path/that/cannot/exist/settings.json");
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_load_empty_file_is_none() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, "  \n").unwrap();

        // Act
        let loaded = JsonFileRepository::new(&path).load().unwrap();

        // Assert
        assert!(loaded.is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_corrupt_file_is_parse_error() {
        let dir = temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileRepository::new(&path).load();

        assert!(matches!(result, Err(StorageError::Parse(_))));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_tolerates_byte_order_mark() {
        let dir = temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, "\u{feff}{ \"AutoHide\": true }").unwrap();

        let loaded = JsonFileRepository::new(&path).load().unwrap().unwrap();

        assert!(loaded.auto_hide);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_creates_missing_directory_and_round_trips() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join("settings.json");
        let repo = JsonFileRepository::new(&path);
        let mut snapshot = SettingsSnapshot::default();
        snapshot.edge = AppBarEdge::Top;
        snapshot.quick_launch_order = vec!["x".to_string(), "x".to_string(), "a".to_string()];

        // Act
        repo.save(&snapshot).unwrap();
        let loaded = repo.load().unwrap().unwrap();

        // Assert
        assert_eq!(loaded, snapshot);
        assert!(!path.with_extension("json.tmp").exists(), "temp file must be renamed away");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, "{ \"Theme\": \"Old\", \"Garbage\": [1, 2, 3] }").unwrap();
        let repo = JsonFileRepository::new(&path);

        repo.save(&SettingsSnapshot::default()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("Garbage"), "save is a full rewrite, not a patch");
        assert!(text.contains("\"Theme\": \"Windows 95-98\""));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_into_unwritable_location_is_io_error() {
        // Arrange: the parent "directory" is a regular file
        let dir = temp_dir();
        let blocker = dir.join("blocker");
        fs::write(&blocker, "").unwrap();
        let repo = JsonFileRepository::new(blocker.join("settings.json"));

        // Act
        let result = repo.save(&SettingsSnapshot::default());

        // Assert
        assert!(matches!(result, Err(StorageError::Io { .. })));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        // Arrange: a directory occupies the settings path, so the rename fails
        let dir = temp_dir();
        let path = dir.join("settings.json");
        fs::create_dir_all(&path).unwrap();
        let repo = JsonFileRepository::new(&path);

        // Act
        let result = repo.save(&SettingsSnapshot::default());

        // Assert
        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(!path.with_extension("json.tmp").exists(), "temp file must not be left behind");
        let leftovers: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "only the blocking directory remains");
        fs::remove_dir_all(&dir).ok();
    }
}
