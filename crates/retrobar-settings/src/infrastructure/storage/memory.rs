//! In-memory settings repository.
//!
//! Keeps the last saved snapshot and counts saves.  Clones share state, so
//! a test can hand one clone to the facade and inspect the other.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use retrobar_settings_core::SettingsSnapshot;

use super::{SettingsRepository, StorageError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    stored: Arc<Mutex<Option<SettingsSnapshot>>>,
    save_count: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl InMemoryRepository {
    /// Creates an empty repository (loads as "nothing stored").
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that loads `snapshot`.
    pub fn with_snapshot(snapshot: SettingsSnapshot) -> Self {
        let repo = Self::new();
        *repo.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        repo
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// The most recently saved (or seeded) snapshot.
    pub fn stored(&self) -> Option<SettingsSnapshot> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// While failing, every load and save returns [`StorageError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory store set to fail".to_string()));
        }
        Ok(())
    }
}

impl SettingsRepository for InMemoryRepository {
    fn load(&self) -> Result<Option<SettingsSnapshot>, StorageError> {
        self.check_available()?;
        Ok(self.stored())
    }

    fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), StorageError> {
        self.check_available()?;
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
