//! The observable settings facade.
//!
//! [`Settings`] owns the one live [`SettingsSnapshot`] and is the only way to
//! change it once published.  Every setter goes through the same sequence:
//!
//! ```text
//! set(field, value)
//!  └─ lock snapshot
//!      ├─ apply_change()          Unchanged / Rejected ──► return
//!      └─ Changed ──► repository.save(whole snapshot)    (failure logged)
//!  └─ unlock
//!  └─ notifier.publish(field name)
//! ```
//!
//! # Two-phase construction
//!
//! There is no "initializing" flag.  While a snapshot is being loaded or
//! prepared it is a plain [`SettingsSnapshot`] with no observers and no
//! repository attached, so nothing it does can trigger a save.
//! [`Settings::publish`] then wraps it, and only from that point on does a
//! change persist and notify.
//!
//! # Locking
//!
//! The snapshot mutex is held across apply and save, so the file always
//! holds a snapshot that existed at some instant.  Subscribers run after the
//! lock is released and may freely read or change settings.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use retrobar_settings_core::{
    AppBarEdge, ChangeNotifier, Field, FieldError, InvertIconsOption, MultiMonOption, SetOutcome,
    SettingValue, SettingsSnapshot, SubscriptionId,
};
use serde_json::Value;
use thiserror::Error;

use crate::infrastructure::storage::{load_or_default, SettingsRepository};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for facade operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A name-keyed access named no setting or carried the wrong JSON shape.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// [`crate::application::instance::install`] was called after the
    /// process-wide instance already existed.
    #[error("settings instance is already initialized")]
    AlreadyInitialized,
}

// ── Facade ────────────────────────────────────────────────────────────────────

/// A published, observable, persisted settings snapshot.
pub struct Settings {
    snapshot: Mutex<SettingsSnapshot>,
    notifier: ChangeNotifier,
    repository: Box<dyn SettingsRepository>,
    persist_failures: AtomicUsize,
}

impl Settings {
    /// Loads from `repository` (falling back to defaults) and publishes.
    pub fn open<R: SettingsRepository + 'static>(repository: R) -> Self {
        let snapshot = load_or_default(&repository);
        Self::publish(snapshot, repository)
    }

    /// Attaches persistence and change notification to a fully formed
    /// snapshot.  Publishing itself saves nothing.
    ///
    /// Fields holding values that could not be stored (a NaN scale set by
    /// direct mutation) are reset to their defaults first.
    pub fn publish<R: SettingsRepository + 'static>(
        mut snapshot: SettingsSnapshot,
        repository: R,
    ) -> Self {
        snapshot.repair();
        tracing::debug!(location = %repository.location(), "settings published");
        Self {
            snapshot: Mutex::new(snapshot),
            notifier: ChangeNotifier::new(),
            repository: Box::new(repository),
            persist_failures: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SettingsSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.lock().clone()
    }

    /// Runs `f` against the live snapshot without copying it.
    ///
    /// `f` runs while the snapshot lock is held: it must not call back into
    /// this facade (any getter or setter), or it deadlocks.
    pub fn read<R>(&self, f: impl FnOnce(&SettingsSnapshot) -> R) -> R {
        f(&self.lock())
    }

    pub fn get<T: SettingValue>(&self, field: Field<T>) -> T {
        self.lock().get(field).clone()
    }

    /// Sets one typed field, persisting and notifying if it changed.
    pub fn set<T: SettingValue>(&self, field: Field<T>, value: T) -> SetOutcome {
        let outcome = {
            let mut snapshot = self.lock();
            let outcome = snapshot.set(field, value);
            if outcome.is_changed() {
                self.persist(&snapshot);
            }
            outcome
        };
        if outcome.is_changed() {
            self.notifier.publish(field.name());
        }
        outcome
    }

    /// Reads the named setting as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Field`] for an unknown name.
    pub fn get_value(&self, name: &str) -> Result<Value, SettingsError> {
        Ok(self.lock().get_value(name)?)
    }

    /// Sets the named setting from a JSON candidate, persisting and
    /// notifying if it changed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Field`] for an unknown name or a candidate
    /// of the wrong JSON shape.  Invalid enum ordinals are not errors; they
    /// yield [`SetOutcome::Rejected`].
    pub fn set_value(&self, name: &str, raw: &Value) -> Result<SetOutcome, SettingsError> {
        let key = SettingsSnapshot::canonical_name(name)
            .ok_or_else(|| FieldError::UnknownSetting(name.to_string()))?;
        let outcome = {
            let mut snapshot = self.lock();
            let outcome = snapshot.set_value(key, raw)?;
            if outcome.is_changed() {
                self.persist(&snapshot);
            }
            outcome
        };
        if outcome.is_changed() {
            self.notifier.publish(key);
        }
        Ok(outcome)
    }

    /// Registers `callback` to receive the name of every setting that
    /// changes from now on.
    ///
    /// Subscribers that live shorter than the facade must unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Number of saves that failed since publication.
    pub fn persist_failures(&self) -> usize {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Where this facade persists to, for display.
    pub fn location(&self) -> String {
        self.repository.location()
    }

    fn persist(&self, snapshot: &SettingsSnapshot) {
        match self.repository.save(snapshot) {
            Ok(()) => tracing::trace!(location = %self.repository.location(), "settings saved"),
            Err(e) => {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    location = %self.repository.location(),
                    error = %e,
                    "failed to save settings; change kept in memory only"
                );
            }
        }
    }
}

// ── Typed accessors ───────────────────────────────────────────────────────────

macro_rules! accessors {
    ($( $getter:ident / $setter:ident : $ty:ty => $field:ident ),+ $(,)?) => {
        impl Settings {
            $(
                pub fn $getter(&self) -> $ty {
                    self.get(SettingsSnapshot::$field)
                }

                pub fn $setter(&self, value: $ty) -> SetOutcome {
                    self.set(SettingsSnapshot::$field, value)
                }
            )+
        }
    };
}

accessors! {
    language / set_language: String => LANGUAGE,
    theme / set_theme: String => THEME,
    show_input_language / set_show_input_language: bool => SHOW_INPUT_LANGUAGE,
    show_clock / set_show_clock: bool => SHOW_CLOCK,
    show_desktop_button / set_show_desktop_button: bool => SHOW_DESKTOP_BUTTON,
    peek_at_desktop / set_peek_at_desktop: bool => PEEK_AT_DESKTOP,
    show_multi_mon / set_show_multi_mon: bool => SHOW_MULTI_MON,
    show_quick_launch / set_show_quick_launch: bool => SHOW_QUICK_LAUNCH,
    quick_launch_path / set_quick_launch_path: String => QUICK_LAUNCH_PATH,
    collapse_notify_icons / set_collapse_notify_icons: bool => COLLAPSE_NOTIFY_ICONS,
    pinned_notify_icons / set_pinned_notify_icons: Vec<String> => PINNED_NOTIFY_ICONS,
    allow_font_smoothing / set_allow_font_smoothing: bool => ALLOW_FONT_SMOOTHING,
    use_software_rendering / set_use_software_rendering: bool => USE_SOFTWARE_RENDERING,
    middle_mouse_to_close / set_middle_mouse_to_close: bool => MIDDLE_MOUSE_TO_CLOSE,
    edge / set_edge: AppBarEdge => EDGE,
    quick_launch_order / set_quick_launch_order: Vec<String> => QUICK_LAUNCH_ORDER,
    show_task_thumbnails / set_show_task_thumbnails: bool => SHOW_TASK_THUMBNAILS,
    multi_mon_mode / set_multi_mon_mode: MultiMonOption => MULTI_MON_MODE,
    taskbar_scale / set_taskbar_scale: f64 => TASKBAR_SCALE,
    debug_logging / set_debug_logging: bool => DEBUG_LOGGING,
    auto_hide / set_auto_hide: bool => AUTO_HIDE,
    lock_taskbar / set_lock_taskbar: bool => LOCK_TASKBAR,
    invert_icons_mode / set_invert_icons_mode: InvertIconsOption => INVERT_ICONS_MODE,
    show_task_badges / set_show_task_badges: bool => SHOW_TASK_BADGES,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("location", &self.location())
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
