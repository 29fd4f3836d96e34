//! retrobar-settings library entry point.
//!
//! An in-process, observable settings store: one [`SettingsSnapshot`] loaded
//! from a JSON file, changed only through typed or name-keyed setters, saved
//! in full after every real change, with synchronous change notification.
//!
//! ```no_run
//! use retrobar_settings::{instance, SetOutcome};
//!
//! let settings = instance();
//! let id = settings.subscribe(|name| println!("{name} changed"));
//! assert_eq!(settings.set_auto_hide(true), SetOutcome::Changed);
//! settings.unsubscribe(id);
//! ```

pub mod application;
pub mod infrastructure;

pub use application::instance::{install, instance, try_instance};
pub use application::settings_facade::{Settings, SettingsError};
pub use infrastructure::storage::{
    json_store::JsonFileRepository, load_or_default, memory::InMemoryRepository,
    paths::resolve_config_path, SettingsRepository, StorageError,
};
pub use retrobar_settings_core::{
    AppBarEdge, Field, FieldError, InvertIconsOption, MultiMonOption, SetOutcome, SettingEnum,
    SettingValue, SettingsSnapshot, SubscriptionId,
};
