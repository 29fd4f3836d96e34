//! # retrobar-settings-core
//!
//! Domain pieces of the RetroBar settings store, with no file-system or OS
//! dependencies:
//!
//! - **`domain`** – The settings snapshot, its option enums, and the one
//!   generic "compare, validate, assign" protocol every field goes through.
//! - **`events`** – [`ChangeNotifier`], a synchronous multi-subscriber
//!   channel carrying the name of each setting that actually changed.
//!
//! Persistence and the process-wide facade live in the `retrobar-settings`
//! crate.

pub mod domain;
pub mod events;

pub use domain::field::{apply_change, apply_raw, Decoded, Field, FieldError, SetOutcome, SettingValue};
pub use domain::options::{AppBarEdge, InvertIconsOption, MultiMonOption, SettingEnum};
pub use domain::snapshot::SettingsSnapshot;
pub use events::notifier::{ChangeNotifier, SubscriptionId};
