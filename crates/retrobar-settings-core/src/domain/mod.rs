//! Domain layer: settings data and the set protocol.
//!
//! Nothing here touches the file system or knows about observers.
//!
//! - **`field`**    – [`field::SettingValue`], the generic
//!   [`field::apply_change`] protocol, and typed [`field::Field`] descriptors.
//! - **`options`**  – Closed, integer-backed option enums with bounds-checked
//!   ordinal decoding.
//! - **`snapshot`** – [`snapshot::SettingsSnapshot`], the complete set of
//!   settings as persisted.

pub mod field;
pub mod options;
pub mod snapshot;
