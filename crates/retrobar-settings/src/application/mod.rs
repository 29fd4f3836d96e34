//! Application layer: the settings facade and its process-wide instance.
//!
//! - **`settings_facade`** – [`settings_facade::Settings`], which routes every
//!   change through the set protocol, saves the whole snapshot, then
//!   notifies subscribers.
//! - **`instance`** – Lazy, once-only construction of the facade shared by
//!   the whole process.

pub mod instance;
pub mod settings_facade;
