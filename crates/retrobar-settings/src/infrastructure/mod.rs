//! Infrastructure layer: file-system facing adapters.
//!
//! **Dependency rule**: this layer may depend on `retrobar_settings_core`,
//! but MUST NOT import from `application`.

pub mod storage;
