//! In-process change notification.

pub mod notifier;
