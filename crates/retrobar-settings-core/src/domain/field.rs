//! The shared "compare, validate, assign" protocol behind every setting.
//!
//! Every setting, whatever its type, is changed through [`apply_change`]:
//!
//! ```text
//! candidate == current ?  ──yes──►  Unchanged   (no notification, no save)
//!        │ no
//! candidate storable ?   ──no───►  Rejected    (silent, no mutation)
//!        │ yes
//! assign                 ───────►  Changed     (caller notifies + persists)
//! ```
//!
//! The function only reports what happened.  Notifying observers and saving
//! the snapshot is the orchestrating layer's job, so applying a change never
//! re-enters user code.
//!
//! # Loosely-typed candidates
//!
//! Hosts that only know a setting by name (a CLI, a UI binding) hand in a
//! [`serde_json::Value`].  [`SettingValue::decode`] turns that into a typed
//! candidate, and [`apply_raw`] feeds it through the same protocol.  An enum
//! ordinal outside the declared variants decodes to [`Decoded::OutOfRange`]
//! and is rejected exactly like an unstorable typed candidate.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::snapshot::SettingsSnapshot;

/// What a single set operation did to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The candidate differed and was stored.
    Changed,
    /// The candidate equalled the current value; nothing happened.
    Unchanged,
    /// The candidate failed validation; the field was left untouched.
    Rejected,
}

impl SetOutcome {
    /// Returns `true` only for [`SetOutcome::Changed`].
    pub fn is_changed(self) -> bool {
        matches!(self, SetOutcome::Changed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SetOutcome::Changed => "changed",
            SetOutcome::Unchanged => "unchanged",
            SetOutcome::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of decoding a JSON candidate into a setting type.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Value(T),
    /// An integer that does not name any declared enum variant.
    OutOfRange(i64),
    /// The JSON value has the wrong shape for this setting type.
    Mismatch,
}

/// Errors raised when a setting is addressed by name.
///
/// These are caller mistakes (typo in a name, wrong JSON shape).  A value
/// that is well-formed but invalid is never an error; it is a
/// [`SetOutcome::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),

    #[error("setting `{name}` expects a {expected} value")]
    TypeMismatch { name: String, expected: &'static str },
}

/// A type that can be stored in a setting slot.
pub trait SettingValue: Clone + PartialEq + fmt::Debug + Serialize {
    /// Type label used in error messages and listings.
    const TYPE_NAME: &'static str;

    /// Per-type validation hook.  Candidates returning `false` are rejected.
    fn is_storable(&self) -> bool {
        true
    }

    fn decode(raw: &Value) -> Decoded<Self>;

    fn encode(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl SettingValue for String {
    const TYPE_NAME: &'static str = "string";

    fn decode(raw: &Value) -> Decoded<Self> {
        match raw {
            Value::String(s) => Decoded::Value(s.clone()),
            _ => Decoded::Mismatch,
        }
    }
}

impl SettingValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn decode(raw: &Value) -> Decoded<Self> {
        match raw {
            Value::Bool(b) => Decoded::Value(*b),
            _ => Decoded::Mismatch,
        }
    }
}

impl SettingValue for f64 {
    const TYPE_NAME: &'static str = "number";

    /// NaN never compares equal to itself and JSON has no spelling for
    /// NaN or infinity, so only finite values are stored.
    fn is_storable(&self) -> bool {
        self.is_finite()
    }

    fn decode(raw: &Value) -> Decoded<Self> {
        match raw.as_f64() {
            Some(n) => Decoded::Value(n),
            None => Decoded::Mismatch,
        }
    }
}

impl SettingValue for Vec<String> {
    const TYPE_NAME: &'static str = "string list";

    fn decode(raw: &Value) -> Decoded<Self> {
        let Value::Array(items) = raw else {
            return Decoded::Mismatch;
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => out.push(s.clone()),
                _ => return Decoded::Mismatch,
            }
        }
        Decoded::Value(out)
    }
}

/// Compares, validates and assigns `candidate` into `slot`.
pub fn apply_change<T: SettingValue>(slot: &mut T, candidate: T) -> SetOutcome {
    if *slot == candidate {
        return SetOutcome::Unchanged;
    }
    if !candidate.is_storable() {
        return SetOutcome::Rejected;
    }
    *slot = candidate;
    SetOutcome::Changed
}

/// Decodes `raw` and applies it to `slot` through [`apply_change`].
///
/// # Errors
///
/// Returns [`FieldError::TypeMismatch`] when `raw` has the wrong JSON shape.
pub fn apply_raw<T: SettingValue>(
    name: &str,
    slot: &mut T,
    raw: &Value,
) -> Result<SetOutcome, FieldError> {
    match T::decode(raw) {
        Decoded::Value(candidate) => Ok(apply_change(slot, candidate)),
        Decoded::OutOfRange(ordinal) => {
            tracing::debug!(setting = name, ordinal, "enum ordinal outside declared variants");
            Ok(SetOutcome::Rejected)
        }
        Decoded::Mismatch => Err(FieldError::TypeMismatch {
            name: name.to_string(),
            expected: T::TYPE_NAME,
        }),
    }
}

/// Typed descriptor of one setting: its stable name plus accessors into a
/// [`SettingsSnapshot`].
///
/// Descriptors are the associated constants on `SettingsSnapshot`
/// (e.g. `SettingsSnapshot::SHOW_CLOCK`).
pub struct Field<T> {
    pub(crate) name: &'static str,
    pub(crate) get: fn(&SettingsSnapshot) -> &T,
    pub(crate) get_mut: fn(&mut SettingsSnapshot) -> &mut T,
}

impl<T> Field<T> {
    /// The on-disk key and notification name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'a>(&self, snapshot: &'a SettingsSnapshot) -> &'a T {
        (self.get)(snapshot)
    }

    pub fn get_mut<'a>(&self, snapshot: &'a mut SettingsSnapshot) -> &'a mut T {
        (self.get_mut)(snapshot)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_change_equal_value_is_unchanged() {
        // Arrange
        let mut slot = true;

        // Act
        let outcome = apply_change(&mut slot, true);

        // Assert
        assert_eq!(outcome, SetOutcome::Unchanged);
        assert!(slot);
    }

    #[test]
    fn test_apply_change_different_value_is_stored() {
        let mut slot = String::from("System");
        let outcome = apply_change(&mut slot, "en-US".to_string());
        assert_eq!(outcome, SetOutcome::Changed);
        assert_eq!(slot, "en-US");
    }

    #[test]
    fn test_apply_change_rejects_non_finite_double() {
        let mut slot = 1.0_f64;
        assert_eq!(apply_change(&mut slot, f64::NAN), SetOutcome::Rejected);
        assert_eq!(apply_change(&mut slot, f64::INFINITY), SetOutcome::Rejected);
        assert_eq!(slot, 1.0);
    }

    #[test]
    fn test_apply_change_compares_lists_by_value() {
        // Arrange: a fresh allocation with the same contents
        let mut slot = vec!["a".to_string(), "b".to_string()];
        let candidate = vec!["a".to_string(), "b".to_string()];

        // Act / Assert
        assert_eq!(apply_change(&mut slot, candidate), SetOutcome::Unchanged);
    }

    #[test]
    fn test_apply_change_list_order_matters() {
        let mut slot = vec!["a".to_string(), "b".to_string()];
        let outcome = apply_change(&mut slot, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(outcome, SetOutcome::Changed);
        assert_eq!(slot, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_apply_raw_type_mismatch_is_an_error() {
        let mut slot = false;
        let err = apply_raw("AutoHide", &mut slot, &json!("yes")).unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                name: "AutoHide".to_string(),
                expected: "boolean",
            }
        );
        assert!(!slot);
    }

    #[test]
    fn test_decode_string_list_rejects_mixed_array() {
        let decoded = <Vec<String>>::decode(&json!(["a", 1]));
        assert_eq!(decoded, Decoded::Mismatch);
    }

    #[test]
    fn test_decode_double_accepts_integers() {
        assert_eq!(f64::decode(&json!(2)), Decoded::Value(2.0));
    }

    #[test]
    fn test_set_outcome_display() {
        assert_eq!(SetOutcome::Rejected.to_string(), "rejected");
        assert!(SetOutcome::Changed.is_changed());
        assert!(!SetOutcome::Unchanged.is_changed());
    }
}
