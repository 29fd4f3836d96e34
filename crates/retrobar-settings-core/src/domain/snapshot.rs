//! The full set of RetroBar settings at one instant.
//!
//! [`SettingsSnapshot`] is exactly what is (de)serialized to the settings
//! file.  Keys are the PascalCase field names (`ShowClock`, `TaskbarScale`,
//! ...), absent keys take their default, unknown keys are ignored.
//!
//! Every field is also reachable two other ways:
//!
//! - **Typed**: an associated [`Field`] constant such as
//!   `SettingsSnapshot::SHOW_CLOCK`, used with [`SettingsSnapshot::set`].
//! - **By name**: [`SettingsSnapshot::set_value`] / [`SettingsSnapshot::get_value`]
//!   with a JSON value, for hosts that only know the setting's name.
//!
//! Both paths run the same protocol from [`super::field`].
//!
//! A snapshot on its own has no observers and no persistence: mutating it
//! directly is how the initializing phase works before the snapshot is
//! published behind the settings facade.  Direct mutation skips validation,
//! so [`SettingsSnapshot::repair`] resets any value that could not be
//! stored before the snapshot is published.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::field::{apply_change, apply_raw, Decoded, Field, FieldError, SetOutcome, SettingValue};
use super::options::{AppBarEdge, InvertIconsOption, MultiMonOption};

// ── Snapshot schema ───────────────────────────────────────────────────────────

/// Notification-area icons pinned out of the overflow by default
/// (volume, network, power, and action center).
const DEFAULT_PINNED_NOTIFY_ICONS: [&str; 4] = [
    "7820ae76-23e3-4229-82c1-e41cb67d5b9c",
    "7820ae75-23e3-4229-82c1-e41cb67d5b9c",
    "7820ae74-23e3-4229-82c1-e41cb67d5b9c",
    "7820ae73-23e3-4229-82c1-e41cb67d5b9c",
];

const DEFAULT_TASKBAR_SCALE: f64 = 1.0;

const DEFAULT_QUICK_LAUNCH_PATH: &str =
    "%appdata%\\Microsoft\\Internet Explorer\\Quick Launch\\User Pinned\\TaskBar";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SettingsSnapshot {
    /// UI language tag, or `"System"` to follow the OS.
    pub language: String,
    /// Name of the active theme.
    pub theme: String,
    pub show_input_language: bool,
    pub show_clock: bool,
    pub show_desktop_button: bool,
    pub peek_at_desktop: bool,
    pub show_multi_mon: bool,
    pub show_quick_launch: bool,
    /// Folder enumerated for Quick Launch; may contain `%VAR%` references.
    pub quick_launch_path: String,
    pub collapse_notify_icons: bool,
    /// Notification icon GUIDs kept visible when icons are collapsed.
    pub pinned_notify_icons: Vec<String>,
    pub allow_font_smoothing: bool,
    pub use_software_rendering: bool,
    pub middle_mouse_to_close: bool,
    #[serde(deserialize_with = "lenient_enum")]
    pub edge: AppBarEdge,
    /// User ordering of Quick Launch items.  Order and duplicates are kept.
    pub quick_launch_order: Vec<String>,
    pub show_task_thumbnails: bool,
    #[serde(deserialize_with = "lenient_enum")]
    pub multi_mon_mode: MultiMonOption,
    #[serde(deserialize_with = "lenient_scale")]
    pub taskbar_scale: f64,
    pub debug_logging: bool,
    pub auto_hide: bool,
    pub lock_taskbar: bool,
    #[serde(deserialize_with = "lenient_enum")]
    pub invert_icons_mode: InvertIconsOption,
    pub show_task_badges: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            language: "System".to_string(),
            theme: "Windows 95-98".to_string(),
            show_input_language: false,
            show_clock: true,
            show_desktop_button: false,
            peek_at_desktop: false,
            show_multi_mon: false,
            show_quick_launch: true,
            quick_launch_path: DEFAULT_QUICK_LAUNCH_PATH.to_string(),
            collapse_notify_icons: false,
            pinned_notify_icons: DEFAULT_PINNED_NOTIFY_ICONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allow_font_smoothing: false,
            use_software_rendering: false,
            middle_mouse_to_close: false,
            edge: AppBarEdge::Bottom,
            quick_launch_order: Vec::new(),
            show_task_thumbnails: false,
            multi_mon_mode: MultiMonOption::AllTaskbars,
            taskbar_scale: DEFAULT_TASKBAR_SCALE,
            debug_logging: false,
            auto_hide: false,
            lock_taskbar: false,
            invert_icons_mode: InvertIconsOption::WhenNeededByTheme,
            show_task_badges: true,
        }
    }
}

// ── Lenient loading ───────────────────────────────────────────────────────────

/// Stored enum values that are unknown, negative or out of range keep the
/// field's default instead of failing the whole file.
fn lenient_enum<'de, D, E>(deserializer: D) -> Result<E, D::Error>
where
    D: Deserializer<'de>,
    E: SettingValue + Default,
{
    let raw = Value::deserialize(deserializer)?;
    match E::decode(&raw) {
        Decoded::Value(v) => Ok(v),
        Decoded::OutOfRange(_) | Decoded::Mismatch => {
            tracing::warn!(value = %raw, expected = E::TYPE_NAME, "ignoring invalid stored value");
            Ok(E::default())
        }
    }
}

/// A stored scale that is `null`, not a number, or not finite falls back to
/// the default; the rest of the file still loads.
fn lenient_scale<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match f64::decode(&raw) {
        Decoded::Value(v) if v.is_storable() => Ok(v),
        _ => {
            tracing::warn!(value = %raw, "ignoring invalid stored taskbar scale");
            Ok(DEFAULT_TASKBAR_SCALE)
        }
    }
}

// ── Field table ───────────────────────────────────────────────────────────────

/// Name-keyed accessors for one field.
struct FieldEntry {
    name: &'static str,
    type_name: &'static str,
    read: fn(&SettingsSnapshot) -> Value,
    write: fn(&mut SettingsSnapshot, &Value) -> Result<SetOutcome, FieldError>,
}

macro_rules! setting_fields {
    ($( $konst:ident => $field:ident : $ty:ty = $key:literal ),+ $(,)?) => {
        impl SettingsSnapshot {
            $(
                pub const $konst: Field<$ty> = Field {
                    name: $key,
                    get: |s| &s.$field,
                    get_mut: |s| &mut s.$field,
                };
            )+
        }

        const FIELD_TABLE: &[FieldEntry] = &[
            $(
                FieldEntry {
                    name: $key,
                    type_name: <$ty as SettingValue>::TYPE_NAME,
                    read: |s| s.$field.encode(),
                    write: |s, raw| apply_raw($key, &mut s.$field, raw),
                },
            )+
        ];

        impl SettingsSnapshot {
            /// Resets every field whose value could not be stored to its
            /// default.  Returns the names of the fields that were reset.
            pub fn repair(&mut self) -> Vec<&'static str> {
                let defaults = SettingsSnapshot::default();
                let mut reset = Vec::new();
                $(
                    if !SettingValue::is_storable(&self.$field) {
                        tracing::warn!(setting = $key, "resetting unstorable value to default");
                        self.$field = defaults.$field.clone();
                        reset.push($key);
                    }
                )+
                reset
            }
        }
    };
}

setting_fields! {
    LANGUAGE => language: String = "Language",
    THEME => theme: String = "Theme",
    SHOW_INPUT_LANGUAGE => show_input_language: bool = "ShowInputLanguage",
    SHOW_CLOCK => show_clock: bool = "ShowClock",
    SHOW_DESKTOP_BUTTON => show_desktop_button: bool = "ShowDesktopButton",
    PEEK_AT_DESKTOP => peek_at_desktop: bool = "PeekAtDesktop",
    SHOW_MULTI_MON => show_multi_mon: bool = "ShowMultiMon",
    SHOW_QUICK_LAUNCH => show_quick_launch: bool = "ShowQuickLaunch",
    QUICK_LAUNCH_PATH => quick_launch_path: String = "QuickLaunchPath",
    COLLAPSE_NOTIFY_ICONS => collapse_notify_icons: bool = "CollapseNotifyIcons",
    PINNED_NOTIFY_ICONS => pinned_notify_icons: Vec<String> = "PinnedNotifyIcons",
    ALLOW_FONT_SMOOTHING => allow_font_smoothing: bool = "AllowFontSmoothing",
    USE_SOFTWARE_RENDERING => use_software_rendering: bool = "UseSoftwareRendering",
    MIDDLE_MOUSE_TO_CLOSE => middle_mouse_to_close: bool = "MiddleMouseToClose",
    EDGE => edge: AppBarEdge = "Edge",
    QUICK_LAUNCH_ORDER => quick_launch_order: Vec<String> = "QuickLaunchOrder",
    SHOW_TASK_THUMBNAILS => show_task_thumbnails: bool = "ShowTaskThumbnails",
    MULTI_MON_MODE => multi_mon_mode: MultiMonOption = "MultiMonMode",
    TASKBAR_SCALE => taskbar_scale: f64 = "TaskbarScale",
    DEBUG_LOGGING => debug_logging: bool = "DebugLogging",
    AUTO_HIDE => auto_hide: bool = "AutoHide",
    LOCK_TASKBAR => lock_taskbar: bool = "LockTaskbar",
    INVERT_ICONS_MODE => invert_icons_mode: InvertIconsOption = "InvertIconsMode",
    SHOW_TASK_BADGES => show_task_badges: bool = "ShowTaskBadges",
}

// ── Access ────────────────────────────────────────────────────────────────────

fn log_outcome(name: &str, outcome: SetOutcome) {
    match outcome {
        SetOutcome::Changed => tracing::debug!(setting = name, "setting changed"),
        SetOutcome::Rejected => tracing::debug!(setting = name, "rejected invalid value"),
        SetOutcome::Unchanged => {}
    }
}

impl SettingsSnapshot {
    /// All setting names in declaration (and file) order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        FIELD_TABLE.iter().map(|e| e.name)
    }

    /// Resolves `name` case-insensitively to the setting's canonical name.
    pub fn canonical_name(name: &str) -> Option<&'static str> {
        Self::entry(name).map(|e| e.name)
    }

    /// Type label of the named setting (`"boolean"`, `"AppBarEdge"`, ...).
    pub fn type_name(name: &str) -> Option<&'static str> {
        Self::entry(name).map(|e| e.type_name)
    }

    fn entry(name: &str) -> Option<&'static FieldEntry> {
        FIELD_TABLE
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn get<T: SettingValue>(&self, field: Field<T>) -> &T {
        field.get(self)
    }

    /// Runs the set protocol for one typed field.
    pub fn set<T: SettingValue>(&mut self, field: Field<T>, value: T) -> SetOutcome {
        let outcome = apply_change(field.get_mut(self), value);
        log_outcome(field.name(), outcome);
        outcome
    }

    /// Reads the named setting as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownSetting`] if no setting has that name.
    pub fn get_value(&self, name: &str) -> Result<Value, FieldError> {
        let entry = Self::entry(name).ok_or_else(|| FieldError::UnknownSetting(name.to_string()))?;
        Ok((entry.read)(self))
    }

    /// Runs the set protocol for the named setting with a JSON candidate.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownSetting`] for an unknown name and
    /// [`FieldError::TypeMismatch`] when `raw` has the wrong JSON shape.
    pub fn set_value(&mut self, name: &str, raw: &Value) -> Result<SetOutcome, FieldError> {
        let entry = Self::entry(name).ok_or_else(|| FieldError::UnknownSetting(name.to_string()))?;
        let outcome = (entry.write)(self, raw)?;
        log_outcome(entry.name, outcome);
        Ok(outcome)
    }

    /// Every setting as `(name, value)` in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, Value)> {
        FIELD_TABLE
            .iter()
            .map(|e| (e.name, (e.read)(self)))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_snapshot_documented_values() {
        let s = SettingsSnapshot::default();
        assert!(s.show_clock);
        assert!(!s.auto_hide);
        assert_eq!(s.taskbar_scale, 1.0);
        assert_eq!(s.language, "System");
        assert_eq!(s.theme, "Windows 95-98");
        assert_eq!(s.edge, AppBarEdge::Bottom);
        assert_eq!(s.pinned_notify_icons.len(), 4);
        assert!(s.quick_launch_order.is_empty());
    }

    #[test]
    fn test_field_table_keys_match_serialized_keys() {
        // Arrange
        let json = serde_json::to_value(SettingsSnapshot::default()).unwrap();
        let object = json.as_object().expect("snapshot serializes to an object");

        // Act
        let serialized: Vec<&str> = object.keys().map(String::as_str).collect();
        let mut table: Vec<&str> = SettingsSnapshot::names().collect();
        let mut sorted = serialized.clone();
        sorted.sort_unstable();
        table.sort_unstable();

        // Assert
        assert_eq!(sorted, table);
    }

    #[test]
    fn test_typed_set_runs_protocol() {
        let mut s = SettingsSnapshot::default();
        assert_eq!(s.set(SettingsSnapshot::SHOW_CLOCK, true), SetOutcome::Unchanged);
        assert_eq!(s.set(SettingsSnapshot::SHOW_CLOCK, false), SetOutcome::Changed);
        assert!(!s.get(SettingsSnapshot::SHOW_CLOCK));
    }

    #[test]
    fn test_set_value_by_name_is_case_insensitive() {
        let mut s = SettingsSnapshot::default();
        let outcome = s.set_value("autohide", &json!(true)).unwrap();
        assert_eq!(outcome, SetOutcome::Changed);
        assert!(s.auto_hide);
    }

    #[test]
    fn test_set_value_unknown_name_is_error() {
        let mut s = SettingsSnapshot::default();
        let err = s.set_value("NoSuchSetting", &json!(1)).unwrap_err();
        assert_eq!(err, FieldError::UnknownSetting("NoSuchSetting".to_string()));
    }

    #[test]
    fn test_set_value_negative_enum_is_rejected() {
        let mut s = SettingsSnapshot::default();
        let outcome = s.set_value("MultiMonMode", &json!(-1)).unwrap();
        assert_eq!(outcome, SetOutcome::Rejected);
        assert_eq!(s.multi_mon_mode, MultiMonOption::AllTaskbars);
    }

    #[test]
    fn test_get_value_returns_json() {
        let s = SettingsSnapshot::default();
        assert_eq!(s.get_value("TaskbarScale").unwrap(), json!(1.0));
        assert_eq!(s.get_value("Edge").unwrap(), json!("Bottom"));
    }

    #[test]
    fn test_deserialize_missing_keys_use_defaults() {
        // Arrange: only one key present, plus an unknown key
        let text = r#"{ "AutoHide": true, "SomeFutureSetting": 42 }"#;

        // Act
        let s: SettingsSnapshot = serde_json::from_str(text).unwrap();

        // Assert
        assert!(s.auto_hide);
        assert!(s.show_clock);
        assert_eq!(s.theme, "Windows 95-98");
    }

    #[test]
    fn test_deserialize_accepts_enum_ordinals() {
        let s: SettingsSnapshot = serde_json::from_str(r#"{ "Edge": 1, "InvertIconsMode": 2 }"#).unwrap();
        assert_eq!(s.edge, AppBarEdge::Top);
        assert_eq!(s.invert_icons_mode, InvertIconsOption::Never);
    }

    #[test]
    fn test_deserialize_invalid_enum_keeps_default() {
        // Arrange: a negative ordinal, an out-of-range ordinal, an unknown name
        let text = r#"{ "Edge": -1, "MultiMonMode": 9, "InvertIconsMode": "Sometimes", "ShowClock": false }"#;

        // Act
        let s: SettingsSnapshot = serde_json::from_str(text).unwrap();

        // Assert
        assert_eq!(s.edge, AppBarEdge::Bottom);
        assert_eq!(s.multi_mon_mode, MultiMonOption::AllTaskbars);
        assert_eq!(s.invert_icons_mode, InvertIconsOption::WhenNeededByTheme);
        assert!(!s.show_clock);
    }

    #[test]
    fn test_deserialize_null_scale_loses_only_that_field() {
        // Arrange
        let text = r#"{ "TaskbarScale": null, "Theme": "Windows XP Blue", "AutoHide": true }"#;

        // Act
        let s: SettingsSnapshot = serde_json::from_str(text).unwrap();

        // Assert
        assert_eq!(s.taskbar_scale, 1.0);
        assert_eq!(s.theme, "Windows XP Blue");
        assert!(s.auto_hide);
    }

    #[test]
    fn test_repair_resets_non_finite_scale_and_keeps_other_fields() {
        // Arrange: direct mutation bypasses the set protocol
        let mut s = SettingsSnapshot::default();
        s.theme = "Windows XP Blue".to_string();
        s.taskbar_scale = f64::NAN;

        // Act
        let reset = s.repair();

        // Assert
        assert_eq!(reset, vec!["TaskbarScale"]);
        assert_eq!(s.taskbar_scale, 1.0);
        assert_eq!(s.theme, "Windows XP Blue");
    }

    #[test]
    fn test_repair_leaves_valid_snapshot_untouched() {
        let mut s = SettingsSnapshot::default();
        s.taskbar_scale = 2.0;
        let before = s.clone();

        assert!(s.repair().is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn test_round_trip_preserves_duplicates_and_order() {
        // Arrange
        let mut s = SettingsSnapshot::default();
        s.quick_launch_order = vec![
            "b.lnk".to_string(),
            "a.lnk".to_string(),
            "b.lnk".to_string(),
        ];
        s.taskbar_scale = 1.25;
        s.edge = AppBarEdge::Left;
        s.language = "de-DE".to_string();

        // Act
        let text = serde_json::to_string_pretty(&s).unwrap();
        let restored: SettingsSnapshot = serde_json::from_str(&text).unwrap();

        // Assert
        assert_eq!(restored, s);
    }
}
