//! Closed option enumerations stored in settings.
//!
//! Each enum is integer-backed (its ordinal is the declaration index) and
//! written to disk by variant name.  Reading accepts either spelling, so a
//! file written by an older build that stored ordinals still loads.
//!
//! [`SettingEnum::from_ordinal`] is the bounds check used by both the set
//! protocol and the loader: negative ordinals and ordinals past the last
//! declared variant yield `None`.

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::field::{Decoded, SettingValue};

/// An integer-backed enumeration with a fixed, declared set of variants.
pub trait SettingEnum: Copy + Eq + 'static {
    /// All variants in ordinal order.
    const VARIANTS: &'static [Self];

    fn ordinal(self) -> i64;

    fn name(self) -> &'static str;

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        if ordinal < 0 {
            return None;
        }
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| Self::VARIANTS.get(idx).copied())
    }

    /// Case-insensitive lookup by variant name.
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }
}

/// Decodes a name or an ordinal into an enum candidate.
fn decode_enum<E: SettingEnum>(raw: &Value) -> Decoded<E> {
    match raw {
        Value::String(name) => match E::from_name(name) {
            Some(v) => Decoded::Value(v),
            None => Decoded::Mismatch,
        },
        Value::Number(n) => match n.as_i64() {
            Some(ordinal) => match E::from_ordinal(ordinal) {
                Some(v) => Decoded::Value(v),
                None => Decoded::OutOfRange(ordinal),
            },
            None => Decoded::Mismatch,
        },
        _ => Decoded::Mismatch,
    }
}

macro_rules! setting_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl SettingEnum for $name {
            const VARIANTS: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn ordinal(self) -> i64 {
                self as i64
            }

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(SettingEnum::name(*self))
            }
        }

        impl SettingValue for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn decode(raw: &Value) -> Decoded<Self> {
                decode_enum(raw)
            }
        }
    };
}

setting_enum! {
    /// Screen edge the taskbar docks to.  Ordinals match the Win32 `ABE_*`
    /// constants.
    pub enum AppBarEdge {
        Left,
        Top,
        Right,
        #[default]
        Bottom,
    }
}

setting_enum! {
    /// Which taskbars show a window's button on multi-monitor setups.
    pub enum MultiMonOption {
        #[default]
        AllTaskbars,
        SameAsWindow,
        SameAsWindowAndPrimary,
    }
}

setting_enum! {
    /// When notification-area icons are colour-inverted.
    pub enum InvertIconsOption {
        #[default]
        WhenNeededByTheme,
        Always,
        Never,
    }
}
