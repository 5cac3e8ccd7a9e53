//! Structural deep merge over the typed theme schema.
//!
//! Every theme section is a record of optional fields. A field is either a
//! leaf (color, flag, glyph, list) that an override replaces wholesale, or a
//! nested section that merges field by field. The distinction is fixed by the
//! schema declaration in `theme_section!`, so there is no runtime guess about
//! what is "mergeable".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// A theme value that can absorb an override layered on top of it.
pub trait Merge: Clone {
    /// Return a new value: `self` with `over` layered on top.
    fn merge(&self, over: &Self) -> Self;
}

/// Merge two optional theme nodes. An absent input counts as empty.
///
/// The result is always freshly built; neither input is touched.
pub fn deep_merge<T: Merge + Default>(base: Option<&T>, over: Option<&T>) -> T {
    match (base, over) {
        (Some(base), Some(over)) => base.merge(over),
        (Some(base), None) => base.clone(),
        (None, Some(over)) => over.clone(),
        (None, None) => T::default(),
    }
}

/// Field-level merge for a nested section.
pub(crate) fn merge_section<T: Merge>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    match (base, over) {
        (Some(base), Some(over)) => Some(base.merge(over)),
        (base, None) => base.clone(),
        (None, over) => over.clone(),
    }
}

/// Field-level merge for a leaf: the override wins when present.
pub(crate) fn merge_leaf<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    over.clone().or_else(|| base.clone())
}

/// Decode a theme field, treating a wrong-shaped value as absent.
///
/// Theme overrides come from hand-written config files; one bad field must
/// not take the whole theme (or the config) down with it.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value::<T>(raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed theme field");
            Ok(None)
        }
    }
}

macro_rules! merge_field {
    (section, $base:expr, $over:expr) => {
        $crate::theme::merge::merge_section($base, $over)
    };
    (leaf, $base:expr, $over:expr) => {
        $crate::theme::merge::merge_leaf($base, $over)
    };
}

/// Declare a theme section: a serde record whose fields are all optional,
/// plus its `Merge` impl. Each field is tagged `section` (merged recursively)
/// or `leaf` (replaced wholesale).
macro_rules! theme_section {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $kind:ident $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(
                    deserialize_with = "crate::theme::merge::lenient",
                    skip_serializing_if = "Option::is_none"
                )]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::theme::merge::Merge for $name {
            fn merge(&self, over: &Self) -> Self {
                Self {
                    $( $field: $crate::theme::merge::merge_field!($kind, &self.$field, &over.$field), )*
                }
            }
        }
    };
}

pub(crate) use merge_field;
pub(crate) use theme_section;

#[cfg(test)]
mod tests {
    use super::*;

    theme_section! {
        pub struct Inner {
            leaf a: u16,
            leaf b: u16,
        }
    }

    theme_section! {
        pub struct Outer {
            section inner: Inner,
            leaf list: Vec<u16>,
            leaf name: String,
        }
    }

    #[test]
    fn test_nested_sections_merge_field_by_field() {
        let base = Outer {
            inner: Some(Inner {
                a: Some(1),
                b: Some(2),
            }),
            ..Default::default()
        };
        let over = Outer {
            inner: Some(Inner {
                a: None,
                b: Some(20),
            }),
            ..Default::default()
        };
        let merged = base.merge(&over);
        assert_eq!(
            merged.inner,
            Some(Inner {
                a: Some(1),
                b: Some(20)
            })
        );
    }

    #[test]
    fn test_lists_replace_wholesale() {
        let base = Outer {
            list: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        let over = Outer {
            list: Some(vec![9]),
            ..Default::default()
        };
        assert_eq!(base.merge(&over).list, Some(vec![9]));
    }

    #[test]
    fn test_deep_merge_absent_inputs() {
        let over = Outer {
            name: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(deep_merge::<Outer>(None, None), Outer::default());
        assert_eq!(deep_merge(None, Some(&over)), over);
        assert_eq!(deep_merge(Some(&over), None), over);
    }

    #[test]
    fn test_lenient_field_drops_wrong_shape() {
        let parsed: Outer =
            serde_json::from_str(r#"{"inner": 42, "list": [1, 2], "name": "ok"}"#).unwrap();
        assert_eq!(parsed.inner, None);
        assert_eq!(parsed.list, Some(vec![1, 2]));
        assert_eq!(parsed.name.as_deref(), Some("ok"));
    }

    #[test]
    fn test_lenient_field_ignores_unknown_keys() {
        let parsed: Outer = serde_json::from_str(r#"{"inner": {"a": 3, "zzz": true}}"#).unwrap();
        assert_eq!(
            parsed.inner,
            Some(Inner {
                a: Some(3),
                b: None
            })
        );
    }
}
