//! Recursive merging of settings mappings.

use crate::value::{SettingValue, SettingsMap};

/// Merges `overlay` into `base` in place and returns `base`.
///
/// For every overlay key: when both sides hold an [`SettingValue::Object`]
/// the two objects are merged recursively, otherwise the overlay value
/// replaces whatever `base` held. Keys only present in `base` are kept.
///
/// # Example
/// ```
/// use inisettings::merge::merge_nested_settings;
/// use inisettings::{SettingValue, SettingsMap};
///
/// let mut db = SettingsMap::new();
/// db.insert("host".to_string(), "localhost".into());
/// db.insert("port".to_string(), 5432i64.into());
/// let mut base = SettingsMap::new();
/// base.insert("db".to_string(), SettingValue::Object(db));
///
/// let mut db = SettingsMap::new();
/// db.insert("port".to_string(), 6543i64.into());
/// let mut overlay = SettingsMap::new();
/// overlay.insert("db".to_string(), SettingValue::Object(db));
///
/// merge_nested_settings(&mut base, overlay);
///
/// let db = base["db"].as_object().unwrap();
/// assert_eq!(db["host"], SettingValue::from("localhost"));
/// assert_eq!(db["port"], SettingValue::Integer(6543));
/// ```
pub fn merge_nested_settings(base: &mut SettingsMap, overlay: SettingsMap) -> &mut SettingsMap {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(SettingValue::Object(existing)), SettingValue::Object(nested)) => {
                merge_nested_settings(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(entries: &[(&str, SettingValue)]) -> SettingsMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_nested_merge_keeps_untouched_keys() {
        let mut base = object(&[
            ("a", 1i64.into()),
            (
                "b",
                SettingValue::Object(object(&[("c", 2i64.into()), ("d", 3i64.into())])),
            ),
        ]);
        let overlay = object(&[(
            "b",
            SettingValue::Object(object(&[("c", 9i64.into()), ("e", 4i64.into())])),
        )]);

        merge_nested_settings(&mut base, overlay);

        let expected = object(&[
            ("a", 1i64.into()),
            (
                "b",
                SettingValue::Object(object(&[
                    ("c", 9i64.into()),
                    ("d", 3i64.into()),
                    ("e", 4i64.into()),
                ])),
            ),
        ]);
        assert_eq!(base, expected);
    }

    #[test]
    fn test_type_mismatch_replaces() {
        let mut base = object(&[("b", SettingValue::Object(object(&[("c", 1i64.into())])))]);
        merge_nested_settings(&mut base, object(&[("b", "flat".into())]));
        assert_eq!(base.get("b"), Some(&SettingValue::from("flat")));

        let mut base = object(&[("b", "flat".into())]);
        let nested = SettingValue::Object(object(&[("c", 1i64.into())]));
        merge_nested_settings(&mut base, object(&[("b", nested.clone())]));
        assert_eq!(base.get("b"), Some(&nested));
    }

    #[test]
    fn test_arrays_are_replaced_not_concatenated() {
        let mut base = object(&[("list", SettingValue::Array(vec![1i64.into(), 2i64.into()]))]);
        merge_nested_settings(
            &mut base,
            object(&[("list", SettingValue::Array(vec![3i64.into()]))]),
        );
        assert_eq!(
            base.get("list"),
            Some(&SettingValue::Array(vec![3i64.into()]))
        );
    }

    #[test]
    fn test_empty_overlay_is_noop() {
        let mut base = object(&[("a", 1i64.into())]);
        let before = base.clone();
        merge_nested_settings(&mut base, SettingsMap::new());
        assert_eq!(base, before);
    }

    #[test]
    fn test_returns_base_for_chaining() {
        let mut base = SettingsMap::new();
        let merged = merge_nested_settings(&mut base, object(&[("x", true.into())]));
        merged.insert("y".to_string(), false.into());
        assert_eq!(base.len(), 2);
    }
}
