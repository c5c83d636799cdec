//! Merging saved card content over template defaults.
//!
//! Replacement is whole-section: a user section that is a non-empty object
//! wins outright, anything else falls back to the template's default for
//! that key. No field-level merging happens inside a section.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::SectionContent;

/// Effective per-card content, keyed by section key.
pub type ConfigSections = BTreeMap<String, SectionContent>;

/// Merge user-saved sections over template defaults.
///
/// - Every key in `defaults` is present in the result.
/// - A user value replaces the default only when it is a non-empty object.
/// - User keys unknown to the template are kept when they are objects, so
///   cards survive templates that later drop or rename sections. Non-object
///   values under unknown keys cannot be rendered and are dropped.
///
/// Malformed values are recovered silently; nothing here fails.
#[must_use]
pub fn merge_sections(
    user: &serde_json::Map<String, Value>,
    defaults: &BTreeMap<String, SectionContent>,
) -> ConfigSections {
    let mut merged = ConfigSections::new();

    for (key, default) in defaults {
        let content = match user.get(key) {
            Some(Value::Object(map)) if !map.is_empty() => map.clone(),
            Some(Value::Object(_)) | None => default.clone(),
            Some(other) => {
                tracing::debug!(
                    section = %key,
                    kind = value_kind(other),
                    "Malformed section content replaced by template default"
                );
                default.clone()
            }
        };
        merged.insert(key.clone(), content);
    }

    for (key, value) in user {
        if defaults.contains_key(key) {
            continue;
        }
        match value {
            Value::Object(map) => {
                merged.insert(key.clone(), map.clone());
            }
            other => {
                tracing::debug!(
                    section = %key,
                    kind = value_kind(other),
                    "Dropped non-object content for section unknown to template"
                );
            }
        }
    }

    merged
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn object(value: Value) -> SectionContent {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn defaults() -> BTreeMap<String, SectionContent> {
        let mut d = BTreeMap::new();
        d.insert("header".to_string(), object(json!({ "name": "Default Co" })));
        d.insert(
            "about".to_string(),
            object(json!({ "description": "Default about", "highlights": ["a"] })),
        );
        d
    }

    #[test]
    fn test_empty_user_yields_defaults() {
        let merged = merge_sections(&serde_json::Map::new(), &defaults());
        assert_eq!(merged, defaults());
    }

    #[test]
    fn test_user_section_replaces_whole_default() {
        let user = object(json!({ "about": { "description": "Ours" } }));
        let merged = merge_sections(&user, &defaults());

        let about = &merged["about"];
        assert_eq!(about["description"], "Ours");
        // No per-field merge: default highlights are not carried over.
        assert!(!about.contains_key("highlights"));
        assert_eq!(merged["header"]["name"], "Default Co");
    }

    #[test]
    fn test_empty_object_falls_back_to_default() {
        let user = object(json!({ "header": {} }));
        let merged = merge_sections(&user, &defaults());
        assert_eq!(merged["header"]["name"], "Default Co");
    }

    #[test]
    fn test_malformed_values_fall_back_to_default() {
        let user = object(json!({
            "header": "oops",
            "about": [1, 2, 3],
        }));
        let merged = merge_sections(&user, &defaults());
        assert_eq!(merged, defaults());
    }

    #[test]
    fn test_unknown_sections_preserved() {
        let user = object(json!({
            "faq": { "items": [{ "question": "Q", "answer": "A" }] },
            "legacy": {},
            "junk": 42,
        }));
        let merged = merge_sections(&user, &defaults());

        assert!(merged.contains_key("faq"));
        assert!(merged.contains_key("legacy"));
        assert!(!merged.contains_key("junk"));
        assert_eq!(merged.len(), 4);
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
            Just(json!({})),
            "[a-z]{1,8}".prop_map(|s| json!({ "text": s })),
        ]
    }

    proptest! {
        #[test]
        fn prop_every_default_key_present(
            default_keys in prop::collection::btree_set("[a-z]{1,6}", 0..8),
            user in prop::collection::btree_map("[a-z]{1,6}", arb_value(), 0..8),
        ) {
            let defaults: BTreeMap<String, SectionContent> = default_keys
                .iter()
                .map(|k| (k.clone(), object(json!({ "default": k }))))
                .collect();
            let user: serde_json::Map<String, Value> = user.into_iter().collect();

            let merged = merge_sections(&user, &defaults);

            for key in defaults.keys() {
                prop_assert!(merged.contains_key(key), "missing default key {}", key);
                prop_assert!(!merged[key].is_empty());
            }
        }
    }
}
