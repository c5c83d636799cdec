//! Lenient accessors over loosely typed section content.
//!
//! Section content comes straight from user input, so every accessor treats a
//! wrong type the same as a missing field.

use serde_json::Value;

use crate::SectionContent;

/// Check the section-level `enabled` toggle. Absent means enabled.
#[must_use]
pub fn is_enabled(content: &SectionContent) -> bool {
    !matches!(content.get("enabled"), Some(Value::Bool(false)))
}

/// Non-blank string field, trimmed.
#[must_use]
pub fn str_field<'a>(map: &'a SectionContent, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Non-blank string or number field rendered as text.
#[must_use]
pub fn text_field(map: &SectionContent, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Boolean field. Accepts `true`, `"true"`, `"1"`, `"yes"`, `"on"` and non-zero numbers.
#[must_use]
pub fn bool_field(map: &SectionContent, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Repeater rows that are JSON objects. Anything else yields no rows.
pub fn rows<'a>(map: &'a SectionContent, key: &str) -> impl Iterator<Item = &'a SectionContent> {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
}

/// Raw repeater array, empty if the field is not an array.
#[must_use]
pub fn raw_rows<'a>(map: &'a SectionContent, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Tags field: an array of strings, or a comma-separated string.
#[must_use]
pub fn tags_field(map: &SectionContent, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(value: Value) -> SectionContent {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_enabled_toggle() {
        assert!(is_enabled(&content(json!({}))));
        assert!(is_enabled(&content(json!({ "enabled": true }))));
        assert!(is_enabled(&content(json!({ "enabled": "no" }))));
        assert!(!is_enabled(&content(json!({ "enabled": false }))));
    }

    #[test]
    fn test_scalar_accessors() {
        let c = content(json!({
            "name": "  Acme  ",
            "blank": "   ",
            "year": 1998,
            "closed": "yes",
            "flag": 0,
        }));
        assert_eq!(str_field(&c, "name"), Some("Acme"));
        assert_eq!(str_field(&c, "blank"), None);
        assert_eq!(str_field(&c, "year"), None);
        assert_eq!(text_field(&c, "year").as_deref(), Some("1998"));
        assert!(bool_field(&c, "closed"));
        assert!(!bool_field(&c, "flag"));
        assert!(!bool_field(&c, "missing"));
    }

    #[test]
    fn test_rows_skip_non_objects() {
        let c = content(json!({ "items": [{ "a": 1 }, 2, "x", { "b": 2 }], "bad": "nope" }));
        assert_eq!(rows(&c, "items").count(), 2);
        assert_eq!(raw_rows(&c, "items").len(), 4);
        assert_eq!(rows(&c, "bad").count(), 0);
        assert_eq!(rows(&c, "missing").count(), 0);
    }

    #[test]
    fn test_tags() {
        let c = content(json!({ "a": ["x", " ", "y", 3], "b": "one, two,,three" }));
        assert_eq!(tags_field(&c, "a"), vec!["x", "y"]);
        assert_eq!(tags_field(&c, "b"), vec!["one", "two", "three"]);
        assert!(tags_field(&c, "c").is_empty());
    }
}
