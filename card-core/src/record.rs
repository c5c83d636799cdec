//! Business card records as handed over by the host application.
//!
//! Records are owned and persisted elsewhere; this crate only reads them.
//! Deserialization is lenient: a field of the wrong type reads as absent
//! and malformed layout entries are dropped, so one bad value never rejects
//! the whole record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ColorSet;

/// A saved business card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessCard {
    /// Business or person name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Job title or business tagline.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    /// Contact email.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    /// Website URL.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub website: Option<String>,
    /// Postal address.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    /// Short description.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    /// User content per section key. Values are kept raw so malformed
    /// sections can be recovered during the merge.
    #[serde(default, deserialize_with = "lenient::object")]
    pub config_sections: serde_json::Map<String, serde_json::Value>,
    /// Saved section ordering and visibility.
    #[serde(default, deserialize_with = "lenient::template_config")]
    pub template_config: TemplateConfig,
}

/// Saved layout for a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Saved section order.
    #[serde(default, deserialize_with = "lenient::saved_sections")]
    pub sections: Vec<SavedSection>,
    /// Per-section settings.
    #[serde(
        default,
        rename = "sectionSettings",
        alias = "section_settings",
        deserialize_with = "lenient::section_settings"
    )]
    pub section_settings: BTreeMap<String, SectionSettings>,
    /// Chosen colours by slot; missing slots use the template defaults.
    #[serde(default, deserialize_with = "lenient::colors")]
    pub colors: ColorSet,
    /// Chosen font family.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub font: Option<String>,
}

/// One entry of a saved order: either a bare key or a key with a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedSection {
    /// Bare section key.
    Key(String),
    /// Section key with an explicit visibility toggle.
    Entry {
        /// Section key.
        key: String,
        /// Visibility toggle.
        #[serde(default)]
        enabled: Option<bool>,
    },
}

impl SavedSection {
    /// The section key of this entry.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) | Self::Entry { key, .. } => key,
        }
    }

    /// Explicit visibility toggle, if any.
    #[must_use]
    pub fn enabled(&self) -> Option<bool> {
        match self {
            Self::Key(_) => None,
            Self::Entry { enabled, .. } => *enabled,
        }
    }
}

/// Settings stored per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSettings {
    /// Visibility toggle.
    #[serde(default, deserialize_with = "lenient::toggle")]
    pub enabled: Option<bool>,
}

/// Field deserializers that project any JSON value onto the field type.
mod lenient {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    use super::{SavedSection, SectionSettings, TemplateConfig};
    use crate::ColorSet;

    fn text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn flag(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub(super) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub(super) fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text(&Value::deserialize(d)?))
    }

    pub(super) fn toggle<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(flag(&Value::deserialize(d)?))
    }

    pub(super) fn object<'de, D: Deserializer<'de>>(d: D) -> Result<Map<String, Value>, D::Error> {
        match Value::deserialize(d)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => {
                tracing::debug!(value = %other, "Ignoring non-object config_sections");
                Ok(Map::new())
            }
        }
    }

    pub(super) fn template_config<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<TemplateConfig, D::Error> {
        let value = Value::deserialize(d)?;
        if !value.is_object() {
            return Ok(TemplateConfig::default());
        }
        Ok(serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "Ignoring malformed template_config");
            TemplateConfig::default()
        }))
    }

    pub(super) fn saved_sections<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Vec<SavedSection>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(key) => Some(SavedSection::Key(key.clone())),
                Value::Object(entry) => {
                    let key = entry.get("key").and_then(Value::as_str)?;
                    Some(SavedSection::Entry {
                        key: key.to_string(),
                        enabled: entry.get("enabled").and_then(flag),
                    })
                }
                _ => {
                    tracing::debug!(entry = %item, "Dropping malformed saved section");
                    None
                }
            })
            .collect())
    }

    pub(super) fn section_settings<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, SectionSettings>, D::Error> {
        let Value::Object(map) = Value::deserialize(d)? else {
            return Ok(BTreeMap::new());
        };
        Ok(map
            .iter()
            .filter_map(|(key, settings)| {
                let settings = settings.as_object()?;
                Some((
                    key.clone(),
                    SectionSettings {
                        enabled: settings.get("enabled").and_then(flag),
                    },
                ))
            })
            .collect())
    }

    pub(super) fn colors<'de, D: Deserializer<'de>>(d: D) -> Result<ColorSet, D::Error> {
        let Value::Object(map) = Value::deserialize(d)? else {
            return Ok(ColorSet::new());
        };
        Ok(map
            .iter()
            .filter_map(|(slot, color)| Some((slot.clone(), color.as_str()?.to_string())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_record_with_mixed_saved_sections() {
        let json = r##"{
            "name": "La Trattoria",
            "email": "ciao@example.com",
            "config_sections": { "header": { "name": "Trattoria" } },
            "template_config": {
                "sections": ["header", { "key": "gallery", "enabled": false }],
                "sectionSettings": { "about": { "enabled": false } },
                "colors": { "primary": "#123456" },
                "font": "Georgia, serif"
            }
        }"##;

        let card: BusinessCard = serde_json::from_str(json).expect("should parse");
        assert_eq!(card.name, "La Trattoria");
        assert_eq!(card.email.as_deref(), Some("ciao@example.com"));
        assert!(card.phone.is_none());

        let sections = &card.template_config.sections;
        assert_eq!(sections[0], SavedSection::Key("header".to_string()));
        assert_eq!(sections[1].key(), "gallery");
        assert_eq!(sections[1].enabled(), Some(false));
        assert_eq!(
            card.template_config.section_settings["about"].enabled,
            Some(false)
        );
        assert_eq!(card.template_config.colors["primary"], "#123456");
        assert_eq!(card.template_config.font.as_deref(), Some("Georgia, serif"));
    }

    #[test]
    fn test_minimal_record_defaults() {
        let card: BusinessCard = serde_json::from_str(r#"{ "name": "X" }"#).expect("parse");
        assert!(card.config_sections.is_empty());
        assert!(card.template_config.sections.is_empty());
        assert!(card.template_config.section_settings.is_empty());
    }

    #[test]
    fn test_missing_name_reads_as_empty() {
        let card: BusinessCard = serde_json::from_value(json!({ "email": "a@b.c" })).expect("parse");
        assert_eq!(card.name, "");
        assert_eq!(card.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_wrong_typed_fields_read_as_absent() {
        let card: BusinessCard = serde_json::from_value(json!({
            "name": 42,
            "phone": 5550100,
            "email": ["x"],
            "config_sections": "oops",
            "template_config": { "font": false }
        }))
        .expect("parse");
        assert_eq!(card.name, "42");
        assert_eq!(card.phone.as_deref(), Some("5550100"));
        assert!(card.email.is_none());
        assert!(card.config_sections.is_empty());
        assert!(card.template_config.font.is_none());
    }

    #[test]
    fn test_bad_colour_value_is_dropped() {
        let card: BusinessCard = serde_json::from_value(json!({
            "name": "Cafe",
            "template_config": { "colors": { "primary": 5, "secondary": "#abc" } }
        }))
        .expect("parse");
        let colors = &card.template_config.colors;
        assert!(!colors.contains_key("primary"));
        assert_eq!(colors["secondary"], "#abc");
    }

    #[test]
    fn test_string_toggles_are_read() {
        let card: BusinessCard = serde_json::from_value(json!({
            "name": "Cafe",
            "template_config": {
                "sectionSettings": {
                    "about": { "enabled": "false" },
                    "menu": { "enabled": "maybe" },
                    "gallery": "off"
                }
            }
        }))
        .expect("parse");
        let settings = &card.template_config.section_settings;
        assert_eq!(settings["about"].enabled, Some(false));
        assert_eq!(settings["menu"].enabled, None);
        assert!(!settings.contains_key("gallery"));
    }

    #[test]
    fn test_malformed_saved_sections_are_dropped() {
        let card: BusinessCard = serde_json::from_value(json!({
            "name": "Cafe",
            "template_config": {
                "sections": ["header", 7, null, { "enabled": true }, { "key": "menu", "enabled": 0 }]
            }
        }))
        .expect("parse");
        assert_eq!(
            card.template_config.sections,
            vec![
                SavedSection::Key("header".to_string()),
                SavedSection::Entry {
                    key: "menu".to_string(),
                    enabled: Some(false),
                },
            ]
        );
    }

    #[test]
    fn test_non_object_layout_reads_as_default() {
        let card: BusinessCard =
            serde_json::from_value(json!({ "name": "Cafe", "template_config": [1, 2] }))
                .expect("parse");
        assert_eq!(card.template_config, TemplateConfig::default());

        let card: BusinessCard = serde_json::from_value(json!({
            "name": "Cafe",
            "template_config": { "sections": "header", "colors": null }
        }))
        .expect("parse");
        assert!(card.template_config.sections.is_empty());
        assert!(card.template_config.colors.is_empty());
    }
}
