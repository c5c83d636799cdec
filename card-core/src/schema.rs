//! Template schema: the static description of a business category.
//!
//! A [`TemplateDefinition`] is plain data. Every category (restaurant, law
//! firm, gym, ...) is one instance of it, loaded from JSON, and nothing in
//! a render pass mutates it.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult};

/// Loosely typed content of one section: a JSON object whose shape follows
/// the section's field descriptors.
pub type SectionContent = serde_json::Map<String, serde_json::Value>;

/// Flat colour map (`primary`, `secondary`, ... to hex literal).
pub type ColorSet = BTreeMap<String, String>;

/// Maximum repeater nesting depth accepted in a template.
pub const MAX_REPEATER_DEPTH: usize = 2;

/// Input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Email address.
    Email,
    /// Telephone number.
    Tel,
    /// Link.
    Url,
    /// Numeric value.
    Number,
    /// Uploaded file (stored as a URL).
    File,
    /// One of a fixed set of options.
    Select,
    /// Free-form list of short strings.
    Tags,
    /// Boolean toggle.
    Checkbox,
    /// Time of day (`HH:MM`).
    Time,
    /// Calendar date.
    Date,
    /// Array of rows, each shaped by nested fields.
    Repeater,
}

/// A `{value, label}` choice for select fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Stored value.
    pub value: String,
    /// Display label.
    pub label: String,
}

/// Description of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Key of the value inside the section content.
    pub name: String,
    /// Input type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label.
    pub label: String,
    /// Choices for select fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Row fields for repeaters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// Create a scalar field.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: label.into(),
            options: None,
            fields: None,
        }
    }

    /// Create a repeater field with the given row fields.
    #[must_use]
    pub fn repeater(
        name: impl Into<String>,
        label: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            fields: Some(fields),
            ..Self::new(name, FieldType::Repeater, label)
        }
    }

    /// Row fields of a repeater, empty for scalar fields.
    #[must_use]
    pub fn row_fields(&self) -> &[FieldDescriptor] {
        self.fields.as_deref().unwrap_or_default()
    }

    /// Nesting depth of this field (1 for scalars).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .row_fields()
            .iter()
            .map(FieldDescriptor::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Description of one page section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Unique key within the template.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Fields the section can contain.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Required sections are always shown.
    #[serde(default)]
    pub required: bool,
}

impl SectionDescriptor {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named colour palette offered by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPreset {
    /// Preset name.
    pub name: String,
    /// Colours of the preset.
    pub colors: ColorSet,
}

/// A font family offered by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontOption {
    /// Display name.
    pub name: String,
    /// CSS font-family value.
    pub value: String,
}

/// Complete static definition of one business category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    /// Display name.
    pub name: String,
    /// Sections in declared order.
    pub sections: Vec<SectionDescriptor>,
    /// Colour presets.
    #[serde(default)]
    pub color_presets: Vec<ColorPreset>,
    /// Font choices.
    #[serde(default)]
    pub font_options: Vec<FontOption>,
    /// Colours used when the card sets none.
    #[serde(default)]
    pub default_colors: ColorSet,
    /// Font used when the card sets none.
    #[serde(default)]
    pub default_font: String,
    /// Extra style tokens (border radius, shadows, ...).
    #[serde(default)]
    pub theme_style: BTreeMap<String, String>,
    /// Default content per section key.
    #[serde(default)]
    pub default_data: BTreeMap<String, SectionContent>,
}

impl TemplateDefinition {
    /// Parse a template from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Serialization`] for malformed JSON and
    /// [`CardError::InvalidTemplate`] when a structural rule is broken.
    pub fn from_json(key: &str, json: &str) -> CardResult<Self> {
        let template: Self = serde_json::from_str(json)?;
        template.validate(key)?;
        Ok(template)
    }

    /// Look up a section descriptor by key.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Section keys in declared order.
    pub fn section_keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.key.as_str())
    }

    /// Check structural rules: unique section keys, nested fields only on
    /// repeaters, bounded nesting, and default data only for known sections.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidTemplate`] describing the first violation.
    pub fn validate(&self, key: &str) -> CardResult<()> {
        let invalid = |reason: String| CardError::InvalidTemplate {
            key: key.to_string(),
            reason,
        };

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.key.is_empty() {
                return Err(invalid("section with empty key".to_string()));
            }
            if !seen.insert(section.key.as_str()) {
                return Err(invalid(format!("duplicate section key '{}'", section.key)));
            }
            for field in &section.fields {
                check_field(field, &section.key).map_err(invalid)?;
            }
        }

        if let Some(orphan) = self.default_data.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(invalid(format!("default data for unknown section '{orphan}'")));
        }

        Ok(())
    }
}

fn check_field(field: &FieldDescriptor, section: &str) -> Result<(), String> {
    if field.field_type != FieldType::Repeater && field.fields.is_some() {
        return Err(format!(
            "field '{}' in section '{section}' has nested fields but is not a repeater",
            field.name
        ));
    }
    if field.depth() > MAX_REPEATER_DEPTH + 1 {
        return Err(format!(
            "field '{}' in section '{section}' nests repeaters deeper than {MAX_REPEATER_DEPTH}",
            field.name
        ));
    }
    for nested in field.row_fields() {
        check_field(nested, section)?;
    }
    Ok(())
}
