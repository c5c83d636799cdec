//! Section display order.
//!
//! The final order layers the card's saved order and visibility toggles over
//! the template's declared order. Saved orders may be stale (written against
//! an older template), so unknown keys are dropped and new template sections
//! are appended.

use std::collections::{HashMap, HashSet};

use crate::{SectionDescriptor, TemplateConfig};

/// Compute the display order of sections.
///
/// 1. Start from `saved_order` when present and non-empty, else the
///    template's declared order.
/// 2. Drop keys the template does not define, and repeated keys after their
///    first occurrence.
/// 3. Append template keys missing from the list, in template order.
/// 4. Drop keys whose visibility is `false`, unless the section is required.
#[must_use]
pub fn compute_order(
    saved_order: Option<&[String]>,
    visibility: Option<&HashMap<String, bool>>,
    sections: &[SectionDescriptor],
) -> Vec<String> {
    let known: HashMap<&str, &SectionDescriptor> =
        sections.iter().map(|s| (s.key.as_str(), s)).collect();

    let start: Vec<&str> = match saved_order {
        Some(saved) if !saved.is_empty() => saved.iter().map(String::as_str).collect(),
        _ => sections.iter().map(|s| s.key.as_str()).collect(),
    };

    let mut seen = HashSet::new();
    let mut order: Vec<&str> = Vec::with_capacity(sections.len());
    for key in start {
        if !known.contains_key(key) {
            tracing::debug!(section = key, "Dropped saved section unknown to template");
            continue;
        }
        if seen.insert(key) {
            order.push(key);
        }
    }
    for section in sections {
        if seen.insert(section.key.as_str()) {
            order.push(section.key.as_str());
        }
    }

    order
        .into_iter()
        .filter(|key| {
            let hidden = visibility.is_some_and(|v| v.get(*key) == Some(&false));
            !hidden || known.get(key).is_some_and(|s| s.required)
        })
        .map(str::to_string)
        .collect()
}

/// Saved order and visibility extracted from a card's template config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionLayout {
    /// Saved order, possibly empty.
    pub order: Vec<String>,
    /// Explicit visibility toggles.
    pub visibility: HashMap<String, bool>,
}

impl SectionLayout {
    /// Derive the layout from a card's saved template config.
    ///
    /// `sections` entries give the order and may carry a toggle;
    /// `sectionSettings` toggles take precedence over those.
    #[must_use]
    pub fn from_template_config(config: &TemplateConfig) -> Self {
        let mut layout = Self::default();
        for entry in &config.sections {
            layout.order.push(entry.key().to_string());
            if let Some(enabled) = entry.enabled() {
                layout.visibility.insert(entry.key().to_string(), enabled);
            }
        }
        for (key, settings) in &config.section_settings {
            if let Some(enabled) = settings.enabled {
                layout.visibility.insert(key.clone(), enabled);
            }
        }
        layout
    }

    /// Apply this layout to a template's sections.
    #[must_use]
    pub fn apply(&self, sections: &[SectionDescriptor]) -> Vec<String> {
        compute_order(Some(self.order.as_slice()), Some(&self.visibility), sections)
    }
}
