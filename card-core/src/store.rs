//! Template registry keyed by business category.
//!
//! Provides a [`TemplateStore`] that maps a category key (`restaurant`,
//! `law-firm`, ...) to its immutable [`TemplateDefinition`]. The store is
//! built once at startup and then shared read-only, so it hands out
//! [`Arc`]s instead of copies.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::{CardError, CardResult, TemplateDefinition};

/// Templates compiled into the crate, as `(key, json)` pairs.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("restaurant", include_str!("../templates/restaurant.json")),
    ("law-firm", include_str!("../templates/law-firm.json")),
    ("gym", include_str!("../templates/gym.json")),
    ("podcast", include_str!("../templates/podcast.json")),
];

/// Read-only registry of template definitions.
///
/// # Example
///
/// ```
/// use card_core::TemplateStore;
///
/// let store = TemplateStore::builtin().unwrap();
/// let restaurant = store.get("restaurant").unwrap();
/// assert!(restaurant.section("header").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, Arc<TemplateDefinition>>,
}

impl TemplateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to parse or validate.
    pub fn builtin() -> CardResult<Self> {
        let mut store = Self::new();
        for (key, json) in BUILTIN_TEMPLATES {
            store.insert(key, TemplateDefinition::from_json(key, json)?);
        }
        tracing::debug!(count = store.len(), "Loaded built-in templates");
        Ok(store)
    }

    /// Load every `*.json` file in `dir`, keyed by file stem.
    ///
    /// Files replace any template already registered under the same key.
    /// Returns the keys that were loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Io`] if the directory cannot be read and a parse
    /// or validation error for the first bad file.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> CardResult<Vec<String>> {
        let mut parsed = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(normalize_key) else {
                continue;
            };
            let json = std::fs::read_to_string(&path)?;
            parsed.push((key.clone(), TemplateDefinition::from_json(&key, &json)?));
        }

        // Nothing is registered unless every file loaded.
        let mut loaded = Vec::with_capacity(parsed.len());
        for (key, template) in parsed {
            if self.templates.contains_key(&key) {
                tracing::info!(key = %key, "Template file overrides existing template");
            }
            self.insert(&key, template);
            loaded.push(key);
        }
        loaded.sort();
        Ok(loaded)
    }

    /// Register a template under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: &str, template: TemplateDefinition) {
        self.templates
            .insert(normalize_key(key), Arc::new(template));
    }

    /// Get a template by category key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<TemplateDefinition>> {
        self.templates.get(&normalize_key(key)).cloned()
    }

    /// Get a template by category key or fail.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::UnknownTemplate`] if no template is registered.
    pub fn require(&self, key: &str) -> CardResult<Arc<TemplateDefinition>> {
        self.get(key)
            .ok_or_else(|| CardError::UnknownTemplate(key.to_string()))
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Iterate over `(key, template)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateDefinition)> {
        self.templates
            .iter()
            .map(|(k, t)| (k.as_str(), t.as_ref()))
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Canonical form of a category key: trimmed, lowercase, `_` and spaces as `-`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
