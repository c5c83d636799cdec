//! Language selector state.
//!
//! The selected language is an explicit per-session value threaded through
//! the render context. Selecting a right-to-left language flips the text
//! direction for the whole page.

use serde::{Deserialize, Serialize};

/// First regional indicator symbol, `🇦`.
const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// Language codes rendered right-to-left.
pub const RTL_LANGUAGES: &[&str] = &["ar", "he"];

/// A selectable language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// ISO 639-1 code, e.g. `"en"`.
    pub code: String,
    /// Display name in the language itself.
    pub name: String,
    /// ISO 3166-1 alpha-2 country used for the flag.
    pub country_code: String,
}

impl Language {
    /// Create a language entry.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            country_code: country_code.into(),
        }
    }

    /// Flag emoji built from the country code's regional indicator symbols.
    /// Non-letter characters are skipped.
    #[must_use]
    pub fn flag(&self) -> String {
        flag_emoji(&self.country_code)
    }

    /// Text direction for this language.
    #[must_use]
    pub fn direction(&self) -> TextDirection {
        TextDirection::for_code(&self.code)
    }
}

/// Map each ASCII letter of `country_code` to its regional indicator symbol.
#[must_use]
pub fn flag_emoji(country_code: &str) -> String {
    country_code
        .chars()
        .filter(char::is_ascii_alphabetic)
        .filter_map(|c| {
            let offset = u32::from(c.to_ascii_uppercase()) - u32::from('A');
            char::from_u32(REGIONAL_INDICATOR_A + offset)
        })
        .collect()
}

/// Page text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl TextDirection {
    /// Direction for a language code.
    #[must_use]
    pub fn for_code(code: &str) -> Self {
        if RTL_LANGUAGES
            .iter()
            .any(|rtl| rtl.eq_ignore_ascii_case(code.trim()))
        {
            Self::Rtl
        } else {
            Self::Ltr
        }
    }

    /// Value for the HTML `dir` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// The built-in language catalogue.
#[must_use]
pub fn builtin_languages() -> Vec<Language> {
    [
        ("en", "English", "US"),
        ("es", "Español", "ES"),
        ("fr", "Français", "FR"),
        ("de", "Deutsch", "DE"),
        ("it", "Italiano", "IT"),
        ("pt", "Português", "PT"),
        ("ar", "العربية", "SA"),
        ("he", "עברית", "IL"),
        ("zh", "中文", "CN"),
        ("ja", "日本語", "JP"),
        ("hi", "हिन्दी", "IN"),
        ("ru", "Русский", "RU"),
    ]
    .into_iter()
    .map(|(code, name, country)| Language::new(code, name, country))
    .collect()
}

/// Current language selection over a catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageState {
    catalogue: Vec<Language>,
    current: usize,
}

impl Default for LanguageState {
    fn default() -> Self {
        Self::new(builtin_languages())
    }
}

impl LanguageState {
    /// Create a state over `catalogue`, starting at its first entry.
    #[must_use]
    pub fn new(catalogue: Vec<Language>) -> Self {
        Self {
            catalogue,
            current: 0,
        }
    }

    /// Select a language by code. Returns `false` and leaves the selection
    /// unchanged when the code is not in the catalogue.
    pub fn select(&mut self, code: &str) -> bool {
        let code = code.trim();
        match self
            .catalogue
            .iter()
            .position(|l| l.code.eq_ignore_ascii_case(code))
        {
            Some(index) => {
                self.current = index;
                true
            }
            None => {
                tracing::debug!(code, "Ignored selection of unknown language");
                false
            }
        }
    }

    /// Builder-style [`LanguageState::select`]; unknown codes are ignored.
    #[must_use]
    pub fn with_selected(mut self, code: &str) -> Self {
        self.select(code);
        self
    }

    /// Currently selected language, `None` for an empty catalogue.
    #[must_use]
    pub fn current(&self) -> Option<&Language> {
        self.catalogue.get(self.current)
    }

    /// Code of the current language, `"en"` for an empty catalogue.
    #[must_use]
    pub fn current_code(&self) -> &str {
        self.current().map_or("en", |l| l.code.as_str())
    }

    /// Text direction for the current language.
    #[must_use]
    pub fn direction(&self) -> TextDirection {
        TextDirection::for_code(self.current_code())
    }

    /// All selectable languages.
    #[must_use]
    pub fn catalogue(&self) -> &[Language] {
        &self.catalogue
    }
}
