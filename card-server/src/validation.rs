//! Input validation for untrusted request data.
//!
//! The render pipeline tolerates any content, but request envelopes are
//! bounded here before they reach it.

use card_core::{BusinessCard, SocialLink, VCard};
use thiserror::Error;

/// Maximum length for category keys.
pub const MAX_CATEGORY_LEN: usize = 64;
/// Maximum length for language codes (`pt-BR` style tags fit easily).
pub const MAX_LANGUAGE_LEN: usize = 16;
/// Maximum length for page URLs.
pub const MAX_URL_LEN: usize = 2048;
/// Maximum length for a card or contact name.
pub const MAX_NAME_LEN: usize = 256;
/// Maximum number of content sections on one card.
pub const MAX_SECTIONS_PER_CARD: usize = 64;
/// Maximum number of social links in a share request.
pub const MAX_SOCIAL_LINKS: usize = 32;
/// Maximum request body size.
pub const MAX_BODY_SIZE: usize = 1_048_576; // 1MB

/// Validation error types.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Category key exceeds maximum length.
    #[error("category too long (max {MAX_CATEGORY_LEN} chars)")]
    CategoryTooLong,
    /// Category key is empty or contains invalid characters.
    #[error("category contains invalid characters")]
    CategoryInvalidChars,
    /// Language code exceeds maximum length or contains invalid characters.
    #[error("invalid language code")]
    InvalidLanguage,
    /// Page URL exceeds maximum length.
    #[error("page_url too long (max {MAX_URL_LEN} chars)")]
    UrlTooLong,
    /// Page URL is not an absolute http(s) URL.
    #[error("page_url must be an absolute http or https URL")]
    InvalidUrl,
    /// A share request has no page URL and the server has no public URL.
    #[error("page_url is required")]
    MissingUrl,
    /// Name is empty.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds maximum length.
    #[error("name too long (max {MAX_NAME_LEN} chars)")]
    NameTooLong,
    /// Too many content sections on a card.
    #[error("too many sections (max {MAX_SECTIONS_PER_CARD})")]
    TooManySections,
    /// Too many social links.
    #[error("too many social links (max {MAX_SOCIAL_LINKS})")]
    TooManySocialLinks,
}

impl ValidationError {
    /// Short label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CategoryTooLong | Self::CategoryInvalidChars => "category",
            Self::InvalidLanguage => "language",
            Self::UrlTooLong | Self::InvalidUrl | Self::MissingUrl => "page_url",
            Self::EmptyName | Self::NameTooLong => "name",
            Self::TooManySections => "sections",
            Self::TooManySocialLinks => "social_links",
        }
    }
}

/// Check if a character is valid in a category key.
fn is_valid_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Validate a category key.
///
/// Valid keys:
/// - 1-64 characters
/// - ASCII alphanumeric, hyphen, underscore only
///
/// # Errors
///
/// Returns [`ValidationError::CategoryTooLong`] if the key exceeds 64 characters.
/// Returns [`ValidationError::CategoryInvalidChars`] if the key is empty or contains invalid characters.
pub fn validate_category(key: &str) -> Result<(), ValidationError> {
    if key.len() > MAX_CATEGORY_LEN {
        return Err(ValidationError::CategoryTooLong);
    }
    if key.is_empty() || !key.chars().all(is_valid_key_char) {
        return Err(ValidationError::CategoryInvalidChars);
    }
    Ok(())
}

/// Validate a language code such as `en` or `pt-BR`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidLanguage`] if the code is empty, too
/// long, or contains anything but ASCII letters and hyphens.
pub fn validate_language(code: &str) -> Result<(), ValidationError> {
    if code.is_empty()
        || code.len() > MAX_LANGUAGE_LEN
        || !code.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
    {
        return Err(ValidationError::InvalidLanguage);
    }
    Ok(())
}

/// Validate a page URL.
///
/// # Errors
///
/// Returns [`ValidationError::UrlTooLong`] past 2048 characters and
/// [`ValidationError::InvalidUrl`] unless the URL parses with an http(s) scheme.
pub fn validate_page_url(raw: &str) -> Result<(), ValidationError> {
    if raw.len() > MAX_URL_LEN {
        return Err(ValidationError::UrlTooLong);
    }
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidUrl),
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Validate a card record envelope.
///
/// Section contents are not inspected; the pipeline recovers from anything.
///
/// # Errors
///
/// Returns [`ValidationError::NameTooLong`] or
/// [`ValidationError::TooManySections`].
pub fn validate_card(card: &BusinessCard) -> Result<(), ValidationError> {
    if card.name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if card.config_sections.len() > MAX_SECTIONS_PER_CARD {
        return Err(ValidationError::TooManySections);
    }
    Ok(())
}

/// Validate a vCard export request.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or [`ValidationError::NameTooLong`].
pub fn validate_vcard(vcard: &VCard) -> Result<(), ValidationError> {
    validate_name(&vcard.name)
}

/// Validate the social links of a share request.
///
/// # Errors
///
/// Returns [`ValidationError::TooManySocialLinks`] past 32 links.
pub fn validate_social_links(links: &[SocialLink]) -> Result<(), ValidationError> {
    if links.len() > MAX_SOCIAL_LINKS {
        return Err(ValidationError::TooManySocialLinks);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_categories() {
        assert!(validate_category("restaurant").is_ok());
        assert!(validate_category("law-firm").is_ok());
        assert!(validate_category("law_firm").is_ok());
        assert!(validate_category("a").is_ok());
        assert!(validate_category(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_invalid_categories() {
        assert!(matches!(
            validate_category(""),
            Err(ValidationError::CategoryInvalidChars)
        ));
        assert!(matches!(
            validate_category(&"a".repeat(65)),
            Err(ValidationError::CategoryTooLong)
        ));
        assert!(validate_category("../etc/passwd").is_err());
        assert!(validate_category("law firm").is_err());
        assert!(validate_category("café").is_err());
    }

    #[test]
    fn test_languages() {
        assert!(validate_language("en").is_ok());
        assert!(validate_language("pt-BR").is_ok());
        assert!(validate_language("").is_err());
        assert!(validate_language("en_US").is_err());
        assert!(validate_language(&"a".repeat(17)).is_err());
    }

    #[test]
    fn test_page_urls() {
        assert!(validate_page_url("https://cards.example.com/acme").is_ok());
        assert!(validate_page_url("http://localhost:9474/c/1").is_ok());
        assert!(matches!(
            validate_page_url("javascript:alert(1)"),
            Err(ValidationError::InvalidUrl)
        ));
        assert!(matches!(
            validate_page_url("/relative"),
            Err(ValidationError::InvalidUrl)
        ));
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert!(matches!(
            validate_page_url(&long),
            Err(ValidationError::UrlTooLong)
        ));
    }

    #[test]
    fn test_card_envelope() {
        let mut card = BusinessCard {
            name: "Acme".to_string(),
            ..BusinessCard::default()
        };
        assert!(validate_card(&card).is_ok());

        for i in 0..=MAX_SECTIONS_PER_CARD {
            card.config_sections
                .insert(format!("s{i}"), serde_json::Value::Null);
        }
        assert!(matches!(
            validate_card(&card),
            Err(ValidationError::TooManySections)
        ));
    }

    #[test]
    fn test_vcard_name_required() {
        assert!(validate_vcard(&VCard::new("Ada")).is_ok());
        assert!(matches!(
            validate_vcard(&VCard::new("  ")),
            Err(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ValidationError::CategoryTooLong.kind(), "category");
        assert_eq!(ValidationError::MissingUrl.kind(), "page_url");
        assert_eq!(ValidationError::TooManySocialLinks.kind(), "social_links");
    }

    proptest! {
        #[test]
        fn prop_valid_category_chars_accepted(key in "[a-z0-9_-]{1,64}") {
            prop_assert!(validate_category(&key).is_ok());
        }

        #[test]
        fn prop_slash_never_accepted(prefix in "[a-z]{0,10}", suffix in "[a-z]{0,10}") {
            let key = format!("{prefix}/{suffix}");
            prop_assert!(validate_category(&key).is_err());
        }
    }
}
