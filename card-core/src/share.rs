//! QR share payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{rows, str_field};
use crate::sanitize::{sanitize_text, sanitize_url, strip_url_controls, BLOCKED_URL};
use crate::SectionContent;

/// A social profile link shown next to the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Platform label, e.g. `"instagram"`.
    pub platform: String,
    /// Profile URL.
    pub url: String,
}

impl SocialLink {
    /// Create a link.
    #[must_use]
    pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
        }
    }

    /// Sanitized copy, `None` if the URL is blocked or blank.
    #[must_use]
    pub fn sanitized(&self) -> Option<Self> {
        let url = sanitize_url(&strip_url_controls(&self.url));
        if url.is_empty() || url == BLOCKED_URL {
            tracing::debug!(platform = %self.platform, "Dropped unsafe social link");
            return None;
        }
        Some(Self {
            platform: sanitize_text(self.platform.trim()),
            url,
        })
    }
}

/// What a QR share widget encodes and displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    /// Canonical page URL.
    pub url: String,
    /// Sanitized social links; blocked entries are dropped.
    pub social_links: Vec<SocialLink>,
}

impl SharePayload {
    /// Build a payload, sanitizing the URL and every link.
    #[must_use]
    pub fn new(url: &str, social_links: &[SocialLink]) -> Self {
        Self {
            url: sanitize_url(&strip_url_controls(url)),
            social_links: social_links
                .iter()
                .filter_map(SocialLink::sanitized)
                .collect(),
        }
    }

    /// Text to encode into the QR code.
    #[must_use]
    pub fn qr_text(&self) -> &str {
        &self.url
    }
}

/// Read social links from a `social` section's `social_links` rows.
///
/// Rows carry `platform` and `url`; rows without a URL are skipped.
#[must_use]
pub fn social_links_from(content: &SectionContent) -> Vec<SocialLink> {
    rows(content, "social_links")
        .filter_map(|row| {
            let url = str_field(row, "url")?;
            let platform = str_field(row, "platform").unwrap_or("link");
            Some(SocialLink::new(platform, url))
        })
        .collect()
}

/// Social links of a merged section map, looked up under `social`.
#[must_use]
pub fn social_links_in(sections: &crate::ConfigSections) -> Vec<SocialLink> {
    sections
        .get("social")
        .map(social_links_from)
        .unwrap_or_default()
}

/// Parse a JSON array of `{platform, url}` objects, skipping anything else.
#[must_use]
pub fn social_links_from_value(value: &Value) -> Vec<SocialLink> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
