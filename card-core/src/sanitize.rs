//! Sanitizers for untrusted card content.
//!
//! Every function here is total: any input, including the empty string,
//! produces a safe output and nothing panics.
//!
//! Plain links go through a scheme deny-list, because blocking arbitrary
//! business websites would break cards. Embeddable video sources go through a
//! host allow-list instead.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// URL schemes that are never allowed in a link.
pub const DANGEROUS_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:", "about:"];

/// Hosts (and their subdomains) trusted as iframe embed sources.
pub const EMBED_ALLOW_LIST: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "wistia.com",
    "brightcove.com",
];

/// Replacement for rejected links.
pub const BLOCKED_URL: &str = "#";

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("hex color pattern is valid")
});

static IFRAME_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<iframe\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("iframe src pattern is valid")
});

/// Escape HTML-significant characters.
///
/// Escapes `&`, `<`, `>`, `"`, `'` and `/`. Escaping twice is not the same as
/// escaping once.
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drop ASCII control characters (tab, CR, LF, other C0 codes and DEL) and
/// trim surrounding spaces, as browsers do before reading a link's scheme.
///
/// Run this before [`sanitize_url`] on any link that ends up in an `href`,
/// otherwise `java\tscript:` slips past the scheme check.
#[must_use]
pub fn strip_url_controls(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_ascii_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Reject links with a dangerous scheme.
///
/// Returns [`BLOCKED_URL`] when the trimmed, lowercased value starts with one
/// of [`DANGEROUS_SCHEMES`]; otherwise returns the input unchanged. No other
/// well-formedness checks are made.
#[must_use]
pub fn sanitize_url(input: &str) -> String {
    let normalized = input.trim().to_lowercase();
    if DANGEROUS_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
    {
        tracing::debug!("Blocked link with dangerous scheme");
        return BLOCKED_URL.to_string();
    }
    input.to_string()
}

/// Check whether `host` is an allow-listed embed host or one of its subdomains.
#[must_use]
pub fn is_allowed_embed_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    EMBED_ALLOW_LIST.iter().any(|allowed| {
        host == *allowed
            || host
                .strip_suffix(allowed)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Accept an embed URL only if its host is on the allow-list.
///
/// Returns the input unchanged when accepted and the empty string for every
/// other input, including strings that do not parse as URLs.
#[must_use]
pub fn sanitize_embed_url(input: &str) -> String {
    let Ok(parsed) = Url::parse(input.trim()) else {
        tracing::debug!("Rejected unparsable embed URL");
        return String::new();
    };
    match parsed.host_str() {
        Some(host) if is_allowed_embed_host(host) => input.to_string(),
        _ => {
            tracing::debug!(host = ?parsed.host_str(), "Rejected embed URL host");
            String::new()
        }
    }
}

/// Check a `#rgb` / `#rrggbb` colour literal.
#[must_use]
pub fn is_valid_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Named fallback colour for a colour slot.
#[must_use]
pub fn default_color(key: &str) -> &'static str {
    match key {
        "primary" => "#1A365D",
        "secondary" => "#2D3748",
        "accent" => "#D69E2E",
        "background" => "#FFFFFF",
        "text" => "#1A202C",
        _ => "#000000",
    }
}

/// Keep a valid hex colour, otherwise substitute the slot's named default.
#[must_use]
pub fn sanitize_color(key: &str, value: &str) -> String {
    if is_valid_hex_color(value) {
        value.to_string()
    } else {
        tracing::debug!(key, value, "Invalid colour replaced with default");
        default_color(key).to_string()
    }
}

/// Extract the `src` attribute of the first `<iframe>` in raw markup.
#[must_use]
pub fn iframe_src(markup: &str) -> Option<String> {
    let caps = IFRAME_SRC.captures(markup)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().to_string())
}
