//! vCard and MECARD export.
//!
//! Cards are written as vCard 3.0 with CRLF line endings and lines folded at
//! 75 octets. [`VCard::parse`] reads back what [`VCard::to_vcf`] writes.

use serde::{Deserialize, Serialize};

use crate::{BusinessCard, CardError, CardResult};

const CRLF: &str = "\r\n";
const FOLD_WIDTH: usize = 75;

/// Contact details exported as a vCard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VCard {
    /// Formatted name.
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
    /// Organization.
    #[serde(default)]
    pub organization: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Website URL.
    #[serde(default)]
    pub website: Option<String>,
    /// Work address, kept as a single street line.
    #[serde(default)]
    pub address: Option<String>,
    /// Free-form note.
    #[serde(default)]
    pub note: Option<String>,
}

impl From<&BusinessCard> for VCard {
    fn from(card: &BusinessCard) -> Self {
        Self {
            name: card.name.trim().to_string(),
            title: non_blank(card.title.as_deref()),
            organization: None,
            email: non_blank(card.email.as_deref()),
            phone: non_blank(card.phone.as_deref()),
            website: non_blank(card.website.as_deref()),
            address: non_blank(card.address.as_deref()),
            note: non_blank(card.description.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl VCard {
    /// Create a card with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Render as vCard 3.0 text.
    #[must_use]
    pub fn to_vcf(&self) -> String {
        let mut lines = vec!["BEGIN:VCARD".to_string(), "VERSION:3.0".to_string()];
        lines.push(format!("FN:{}", escape_text(&self.name)));

        let (given, family) = split_name(&self.name);
        lines.push(format!(
            "N:{};{};;;",
            escape_text(family),
            escape_text(given)
        ));

        let present = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };
        let properties = [
            ("TITLE", present(&self.title).map(|v| escape_text(&v))),
            ("ORG", present(&self.organization).map(|v| escape_text(&v))),
            ("EMAIL;TYPE=INTERNET", present(&self.email).map(|v| escape_text(&v))),
            ("TEL;TYPE=CELL", present(&self.phone).map(|v| escape_text(&v))),
            ("URL", present(&self.website).map(|v| strip_line_breaks(&v))),
            (
                "ADR;TYPE=WORK",
                present(&self.address).map(|v| format!(";;{};;;;", escape_text(&v))),
            ),
            ("NOTE", present(&self.note).map(|v| escape_text(&v))),
        ];
        for (prop, value) in properties {
            if let Some(value) = value {
                lines.push(format!("{prop}:{value}"));
            }
        }
        lines.push("END:VCARD".to_string());

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str(CRLF);
        }
        out
    }

    /// Parse vCard text produced by [`VCard::to_vcf`] or a compatible writer.
    ///
    /// Unknown properties are ignored. Accepts CRLF or LF line endings.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidVCard`] if the text has no
    /// `BEGIN:VCARD`/`END:VCARD` envelope or no `FN` property.
    pub fn parse(text: &str) -> CardResult<Self> {
        let lines = unfold(text);
        let mut iter = lines
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty());

        if !iter
            .next()
            .is_some_and(|l| l.trim().eq_ignore_ascii_case("BEGIN:VCARD"))
        {
            return Err(CardError::InvalidVCard("missing BEGIN:VCARD".to_string()));
        }

        let mut card = Self::default();
        let mut has_name = false;
        let mut closed = false;
        for line in iter {
            if line.trim().eq_ignore_ascii_case("END:VCARD") {
                closed = true;
                break;
            }
            let Some((head, value)) = line.split_once(':') else {
                return Err(CardError::InvalidVCard(format!("malformed line: {line}")));
            };
            let prop = head
                .split(';')
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            match prop.as_str() {
                "FN" => {
                    card.name = unescape_text(value);
                    has_name = true;
                }
                "TITLE" => card.title = Some(unescape_text(value)),
                "ORG" => card.organization = Some(unescape_text(value)),
                "EMAIL" => card.email = Some(unescape_text(value)),
                "TEL" => card.phone = Some(unescape_text(value)),
                "URL" => card.website = Some(value.to_string()),
                "ADR" => {
                    let street = split_components(value).into_iter().nth(2);
                    card.address = street.filter(|s| !s.is_empty());
                }
                "NOTE" => card.note = Some(unescape_text(value)),
                _ => {}
            }
        }

        if !closed {
            return Err(CardError::InvalidVCard("missing END:VCARD".to_string()));
        }
        if !has_name {
            return Err(CardError::InvalidVCard("missing FN property".to_string()));
        }
        Ok(card)
    }

    /// Render as a single-line MECARD, the compact format QR scanners read.
    #[must_use]
    pub fn to_mecard(&self) -> String {
        let mut out = format!("MECARD:N:{};", escape_mecard(&self.name));
        let fields = [
            ("TEL", &self.phone),
            ("EMAIL", &self.email),
            ("URL", &self.website),
            ("ADR", &self.address),
            ("ORG", &self.organization),
            ("NOTE", &self.note),
        ];
        for (tag, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                out.push_str(tag);
                out.push(':');
                out.push_str(&escape_mecard(value));
                out.push(';');
            }
        }
        out.push(';');
        out
    }
}

/// Split a display name into `(given, family)`; single words are family names.
fn split_name(name: &str) -> (&str, &str) {
    let name = name.trim();
    match name.rsplit_once(char::is_whitespace) {
        Some((given, family)) => (given.trim(), family),
        None => ("", name),
    }
}

/// Escape a text value: backslash, comma, semicolon and line breaks.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push_str("\\n");
                }
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_text`].
#[must_use]
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split a structured value on unescaped `;`, unescaping each component.
fn split_components(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ';' {
            parts.push(unescape_text(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    parts.push(unescape_text(&current));
    parts
}

fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

fn escape_mecard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ';' | ',' | ':' => {
                out.push('\\');
                out.push(c);
            }
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at [`FOLD_WIDTH`] octets without splitting a
/// character; continuation lines start with a single space.
fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_WIDTH {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / FOLD_WIDTH * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > FOLD_WIDTH {
            out.push_str(CRLF);
            out.push(' ');
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        match (raw.strip_prefix([' ', '\t']), lines.last_mut()) {
            (Some(rest), Some(last)) => last.push_str(rest),
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> VCard {
        VCard {
            name: "Ada Lovelace".to_string(),
            title: Some("Analyst, Engine Co.".to_string()),
            organization: Some("Difference; Analytical".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: Some("+44 20 7946 0000".to_string()),
            website: Some("https://example.com/ada?a=1,2".to_string()),
            address: Some("12 St James's Sq; London, UK".to_string()),
            note: Some("Line one\nLine two \\ end".to_string()),
        }
    }

    #[test]
    fn test_vcf_layout() {
        let vcf = full().to_vcf();
        assert!(vcf.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Ada Lovelace\r\n"));
        assert!(vcf.contains("N:Lovelace;Ada;;;\r\n"));
        assert!(vcf.contains("TITLE:Analyst\\, Engine Co.\r\n"));
        assert!(vcf.contains("EMAIL;TYPE=INTERNET:ada@example.com\r\n"));
        assert!(vcf.contains("TEL;TYPE=CELL:+44 20 7946 0000\r\n"));
        assert!(vcf.contains("ADR;TYPE=WORK:;;12 St James's Sq\\; London\\, UK;;;;\r\n"));
        assert!(vcf.contains("NOTE:Line one\\nLine two \\\\ end\r\n"));
        assert!(vcf.ends_with("END:VCARD\r\n"));
        assert!(!vcf.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_round_trip() {
        let card = full();
        let parsed = VCard::parse(&card.to_vcf()).expect("parse");
        assert_eq!(parsed, card);
    }

    #[test]
    fn test_round_trip_minimal() {
        let card = VCard::new("Cher");
        let vcf = card.to_vcf();
        assert!(vcf.contains("N:Cher;;;;\r\n"));
        assert!(!vcf.contains("TITLE"));
        assert_eq!(VCard::parse(&vcf).expect("parse"), card);
    }

    #[test]
    fn test_long_lines_fold_and_unfold() {
        let mut card = VCard::new("Long Note");
        card.note = Some("é".repeat(100));
        let vcf = card.to_vcf();
        assert!(vcf.split("\r\n").all(|l| l.len() <= FOLD_WIDTH));
        assert_eq!(VCard::parse(&vcf).expect("parse"), card);
    }

    #[test]
    fn test_fold_boundary_keeps_spaces() {
        for n in 0..120 {
            let mut card = VCard::new("Fold");
            card.address = Some(format!("{} {}", "a".repeat(n), "b".repeat(40)));
            card.note = Some(format!("{} x", "n".repeat(n)));
            let parsed = VCard::parse(&card.to_vcf()).expect("parse");
            assert_eq!(parsed, card, "space lost with fold at offset {n}");
        }
    }

    #[test]
    fn test_parse_accepts_lf_and_ignores_unknown() {
        let text = "BEGIN:VCARD\nVERSION:3.0\nFN:Bob\nX-CUSTOM:thing\nTEL:123\nEND:VCARD\n";
        let card = VCard::parse(text).expect("parse");
        assert_eq!(card.name, "Bob");
        assert_eq!(card.phone.as_deref(), Some("123"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            VCard::parse("FN:Bob\r\n"),
            Err(CardError::InvalidVCard(_))
        ));
        assert!(matches!(
            VCard::parse("BEGIN:VCARD\r\nFN:Bob\r\n"),
            Err(CardError::InvalidVCard(_))
        ));
        assert!(matches!(
            VCard::parse("BEGIN:VCARD\r\nTEL:1\r\nEND:VCARD\r\n"),
            Err(CardError::InvalidVCard(_))
        ));
        assert!(matches!(
            VCard::parse("BEGIN:VCARD\r\ngarbage\r\nEND:VCARD\r\n"),
            Err(CardError::InvalidVCard(_))
        ));
    }

    #[test]
    fn test_mecard() {
        let mut card = VCard::new("Ada: Countess");
        card.phone = Some("555;1".to_string());
        card.email = Some("ada@example.com".to_string());
        assert_eq!(
            card.to_mecard(),
            "MECARD:N:Ada\\: Countess;TEL:555\\;1;EMAIL:ada@example.com;;"
        );
    }

    #[test]
    fn test_from_business_card() {
        let record = BusinessCard {
            name: " Joe's Diner ".to_string(),
            phone: Some("  ".to_string()),
            email: Some("joe@example.com".to_string()),
            description: Some("Burgers".to_string()),
            ..BusinessCard::default()
        };
        let card = VCard::from(&record);
        assert_eq!(card.name, "Joe's Diner");
        assert_eq!(card.phone, None);
        assert_eq!(card.note.as_deref(), Some("Burgers"));
    }
}
