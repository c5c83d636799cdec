//! Section renderers.
//!
//! A [`Renderer`] maps section keys to render functions. Each function
//! projects one section's merged content into a [`BlockKind`], or returns
//! `None` when the section is disabled or lacks the data it needs. Sections
//! with no dedicated function fall back to a generic field listing driven by
//! the section descriptor.
//!
//! ## Built-in renderers
//!
//! | Key                                   | Minimum data                         |
//! |---------------------------------------|--------------------------------------|
//! | `header`                              | `name` (or the card's name)          |
//! | `about`                               | `description`                        |
//! | `contact`                             | any of email, phone, website, address|
//! | `business_hours`                      | at least one `hours` row             |
//! | `testimonials`                        | a `reviews` row with `review` text   |
//! | `gallery`                             | an `images` row with `image`         |
//! | `videos`                              | a `videos` row with `embed_url`      |
//! | `social`                              | a safe `social_links` URL            |
//! | `services`, `menu`, `products`, `team`| a titled `items` / `members` row     |
//! | `appointments`                        | `booking_url` or `phone`             |
//! | `location`                            | `address`                            |
//! | `action_buttons`                      | a `buttons` row with label and URL   |
//! | `language`                            | non-empty language catalogue         |
//! | `qr_share`                            | none                                 |
//! | `copyright`                           | `text`, or a name to credit          |

use std::collections::HashMap;
use std::time::Duration;

use chrono::{Datelike, Local};
use serde_json::Value;

use crate::block::{
    BlockKind, ContactItem, ContactKind, FieldGroup, FieldLine, GalleryImage, HoursLine,
    LanguageOption, LinkButton, ListItem, RenderedBlock, Review, VideoItem,
};
use crate::content::{is_enabled, raw_rows, rows, str_field, tags_field, text_field};
use crate::hours::{BusinessHours, Clock, HoursPolicy};
use crate::language::LanguageState;
use crate::rotation::{Rotation, DEFAULT_ROTATION_INTERVAL};
use crate::sanitize::{sanitize_text, sanitize_url, strip_url_controls, BLOCKED_URL};
use crate::share::{social_links_from, SharePayload, SocialLink};
use crate::video::{IframePolicy, VideoEmbed};
use crate::{ColorSet, FieldDescriptor, FieldType, SectionContent, SectionDescriptor};

/// Everything a render pass needs besides the section content itself.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Resolved colours.
    pub colors: ColorSet,
    /// Resolved font family.
    pub font: String,
    /// Wall clock for the open-now badge.
    pub clock: Clock,
    /// Year used in generated copyright lines.
    pub year: i32,
    /// Language selection.
    pub language: LanguageState,
    /// Canonical URL of the card page.
    pub page_url: String,
    /// Card name, used where a section has none of its own.
    pub business_name: String,
    /// Social links for the share widget.
    pub social_links: Vec<SocialLink>,
    /// How the open-now badge is decided.
    pub hours_policy: HoursPolicy,
    /// How pasted iframes are treated.
    pub iframe_policy: IframePolicy,
    /// Testimonial rotation interval.
    pub rotation_interval: Duration,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            colors: ColorSet::new(),
            font: String::new(),
            clock: Clock::now(),
            year: Local::now().year(),
            language: LanguageState::default(),
            page_url: String::new(),
            business_name: String::new(),
            social_links: Vec::new(),
            hours_policy: HoursPolicy::default(),
            iframe_policy: IframePolicy::default(),
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
        }
    }
}

/// A dedicated section render function.
pub type RenderFn = fn(&SectionContent, &RenderContext) -> Option<BlockKind>;

/// Registry of section renderers shared by all templates.
#[derive(Debug, Clone)]
pub struct Renderer {
    renderers: HashMap<&'static str, RenderFn>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a registry with the built-in renderers.
    #[must_use]
    pub fn new() -> Self {
        let mut renderers: HashMap<&'static str, RenderFn> = HashMap::new();
        renderers.insert("header", render_header);
        renderers.insert("about", render_about);
        renderers.insert("contact", render_contact);
        renderers.insert("business_hours", render_business_hours);
        renderers.insert("testimonials", render_testimonials);
        renderers.insert("gallery", render_gallery);
        renderers.insert("videos", render_videos);
        renderers.insert("social", render_social);
        renderers.insert("services", render_item_list);
        renderers.insert("menu", render_item_list);
        renderers.insert("products", render_item_list);
        renderers.insert("team", render_team);
        renderers.insert("appointments", render_appointments);
        renderers.insert("location", render_location);
        renderers.insert("action_buttons", render_action_buttons);
        renderers.insert("language", render_language);
        renderers.insert("qr_share", render_qr_share);
        renderers.insert("copyright", render_copyright);
        Self { renderers }
    }

    /// Register (or replace) the renderer for a section key.
    pub fn register(&mut self, key: &'static str, render: RenderFn) {
        self.renderers.insert(key, render);
    }

    /// Check whether a key has a dedicated renderer.
    #[must_use]
    pub fn has_renderer(&self, key: &str) -> bool {
        self.renderers.contains_key(key)
    }

    /// Render a section by key. The block title is derived from the key.
    #[must_use]
    pub fn render(
        &self,
        key: &str,
        content: &SectionContent,
        ctx: &RenderContext,
    ) -> Option<RenderedBlock> {
        self.render_with(key, &humanize(key), None, content, ctx)
    }

    /// Render a section described by a template descriptor. The block title
    /// is the section's display name and generic sections use its labels.
    #[must_use]
    pub fn render_section(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        ctx: &RenderContext,
    ) -> Option<RenderedBlock> {
        self.render_with(&section.key, &section.name, Some(section), content, ctx)
    }

    fn render_with(
        &self,
        key: &str,
        title: &str,
        descriptor: Option<&SectionDescriptor>,
        content: &SectionContent,
        ctx: &RenderContext,
    ) -> Option<RenderedBlock> {
        if content.is_empty() || !is_enabled(content) {
            tracing::debug!(section = key, "Section empty or disabled, omitted");
            return None;
        }

        let kind = match self.renderers.get(key) {
            Some(render) => render(content, ctx),
            None => render_fields(descriptor, content),
        };
        match kind {
            Some(kind) => Some(RenderedBlock::new(key, sanitize_text(title), kind)),
            None => {
                tracing::debug!(section = key, "Section lacks required data, omitted");
                None
            }
        }
    }
}

fn text(map: &SectionContent, key: &str) -> Option<String> {
    text_field(map, key).map(|v| sanitize_text(&v))
}

fn link(map: &SectionContent, key: &str) -> Option<String> {
    str_field(map, key).and_then(safe_link)
}

fn safe_link(raw: &str) -> Option<String> {
    let url = sanitize_url(&strip_url_controls(raw));
    (!url.is_empty() && url != BLOCKED_URL).then_some(url)
}

fn first_text(map: &SectionContent, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(map, key))
}

fn humanize(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_header(content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    let name = text(content, "name").or_else(|| {
        let fallback = ctx.business_name.trim();
        (!fallback.is_empty()).then(|| sanitize_text(fallback))
    })?;
    Some(BlockKind::Header {
        name,
        subtitle: text(content, "title"),
        tagline: text(content, "tagline"),
        logo: link(content, "logo"),
        cover_image: link(content, "cover_image"),
    })
}

fn render_about(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    Some(BlockKind::About {
        description: text(content, "description")?,
        highlights: tags_field(content, "highlights")
            .iter()
            .map(String::as_str)
            .map(sanitize_text)
            .collect(),
        year_established: text(content, "year_established"),
    })
}

fn render_contact(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    let mut items = Vec::new();
    if let Some(email) = str_field(content, "email") {
        items.push(ContactItem {
            kind: ContactKind::Email,
            label: sanitize_text(email),
            href: safe_link(&format!("mailto:{email}")),
        });
    }
    if let Some(phone) = str_field(content, "phone") {
        let dial: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        items.push(ContactItem {
            kind: ContactKind::Phone,
            label: sanitize_text(phone),
            href: (!dial.is_empty()).then(|| format!("tel:{dial}")),
        });
    }
    if let Some(website) = str_field(content, "website") {
        items.push(ContactItem {
            kind: ContactKind::Website,
            label: sanitize_text(website),
            href: safe_link(website),
        });
    }
    if let Some(address) = str_field(content, "address") {
        items.push(ContactItem {
            kind: ContactKind::Address,
            label: sanitize_text(address),
            href: None,
        });
    }
    (!items.is_empty()).then_some(BlockKind::Contact { items })
}

fn render_business_hours(content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    let hours = BusinessHours::from_rows(raw_rows(content, "hours"));
    if hours.rows.is_empty() {
        return None;
    }
    let open = hours.is_open(&ctx.clock, ctx.hours_policy);
    Some(BlockKind::BusinessHours {
        status: hours.status_label(&ctx.clock, ctx.hours_policy).to_string(),
        open,
        rows: hours
            .rows
            .iter()
            .map(|row| HoursLine::from_row(row, row.weekday == Some(ctx.clock.weekday)))
            .collect(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rating(row: &SectionContent) -> Option<u8> {
    let value = match row.get("rating")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !value.is_finite() || value < 1.0 {
        return None;
    }
    Some(value.round().min(5.0) as u8)
}

fn render_testimonials(content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    let reviews: Vec<Review> = rows(content, "reviews")
        .filter_map(|row| {
            Some(Review {
                text: text(row, "review")?,
                author: first_text(row, &["client_name", "author", "name"]),
                rating: rating(row),
            })
        })
        .collect();
    if reviews.is_empty() {
        return None;
    }
    let rotation = Rotation::for_len(reviews.len());
    Some(BlockKind::Testimonials {
        reviews,
        rotation,
        interval_ms: u64::try_from(ctx.rotation_interval.as_millis()).unwrap_or(u64::MAX),
    })
}

fn render_gallery(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    let images: Vec<GalleryImage> = rows(content, "images")
        .filter_map(|row| {
            Some(GalleryImage {
                src: link(row, "image")?,
                caption: text(row, "caption"),
            })
        })
        .collect();
    (!images.is_empty()).then_some(BlockKind::Gallery { images })
}

fn render_videos(content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    let videos: Vec<VideoItem> = rows(content, "videos")
        .filter_map(|row| {
            let raw = str_field(row, "embed_url")?;
            Some(VideoItem {
                title: text(row, "title"),
                embed: VideoEmbed::from_raw(raw, ctx.iframe_policy),
            })
        })
        .collect();
    (!videos.is_empty()).then_some(BlockKind::Videos { videos })
}

fn render_social(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    let links: Vec<SocialLink> = social_links_from(content)
        .iter()
        .filter_map(SocialLink::sanitized)
        .collect();
    (!links.is_empty()).then_some(BlockKind::Social { links })
}

fn list_item(row: &SectionContent) -> Option<ListItem> {
    Some(ListItem {
        title: first_text(row, &["title", "name"])?,
        subtitle: first_text(row, &["role", "subtitle"]),
        description: first_text(row, &["description", "bio"]),
        price: text(row, "price"),
        image: link(row, "image"),
    })
}

fn render_items(content: &SectionContent, list: &str) -> Option<BlockKind> {
    let items: Vec<ListItem> = rows(content, list).filter_map(list_item).collect();
    (!items.is_empty()).then_some(BlockKind::Items { items })
}

fn render_item_list(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    render_items(content, "items")
}

fn render_team(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    render_items(content, "members").or_else(|| render_items(content, "items"))
}

fn render_appointments(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    let booking_url = link(content, "booking_url");
    let phone = str_field(content, "phone");
    if booking_url.is_none() && phone.is_none() {
        return None;
    }
    let phone_href = phone.and_then(|p| {
        let dial: String = p
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        (!dial.is_empty()).then(|| format!("tel:{dial}"))
    });
    Some(BlockKind::Appointments {
        booking_url,
        phone: phone.map(sanitize_text),
        phone_href,
        note: text(content, "note"),
    })
}

fn render_location(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    let address = str_field(content, "address")?;
    let map_url = link(content, "map_url").unwrap_or_else(|| {
        let query: String = url::form_urlencoded::byte_serialize(address.as_bytes()).collect();
        format!("https://maps.google.com/?q={query}")
    });
    Some(BlockKind::Location {
        address: sanitize_text(address),
        map_url,
    })
}

fn render_action_buttons(content: &SectionContent, _ctx: &RenderContext) -> Option<BlockKind> {
    let buttons: Vec<LinkButton> = rows(content, "buttons")
        .filter_map(|row| {
            Some(LinkButton {
                label: text(row, "label")?,
                url: link(row, "url")?,
            })
        })
        .collect();
    (!buttons.is_empty()).then_some(BlockKind::ActionButtons { buttons })
}

fn render_language(_content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    let catalogue = ctx.language.catalogue();
    if catalogue.is_empty() {
        return None;
    }
    let current = ctx.language.current_code();
    Some(BlockKind::LanguageSelector {
        current: sanitize_text(current),
        direction: ctx.language.direction(),
        options: catalogue
            .iter()
            .map(|l| LanguageOption {
                code: sanitize_text(&l.code),
                name: sanitize_text(&l.name),
                flag: l.flag(),
                selected: l.code == current,
            })
            .collect(),
    })
}

fn render_qr_share(content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    Some(BlockKind::QrShare {
        payload: SharePayload::new(&ctx.page_url, &ctx.social_links),
        caption: text(content, "title"),
    })
}

fn render_copyright(content: &SectionContent, ctx: &RenderContext) -> Option<BlockKind> {
    if let Some(text) = text(content, "text") {
        return Some(BlockKind::Copyright { text });
    }
    let name = str_field(content, "name").or_else(|| {
        let fallback = ctx.business_name.trim();
        (!fallback.is_empty()).then_some(fallback)
    })?;
    Some(BlockKind::Copyright {
        text: sanitize_text(&format!("\u{a9} {} {name}", ctx.year)),
    })
}

/// Generic renderer: every scalar and repeater field with its label.
fn render_fields(
    descriptor: Option<&SectionDescriptor>,
    content: &SectionContent,
) -> Option<BlockKind> {
    let mut fields = Vec::new();
    let mut groups = Vec::new();

    let described: Vec<(String, Option<&FieldDescriptor>)> = match descriptor {
        Some(section) => section
            .fields
            .iter()
            .map(|f| (f.name.clone(), Some(f)))
            .collect(),
        None => content.keys().map(|k| (k.clone(), None)).collect(),
    };

    for (name, field) in described {
        if name == "enabled" {
            continue;
        }
        let Some(value) = content.get(&name) else {
            continue;
        };
        let label = sanitize_text(&field.map_or_else(|| humanize(&name), |f| f.label.clone()));

        if let Some(rows) = object_rows(value) {
            let row_fields = field.map(FieldDescriptor::row_fields).unwrap_or_default();
            let rows: Vec<Vec<FieldLine>> = rows
                .filter_map(|row| {
                    let lines = row_lines(row, row_fields);
                    (!lines.is_empty()).then_some(lines)
                })
                .collect();
            if !rows.is_empty() {
                groups.push(FieldGroup { label, rows });
            }
        } else if let Some(value) = display_value(value, field) {
            fields.push(FieldLine { label, value });
        }
    }

    (!fields.is_empty() || !groups.is_empty()).then_some(BlockKind::Fields { fields, groups })
}

fn object_rows(value: &Value) -> Option<impl Iterator<Item = &SectionContent>> {
    let items = value.as_array()?;
    items
        .iter()
        .any(Value::is_object)
        .then(|| items.iter().filter_map(Value::as_object))
}

fn row_lines(row: &SectionContent, fields: &[FieldDescriptor]) -> Vec<FieldLine> {
    let line = |name: &str, field: Option<&FieldDescriptor>| {
        let value = display_value(row.get(name)?, field)?;
        let label = field.map_or_else(|| humanize(name), |f| f.label.clone());
        Some(FieldLine {
            label: sanitize_text(&label),
            value,
        })
    };
    if fields.is_empty() {
        row.keys().filter_map(|k| line(k, None)).collect()
    } else {
        fields.iter().filter_map(|f| line(&f.name, Some(f))).collect()
    }
}

/// Display text for a scalar or tag-list value. Nested rows yield `None`.
fn display_value(value: &Value, field: Option<&FieldDescriptor>) -> Option<String> {
    let raw = match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            select_label(field, s).unwrap_or(s).to_string()
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        Value::Array(items) => {
            let tags: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if tags.is_empty() {
                return None;
            }
            tags.join(", ")
        }
        Value::Null | Value::Object(_) => return None,
    };
    let is_link = field.is_some_and(|f| matches!(f.field_type, FieldType::Url | FieldType::File));
    if is_link {
        safe_link(&raw).map(|url| sanitize_text(&url))
    } else {
        Some(sanitize_text(&raw))
    }
}

fn select_label<'a>(field: Option<&'a FieldDescriptor>, value: &str) -> Option<&'a str> {
    field?
        .options
        .as_deref()?
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.as_str())
}
