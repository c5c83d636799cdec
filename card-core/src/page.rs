//! The page pipeline: template + card record → rendered page.
//!
//! ```text
//! TemplateStore ─► merge_sections ─► SectionLayout::apply ─► Renderer ─► RenderedPage
//! ```
//!
//! A render pass is a pure function of its inputs. Nothing here fails: bad
//! content is substituted or omitted, never reported.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{Datelike, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::block::RenderedBlock;
use crate::hours::{Clock, HoursPolicy};
use crate::language::{LanguageState, TextDirection};
use crate::merge::{merge_sections, ConfigSections};
use crate::order::SectionLayout;
use crate::render::{RenderContext, Renderer};
use crate::rotation::DEFAULT_ROTATION_INTERVAL;
use crate::sanitize::{default_color, sanitize_color};
use crate::share::social_links_in;
use crate::store::TemplateStore;
use crate::video::IframePolicy;
use crate::{BusinessCard, CardResult, ColorSet, SectionContent, TemplateDefinition};

/// Colour slots every page carries.
pub const COLOR_SLOTS: &[&str] = &["primary", "secondary", "accent", "background", "text"];

/// Font used when neither the card nor the template names one.
pub const FALLBACK_FONT: &str = "sans-serif";

static FONT_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9 ,'"-]+$"#).expect("font family pattern is valid")
});

static SHARED_RENDERER: LazyLock<Renderer> = LazyLock::new(Renderer::new);

/// A fully rendered card page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// Category key of the template.
    pub category: String,
    /// Template display name.
    pub template_name: String,
    /// Resolved colours.
    pub colors: ColorSet,
    /// Resolved font family.
    pub font: String,
    /// Template style tokens.
    pub theme_style: BTreeMap<String, String>,
    /// Page text direction.
    pub direction: TextDirection,
    /// Selected language code.
    pub language: String,
    /// Rendered sections in display order.
    pub blocks: Vec<RenderedBlock>,
    /// Ordered sections that rendered nothing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omitted: Vec<String>,
}

impl RenderedPage {
    /// Look up a block by section key.
    #[must_use]
    pub fn block(&self, key: &str) -> Option<&RenderedBlock> {
        self.blocks.iter().find(|b| b.key == key)
    }

    /// Section keys of the rendered blocks, in order.
    pub fn block_keys(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.key.as_str())
    }
}

/// Per-request knobs for a render pass.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Language code to select; unknown codes keep the default.
    pub language: Option<String>,
    /// Canonical URL of the card page, encoded by the QR share widget.
    pub page_url: Option<String>,
    /// Wall clock; `None` reads the local clock.
    pub clock: Option<Clock>,
    /// Year for generated copyright lines; `None` reads the local clock.
    pub year: Option<i32>,
    /// How the open-now badge is decided.
    pub hours_policy: HoursPolicy,
    /// How pasted iframes are treated.
    pub iframe_policy: IframePolicy,
    /// Testimonial rotation interval; `None` uses the default.
    pub rotation_interval: Option<Duration>,
}

/// Resolve the page colours.
///
/// Every standard slot plus every slot named by the template or the card is
/// present. A slot takes the card's value, else the template default, and is
/// then validated; invalid values fall back to the slot's named default.
#[must_use]
pub fn resolve_colors(user: &ColorSet, template: &TemplateDefinition) -> ColorSet {
    let mut slots: Vec<&str> = COLOR_SLOTS.to_vec();
    slots.extend(template.default_colors.keys().map(String::as_str));
    slots.extend(user.keys().map(String::as_str));

    slots
        .into_iter()
        .map(|slot| {
            let chosen = user
                .get(slot)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .or_else(|| template.default_colors.get(slot).map(|v| v.trim()))
                .unwrap_or_else(|| default_color(slot));
            (slot.to_string(), sanitize_color(slot, chosen))
        })
        .collect()
}

/// Resolve the page font.
///
/// Empty or missing picks the template default. A choice matching one of
/// the template's font options (by name or value) maps to that option's
/// value. Anything else is kept only if it looks like a plain family list.
#[must_use]
pub fn resolve_font(user: Option<&str>, template: &TemplateDefinition) -> String {
    let template_default = || {
        let default = template.default_font.trim();
        if default.is_empty() {
            FALLBACK_FONT.to_string()
        } else {
            default.to_string()
        }
    };

    let Some(choice) = user.map(str::trim).filter(|f| !f.is_empty()) else {
        return template_default();
    };
    if let Some(option) = template
        .font_options
        .iter()
        .find(|o| o.value == choice || o.name.eq_ignore_ascii_case(choice))
    {
        return option.value.clone();
    }
    if FONT_FAMILY.is_match(choice) {
        choice.to_string()
    } else {
        tracing::debug!(font = choice, "Rejected font, using template default");
        template_default()
    }
}

/// Build the render context for one pass.
#[must_use]
pub fn render_context(
    card: &BusinessCard,
    template: &TemplateDefinition,
    sections: &ConfigSections,
    options: &PageOptions,
) -> RenderContext {
    let mut language = LanguageState::default();
    if let Some(code) = options.language.as_deref() {
        language.select(code);
    }
    RenderContext {
        colors: resolve_colors(&card.template_config.colors, template),
        font: resolve_font(card.template_config.font.as_deref(), template),
        clock: options.clock.unwrap_or_else(Clock::now),
        year: options.year.unwrap_or_else(|| Local::now().year()),
        language,
        page_url: options.page_url.clone().unwrap_or_default(),
        business_name: card.name.clone(),
        social_links: social_links_in(sections),
        hours_policy: options.hours_policy,
        iframe_policy: options.iframe_policy,
        rotation_interval: options.rotation_interval.unwrap_or(DEFAULT_ROTATION_INTERVAL),
    }
}

/// Render a card against a template.
#[must_use]
#[tracing::instrument(skip_all, fields(category = %category))]
pub fn render_page(
    category: &str,
    template: &TemplateDefinition,
    card: &BusinessCard,
    renderer: &Renderer,
    options: &PageOptions,
) -> RenderedPage {
    let sections = merge_sections(&card.config_sections, &template.default_data);
    let order = SectionLayout::from_template_config(&card.template_config).apply(&template.sections);
    let ctx = render_context(card, template, &sections, options);

    let empty = SectionContent::new();
    let mut blocks = Vec::with_capacity(order.len());
    let mut omitted = Vec::new();
    for key in order {
        let content = sections.get(&key).unwrap_or(&empty);
        let block = match template.section(&key) {
            Some(section) => renderer.render_section(section, content, &ctx),
            None => renderer.render(&key, content, &ctx),
        };
        match block {
            Some(block) => blocks.push(block),
            None => omitted.push(key),
        }
    }
    tracing::debug!(blocks = blocks.len(), omitted = omitted.len(), "Rendered page");

    RenderedPage {
        category: category.to_string(),
        template_name: template.name.clone(),
        direction: ctx.language.direction(),
        language: ctx.language.current_code().to_string(),
        colors: ctx.colors,
        font: ctx.font,
        theme_style: template.theme_style.clone(),
        blocks,
        omitted,
    }
}

/// Look up the card's template in `store` and render it with the shared
/// renderer.
///
/// # Errors
///
/// Returns [`crate::CardError::UnknownTemplate`] if `category` is not
/// registered.
pub fn render_card(
    store: &TemplateStore,
    category: &str,
    card: &BusinessCard,
    options: &PageOptions,
) -> CardResult<RenderedPage> {
    let template = store.require(category)?;
    Ok(render_page(
        category,
        &template,
        card,
        &SHARED_RENDERER,
        options,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::hours::{CLOSED_NOW, OPEN_NOW};
    use crate::{CardError, FontOption, SavedSection, SectionSettings};
    use chrono::{NaiveTime, Weekday};
    use serde_json::json;

    fn store() -> TemplateStore {
        TemplateStore::builtin().expect("built-in templates load")
    }

    fn options() -> PageOptions {
        PageOptions {
            clock: Some(Clock::new(
                Weekday::Mon,
                NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
            )),
            year: Some(2024),
            page_url: Some("https://cards.example.com/trattoria".to_string()),
            ..PageOptions::default()
        }
    }

    fn card(value: serde_json::Value) -> BusinessCard {
        serde_json::from_value(value).expect("valid card")
    }

    #[test]
    fn test_restaurant_without_user_sections_uses_defaults() {
        let store = store();
        let template = store.require("restaurant").expect("restaurant template");
        let record = card(json!({ "name": "Trattoria" }));

        let merged = merge_sections(&record.config_sections, &template.default_data);
        assert_eq!(merged, template.default_data);

        let order = SectionLayout::from_template_config(&record.template_config)
            .apply(&template.sections);
        let declared: Vec<String> = template.section_keys().map(str::to_string).collect();
        assert_eq!(order, declared);

        let page = render_card(&store, "restaurant", &record, &options()).expect("render");
        assert_eq!(page.template_name, template.name);
        let rendered_and_omitted = page.blocks.len() + page.omitted.len();
        assert_eq!(rendered_and_omitted, declared.len());
        let keys: Vec<&str> = page.block_keys().collect();
        let expected: Vec<&str> = declared
            .iter()
            .map(String::as_str)
            .filter(|k| keys.contains(k))
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_user_content_and_layout_applied() {
        let record = card(json!({
            "name": "Joe's",
            "config_sections": {
                "header": { "name": "Joe's <Diner>" },
                "about": "not an object",
                "business_hours": { "hours": [
                    { "day": "Monday", "open_time": "09:00", "close_time": "17:00", "is_closed": true }
                ]}
            },
            "template_config": {
                "sections": ["contact", { "key": "gallery", "enabled": false }, "ghost"],
                "sectionSettings": { "contact": { "enabled": false } },
                "colors": { "primary": "#ZZZZZZ", "accent": "#abc" },
                "font": "Georgia"
            }
        }));

        let page = render_card(&store(), "restaurant", &record, &options()).expect("render");
        let keys: Vec<&str> = page.block_keys().collect();
        assert_eq!(keys.first(), Some(&"contact"));
        assert!(!keys.contains(&"gallery"));
        assert!(!keys.contains(&"ghost"));

        let Some(BlockKind::Header { name, .. }) = page.block("header").map(|b| &b.kind) else {
            panic!("Expected header");
        };
        assert_eq!(name, "Joe&#x27;s &lt;Diner&gt;");

        let Some(BlockKind::BusinessHours { status, .. }) =
            page.block("business_hours").map(|b| &b.kind)
        else {
            panic!("Expected hours");
        };
        assert_eq!(status, CLOSED_NOW);

        assert!(page.block("about").is_some());
        assert_eq!(page.colors["primary"], "#1A365D");
        assert_eq!(page.colors["accent"], "#abc");
        assert_eq!(page.font, "Georgia");
    }

    #[test]
    fn test_language_direction_and_share() {
        let record = card(json!({
            "name": "Cafe",
            "config_sections": {
                "social": { "social_links": [
                    { "platform": "instagram", "url": "https://instagram.com/cafe" },
                    { "platform": "bad", "url": "javascript:alert(1)" }
                ]}
            }
        }));
        let options = PageOptions {
            language: Some("he".to_string()),
            ..options()
        };
        let page = render_card(&store(), "restaurant", &record, &options).expect("render");
        assert_eq!(page.direction, TextDirection::Rtl);
        assert_eq!(page.language, "he");

        let Some(BlockKind::QrShare { payload, .. }) = page.block("qr_share").map(|b| &b.kind)
        else {
            panic!("Expected QR share");
        };
        assert_eq!(payload.qr_text(), "https://cards.example.com/trattoria");
        assert_eq!(payload.social_links.len(), 1);
    }

    #[test]
    fn test_open_now_with_default_hours() {
        let record = card(json!({
            "name": "Cafe",
            "config_sections": { "business_hours": { "hours": [
                { "day": "Monday", "open_time": "08:00", "close_time": "09:00" }
            ]}}
        }));
        let page = render_card(&store(), "restaurant", &record, &options()).expect("render");
        let Some(BlockKind::BusinessHours { status, .. }) =
            page.block("business_hours").map(|b| &b.kind)
        else {
            panic!("Expected hours");
        };
        assert_eq!(status, OPEN_NOW);

        let strict = PageOptions {
            hours_policy: HoursPolicy::WithinHours,
            ..options()
        };
        let page = render_card(&store(), "restaurant", &record, &strict).expect("render");
        let Some(BlockKind::BusinessHours { status, .. }) =
            page.block("business_hours").map(|b| &b.kind)
        else {
            panic!("Expected hours");
        };
        assert_eq!(status, CLOSED_NOW);
    }

    #[test]
    fn test_required_sections_survive_hiding() {
        let mut record = card(json!({ "name": "Firm" }));
        record.template_config.sections = vec![SavedSection::Entry {
            key: "header".to_string(),
            enabled: Some(false),
        }];
        record.template_config.section_settings.insert(
            "contact".to_string(),
            SectionSettings {
                enabled: Some(false),
            },
        );
        let page = render_card(&store(), "law-firm", &record, &options()).expect("render");
        assert!(page.block("header").is_some());
        assert!(page.block("contact").is_some());
    }

    #[test]
    fn test_unknown_category() {
        let result = render_card(&store(), "spaceport", &BusinessCard::default(), &options());
        assert!(matches!(result, Err(CardError::UnknownTemplate(_))));
    }

    #[test]
    fn test_resolve_colors_and_font() {
        let mut template = store()
            .get("gym")
            .map(|t| (*t).clone())
            .expect("gym template");
        template.default_colors.insert("highlight".to_string(), "red".to_string());
        template.font_options = vec![FontOption {
            name: "Inter".to_string(),
            value: "'Inter', sans-serif".to_string(),
        }];
        template.default_font = "Roboto".to_string();

        let colors = resolve_colors(&ColorSet::new(), &template);
        assert_eq!(colors["highlight"], "#000000");
        assert!(COLOR_SLOTS.iter().all(|slot| colors.contains_key(*slot)));

        assert_eq!(resolve_font(None, &template), "Roboto");
        assert_eq!(resolve_font(Some("  "), &template), "Roboto");
        assert_eq!(resolve_font(Some("inter"), &template), "'Inter', sans-serif");
        assert_eq!(resolve_font(Some("Comic Neue"), &template), "Comic Neue");
        assert_eq!(resolve_font(Some("x;}</style>"), &template), "Roboto");
    }
}
