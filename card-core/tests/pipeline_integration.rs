//! Card Pipeline Integration Tests
//!
//! Tests the complete flow from a saved card record to painted output:
//! - Built-in templates and directory overrides
//! - Merge, order and render over real templates
//! - Sanitization of hostile content end to end
//! - HTML, vCard and share exports

use card_core::{
    paint_page, render_card, BlockKind, BusinessCard, Clock, IframePolicy, PageOptions,
    SharePayload, SocialLink, TemplateStore, TextDirection, VCard, VideoEmbed,
};
use chrono::{NaiveTime, Weekday};
use serde_json::json;

/// Fixed Monday-noon options.
fn options() -> PageOptions {
    PageOptions {
        clock: Some(Clock::new(
            Weekday::Mon,
            NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
        )),
        year: Some(2024),
        page_url: Some("https://cards.example.com/acme".to_string()),
        ..PageOptions::default()
    }
}

fn card(value: serde_json::Value) -> BusinessCard {
    serde_json::from_value(value).expect("valid card")
}

// ============================================================================
// Template Store
// ============================================================================

#[test]
fn test_builtin_templates_all_render() {
    let store = TemplateStore::builtin().expect("built-in templates load");
    assert!(store.len() >= 4);

    for key in store.keys() {
        let page = render_card(&store, key, &card(json!({ "name": "Acme" })), &options())
            .expect("render");
        assert_eq!(page.category, key);
        assert!(
            page.block("header").is_some(),
            "{key} should always render a header"
        );
        assert!(
            page.block("contact").is_some(),
            "{key} should always render contact details"
        );
    }
}

#[test]
fn test_directory_template_overrides_builtin() {
    let dir = tempfile::tempdir().expect("temp dir");
    let template = json!({
        "name": "Bakery",
        "sections": [
            { "key": "header", "name": "Header", "required": true,
              "fields": [{ "name": "name", "type": "text", "label": "Name" }] },
            { "key": "specials", "name": "Today's Specials",
              "fields": [{ "name": "special", "type": "text", "label": "Special" }] }
        ],
        "defaultData": {
            "header": { "name": "Crumbs" },
            "specials": { "special": "Sourdough" }
        }
    });
    std::fs::write(
        dir.path().join("bakery.json"),
        serde_json::to_string(&template).expect("serialize"),
    )
    .expect("write template");

    let mut store = TemplateStore::builtin().expect("built-ins");
    let loaded = store.load_dir(dir.path()).expect("load dir");
    assert_eq!(loaded, vec!["bakery".to_string()]);

    let page = render_card(&store, "bakery", &card(json!({ "name": "Crumbs" })), &options())
        .expect("render");
    let keys: Vec<&str> = page.block_keys().collect();
    assert_eq!(keys, vec!["header", "specials"]);
    let specials = page.block("specials").expect("specials block");
    assert_eq!(specials.title, "Today&#x27;s Specials");
    assert!(matches!(specials.kind, BlockKind::Fields { .. }));
}

// ============================================================================
// Hostile Content
// ============================================================================

#[test]
fn test_hostile_content_is_neutralised() {
    let record = card(json!({
        "name": "<script>alert('x')</script>",
        "config_sections": {
            "header": { "name": "<script>alert('x')</script>", "logo": "javascript:alert(1)" },
            "contact": { "email": "a@b.c", "website": "vbscript:msgbox" },
            "social": { "social_links": [{ "platform": "x", "url": "data:text/html,<b>" }] },
            "action_buttons": { "buttons": [{ "label": "<img onerror=x>", "url": "https://ok.example" }] }
        }
    }));
    let store = TemplateStore::builtin().expect("built-ins");
    let page = render_card(&store, "gym", &record, &options()).expect("render");

    let html = paint_page(&page);
    assert!(!html.contains("<script"));
    assert!(!html.contains("src=\"javascript:"));
    assert!(!html.contains("href=\"vbscript:"));
    assert!(!html.contains("data:text"));
    assert!(!html.contains("<img onerror"));
    assert!(page.block("social").is_none());
}

#[test]
fn test_untrusted_iframe_under_revalidation() {
    let record = card(json!({
        "name": "Gym",
        "config_sections": {
            "videos": { "videos": [
                { "title": "Evil", "embed_url": "<iframe src=\"https://evil.example.com/x\"></iframe>" },
                { "title": "Tour", "embed_url": "<iframe src=\"https://www.youtube.com/embed/abc\"></iframe>" }
            ]}
        }
    }));
    let store = TemplateStore::builtin().expect("built-ins");
    let strict = PageOptions {
        iframe_policy: IframePolicy::Revalidate,
        ..options()
    };
    let page = render_card(&store, "gym", &record, &strict).expect("render");

    let Some(BlockKind::Videos { videos }) = page.block("videos").map(|b| &b.kind) else {
        panic!("Expected videos block");
    };
    assert!(videos[0].embed.is_placeholder());
    assert!(matches!(videos[1].embed, VideoEmbed::RawIframe { .. }));
}

// ============================================================================
// Exports
// ============================================================================

#[test]
fn test_html_export_for_rtl_page() {
    let store = TemplateStore::builtin().expect("built-ins");
    let opts = PageOptions {
        language: Some("ar".to_string()),
        ..options()
    };
    let page = render_card(&store, "podcast", &card(json!({ "name": "Cast" })), &opts)
        .expect("render");
    assert_eq!(page.direction, TextDirection::Rtl);

    let html = paint_page(&page);
    assert!(html.contains("dir=\"rtl\""));
    assert!(html.contains("data-qr=\"https://cards.example.com/acme\""));
}

#[test]
fn test_vcard_from_record_round_trips() {
    let record = card(json!({
        "name": "Ada Lovelace",
        "title": "Analyst",
        "email": "ada@example.com",
        "phone": "+44 20 7946 0000",
        "website": "https://example.com",
        "address": "12 St James's Sq, London"
    }));
    let vcard = VCard::from(&record);
    let parsed = VCard::parse(&vcard.to_vcf()).expect("parse");
    assert_eq!(parsed, vcard);
    assert!(vcard.to_mecard().starts_with("MECARD:N:Ada Lovelace;"));
}

#[test]
fn test_share_payload_matches_page_widget() {
    let links = vec![
        SocialLink::new("instagram", "https://instagram.com/acme"),
        SocialLink::new("evil", "javascript:alert(1)"),
    ];
    let payload = SharePayload::new("https://cards.example.com/acme", &links);
    assert_eq!(payload.social_links.len(), 1);

    let record = card(json!({
        "name": "Acme",
        "config_sections": { "social": { "social_links": [
            { "platform": "instagram", "url": "https://instagram.com/acme" },
            { "platform": "evil", "url": "javascript:alert(1)" }
        ]}}
    }));
    let store = TemplateStore::builtin().expect("built-ins");
    let page = render_card(&store, "restaurant", &record, &options()).expect("render");
    let Some(BlockKind::QrShare { payload: widget, .. }) =
        page.block("qr_share").map(|b| &b.kind)
    else {
        panic!("Expected QR share block");
    };
    assert_eq!(widget, &payload);
}
