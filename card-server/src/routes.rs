//! API route handlers.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /api/templates` | [`list_templates`] |
//! | `GET /api/templates/{key}` | [`get_template`] |
//! | `POST /api/render` | [`render_json`] |
//! | `POST /api/render/html` | [`render_html`] |
//! | `POST /api/vcard` | [`export_vcard`] |
//! | `POST /api/share` | [`share_payload`] |

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use card_core::{
    paint_page, render_card, BusinessCard, RenderedPage, SharePayload, SocialLink,
    TemplateDefinition, VCard,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::metrics::{record_export, record_render};
use crate::validation::{
    validate_card, validate_category, validate_language, validate_page_url,
    validate_social_links, validate_vcard, ValidationError,
};
use crate::AppState;

/// Summary row of `GET /api/templates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Category key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Section keys in declared order.
    pub sections: Vec<String>,
}

/// Body of the render endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    /// Category key of the template.
    pub category: String,
    /// The saved card record.
    pub card: BusinessCard,
    /// Language code for the selector.
    #[serde(default)]
    pub language: Option<String>,
    /// Public page URL for the share widget.
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Body of `POST /api/share`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    /// Public page URL; the server's configured URL when absent.
    #[serde(default)]
    pub page_url: Option<String>,
    /// Social links to show next to the QR code.
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    /// Optional contact details for a MECARD code.
    #[serde(default)]
    pub card: Option<VCard>,
}

/// Response of `POST /api/share`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    /// The sanitized payload.
    #[serde(flatten)]
    pub payload: SharePayload,
    /// Text to encode in the QR code.
    pub qr_text: String,
    /// MECARD text when contact details were supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mecard: Option<String>,
}

/// List registered templates.
#[tracing::instrument(name = "list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<TemplateSummary>> {
    let summaries = state
        .store
        .iter()
        .map(|(key, template)| TemplateSummary {
            key: key.to_string(),
            name: template.name.clone(),
            sections: template.section_keys().map(str::to_string).collect(),
        })
        .collect();
    Json(summaries)
}

/// Fetch one template definition.
///
/// # Errors
///
/// 400 for a malformed key, 404 for an unknown one.
#[tracing::instrument(name = "get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<TemplateDefinition>> {
    validate_category(&key)?;
    let template = state.store.require(&key)?;
    Ok(Json(template.as_ref().clone()))
}

fn render_request(state: &AppState, request: RenderRequest) -> ApiResult<RenderedPage> {
    validate_category(&request.category)?;
    validate_card(&request.card)?;
    if let Some(code) = &request.language {
        validate_language(code)?;
    }
    if let Some(url) = &request.page_url {
        validate_page_url(url)?;
    }
    let options = state
        .config
        .page_options(request.language, request.page_url);
    Ok(render_card(
        &state.store,
        &request.category,
        &request.card,
        &options,
    )?)
}

/// Render a card to the page model.
///
/// # Errors
///
/// 400 for invalid input, 404 for an unknown category.
#[tracing::instrument(name = "render_json", skip_all, fields(category = %request.category))]
pub async fn render_json(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> ApiResult<Json<RenderedPage>> {
    let page = render_request(&state, request)?;
    record_render(&page.category, "json", page.omitted.len());
    tracing::debug!(blocks = page.blocks.len(), omitted = page.omitted.len(), "Rendered page");
    Ok(Json(page))
}

/// Render a card to a standalone HTML document.
///
/// # Errors
///
/// 400 for invalid input, 404 for an unknown category.
#[tracing::instrument(name = "render_html", skip_all, fields(category = %request.category))]
pub async fn render_html(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> ApiResult<Html<String>> {
    let page = render_request(&state, request)?;
    record_render(&page.category, "html", page.omitted.len());
    Ok(Html(paint_page(&page)))
}

/// File name for a vCard download: lowercase ASCII words joined by `-`.
fn vcard_filename(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "contact.vcf".to_string()
    } else {
        format!("{slug}.vcf")
    }
}

/// Export contact details as a vCard download.
///
/// # Errors
///
/// 400 when the name is empty or too long.
#[tracing::instrument(name = "export_vcard", skip_all)]
pub async fn export_vcard(Json(vcard): Json<VCard>) -> ApiResult<impl IntoResponse> {
    validate_vcard(&vcard)?;
    record_export("vcard");
    let disposition = format!("attachment; filename=\"{}\"", vcard_filename(&vcard.name));
    Ok((
        [
            (header::CONTENT_TYPE, "text/vcard; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        vcard.to_vcf(),
    ))
}

/// Build a QR share payload.
///
/// # Errors
///
/// 400 when no usable page URL is available.
#[tracing::instrument(name = "share_payload", skip_all)]
pub async fn share_payload(
    State(state): State<AppState>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<Json<ShareResponse>> {
    let url = request
        .page_url
        .or_else(|| state.config.public_url.clone())
        .ok_or(ValidationError::MissingUrl)?;
    validate_page_url(&url)?;
    validate_social_links(&request.social_links)?;
    if let Some(card) = &request.card {
        validate_vcard(card)?;
    }

    let payload = SharePayload::new(&url, &request.social_links);
    record_export("share");
    Ok(Json(ShareResponse {
        qr_text: payload.qr_text().to_string(),
        mecard: request.card.as_ref().map(VCard::to_mecard),
        payload,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcard_filename() {
        assert_eq!(vcard_filename("Ada Lovelace"), "ada-lovelace.vcf");
        assert_eq!(vcard_filename("O'Brien & Sons"), "o-brien-sons.vcf");
        assert_eq!(vcard_filename("株式会社"), "contact.vcf");
    }

    #[test]
    fn test_render_request_defaults() {
        let request: RenderRequest = serde_json::from_value(serde_json::json!({
            "category": "gym",
            "card": { "name": "Iron Works" }
        }))
        .expect("valid request");
        assert!(request.language.is_none());
        assert!(request.page_url.is_none());
        assert_eq!(request.card.name, "Iron Works");
    }

    #[test]
    fn test_share_response_flattens_payload() {
        let payload = SharePayload::new("https://cards.example.com/a", &[]);
        let response = ShareResponse {
            qr_text: payload.qr_text().to_string(),
            mecard: None,
            payload,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["url"], "https://cards.example.com/a");
        assert_eq!(json["qr_text"], "https://cards.example.com/a");
        assert!(json.get("mecard").is_none());
    }
}
