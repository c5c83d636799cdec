//! Video embed resolution.
//!
//! A card's video field holds either a link (`https://youtu.be/...`) or a
//! pasted `<iframe>` snippet. Links are classified by host and normalized
//! into the platform's embed URL; snippets are passed through as raw markup.
//! Anything unrecognised resolves to a placeholder, never to a broken embed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::sanitize::{iframe_src, sanitize_embed_url};

/// Video hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPlatform {
    /// YouTube.
    YouTube,
    /// Vimeo.
    Vimeo,
    /// Dailymotion.
    Dailymotion,
    /// Wistia.
    Wistia,
    /// Brightcove.
    Brightcove,
}

impl VideoPlatform {
    /// Classify a hostname.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let matches = |domain: &str| {
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        };

        if matches("youtube.com") || matches("youtu.be") || matches("youtube-nocookie.com") {
            Some(Self::YouTube)
        } else if matches("vimeo.com") {
            Some(Self::Vimeo)
        } else if matches("dailymotion.com") || matches("dai.ly") {
            Some(Self::Dailymotion)
        } else if matches("wistia.com") || matches("wistia.net") {
            Some(Self::Wistia)
        } else if matches("brightcove.com") || matches("brightcove.net") {
            Some(Self::Brightcove)
        } else {
            None
        }
    }
}

/// A classified, normalized video link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    /// Hosting platform.
    pub platform: VideoPlatform,
    /// Embeddable URL for the platform's player.
    pub normalized_url: String,
}

/// Resolve a raw video link into a platform descriptor.
///
/// Returns `None` for non-HTTP(S) URLs, unknown hosts, unparsable input and
/// recognised hosts whose video id cannot be found.
#[must_use]
pub fn resolve(raw: &str) -> Option<VideoDescriptor> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let platform = VideoPlatform::from_host(url.host_str()?)?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let normalized_url = match platform {
        VideoPlatform::YouTube => {
            let id = youtube_id(&url, &segments)?;
            format!("https://www.youtube.com/embed/{id}")
        }
        VideoPlatform::Vimeo => {
            let id = segments
                .iter()
                .rev()
                .find(|seg| seg.chars().all(|c| c.is_ascii_digit()))?;
            format!("https://player.vimeo.com/video/{id}")
        }
        VideoPlatform::Dailymotion => {
            let id = match segments.as_slice() {
                ["video", id, ..] | ["embed", "video", id, ..] => *id,
                [id] if url.host_str().is_some_and(|h| h.ends_with("dai.ly")) => *id,
                _ => return None,
            };
            let id = id.split('_').next().filter(|s| !s.is_empty())?;
            format!("https://www.dailymotion.com/embed/video/{id}")
        }
        VideoPlatform::Wistia => {
            let id = match segments.as_slice() {
                ["medias", id, ..] | ["embed", "iframe", id, ..] | ["embed", "medias", id, ..] => {
                    *id
                }
                _ => return None,
            };
            let id = id.trim_end_matches(".jsonp");
            format!("https://fast.wistia.net/embed/iframe/{id}")
        }
        VideoPlatform::Brightcove => url.to_string(),
    };

    Some(VideoDescriptor {
        platform,
        normalized_url,
    })
}

fn youtube_id(url: &Url, segments: &[&str]) -> Option<String> {
    let id = if url.host_str().is_some_and(|h| h.ends_with("youtu.be")) {
        segments.first().map(|s| (*s).to_string())
    } else {
        match segments {
            ["watch", ..] => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            ["embed" | "shorts" | "live" | "v", id, ..] => Some((*id).to_string()),
            _ => None,
        }
    }?;

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(id)
}

/// Where a raw video field value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedSource<'a> {
    /// Pre-built `<iframe>` markup.
    RawIframe(&'a str),
    /// A link to classify.
    Url(&'a str),
}

/// Route a raw field value to the iframe path or the URL path.
#[must_use]
pub fn classify_embed(raw: &str) -> EmbedSource<'_> {
    if raw.to_ascii_lowercase().contains("<iframe") {
        EmbedSource::RawIframe(raw)
    } else {
        EmbedSource::Url(raw.trim())
    }
}

/// How pasted iframe markup is treated at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IframePolicy {
    /// Markup is trusted as entered (it passed validation at data entry).
    #[default]
    Trusted,
    /// The iframe `src` is checked against the embed allow-list again.
    Revalidate,
}

/// Renderable outcome of a video field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VideoEmbed {
    /// Inject the markup as-is.
    RawIframe {
        /// Iframe markup.
        markup: String,
    },
    /// Platform player widget.
    Platform {
        /// Hosting platform.
        platform: VideoPlatform,
        /// Player URL.
        url: String,
    },
    /// "No video" placeholder.
    Placeholder,
}

impl VideoEmbed {
    /// Resolve a raw video field value under the given iframe policy.
    #[must_use]
    pub fn from_raw(raw: &str, policy: IframePolicy) -> Self {
        match classify_embed(raw) {
            EmbedSource::RawIframe(markup) => match policy {
                IframePolicy::Trusted => Self::RawIframe {
                    markup: markup.to_string(),
                },
                IframePolicy::Revalidate => {
                    let allowed = iframe_src(markup)
                        .is_some_and(|src| !sanitize_embed_url(&src).is_empty());
                    if allowed {
                        Self::RawIframe {
                            markup: markup.to_string(),
                        }
                    } else {
                        tracing::debug!("Iframe source failed re-validation");
                        Self::Placeholder
                    }
                }
            },
            EmbedSource::Url(link) => match resolve(link) {
                Some(descriptor) => Self::Platform {
                    platform: descriptor.platform,
                    url: descriptor.normalized_url,
                },
                None => {
                    tracing::debug!("Video link not recognised, using placeholder");
                    Self::Placeholder
                }
            },
        }
    }

    /// Check if this is the placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}
