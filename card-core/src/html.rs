//! Paint a [`RenderedPage`] as a standalone HTML document.
//!
//! Block text is already escaped by the renderer and is inserted verbatim.
//! Link targets are only scheme-checked, so they are attribute-escaped here.

use std::fmt::Write;

use crate::block::{BlockKind, ContactKind, FieldLine, RenderedBlock};
use crate::page::RenderedPage;
use crate::video::VideoEmbed;

/// Paint the page into an HTML document.
#[must_use]
pub fn paint_page(page: &RenderedPage) -> String {
    let mut html = String::with_capacity(8192);
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"{}\" dir=\"{}\"><head><meta charset=\"utf-8\">",
        escape_attr(&page.language),
        page.direction.as_str(),
    );
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    let title = page
        .blocks
        .iter()
        .find_map(|b| match &b.kind {
            BlockKind::Header { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .unwrap_or(page.template_name.as_str());
    let _ = write!(html, "<title>{title}</title>");

    html.push_str("<style>:root{");
    for (slot, color) in &page.colors {
        let _ = write!(html, "--color-{}:{};", css_ident(slot), css_value(color));
    }
    for (token, value) in &page.theme_style {
        let _ = write!(html, "--{}:{};", css_ident(token), css_value(value));
    }
    let _ = write!(
        html,
        "}}body{{margin:0;font-family:{};color:var(--color-text);background:var(--color-background)}}",
        css_value(&page.font),
    );
    html.push_str(
        "section{padding:1rem 1.5rem}h2{color:var(--color-primary)}\
         .badge{padding:.2rem .6rem;border-radius:1rem;background:var(--color-accent)}\
         .review[hidden]{display:none}</style></head><body>",
    );

    let _ = write!(
        html,
        "<main class=\"card card-{}\">",
        css_ident(&page.category)
    );
    for block in &page.blocks {
        paint_block(&mut html, block);
    }
    html.push_str("</main></body></html>");
    html
}

fn paint_block(html: &mut String, block: &RenderedBlock) {
    let _ = write!(
        html,
        "<section id=\"{}\" class=\"block block-{}\">",
        escape_attr(&block.key),
        block.kind.type_name(),
    );
    if !matches!(block.kind, BlockKind::Header { .. }) {
        let _ = write!(html, "<h2>{}</h2>", block.title);
    }

    match &block.kind {
        BlockKind::Header {
            name,
            subtitle,
            tagline,
            logo,
            cover_image,
        } => {
            if let Some(cover) = cover_image {
                let _ = write!(html, "<img class=\"cover\" src=\"{}\" alt=\"\">", escape_attr(cover));
            }
            if let Some(logo) = logo {
                let _ = write!(html, "<img class=\"logo\" src=\"{}\" alt=\"\">", escape_attr(logo));
            }
            let _ = write!(html, "<h1>{name}</h1>");
            if let Some(subtitle) = subtitle {
                let _ = write!(html, "<p class=\"subtitle\">{subtitle}</p>");
            }
            if let Some(tagline) = tagline {
                let _ = write!(html, "<p class=\"tagline\">{tagline}</p>");
            }
        }

        BlockKind::About {
            description,
            highlights,
            year_established,
        } => {
            let _ = write!(html, "<p>{description}</p>");
            if let Some(year) = year_established {
                let _ = write!(html, "<p class=\"since\">Since {year}</p>");
            }
            paint_list(html, "highlights", highlights.iter().map(String::as_str));
        }

        BlockKind::Contact { items } => {
            html.push_str("<ul class=\"contact\">");
            for item in items {
                let class = match item.kind {
                    ContactKind::Email => "email",
                    ContactKind::Phone => "phone",
                    ContactKind::Website => "website",
                    ContactKind::Address => "address",
                };
                let _ = write!(html, "<li class=\"{class}\">");
                paint_link(html, item.href.as_deref(), &item.label);
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }

        BlockKind::BusinessHours { status, open, rows } => {
            let state = if *open { "open" } else { "closed" };
            let _ = write!(html, "<span class=\"badge {state}\">{status}</span><table>");
            for row in rows {
                let class = if row.today { " class=\"today\"" } else { "" };
                let _ = write!(
                    html,
                    "<tr{class}><th>{}</th><td>{}</td></tr>",
                    row.day, row.hours
                );
            }
            html.push_str("</table>");
        }

        BlockKind::Testimonials {
            reviews,
            rotation,
            interval_ms,
        } => {
            let _ = write!(
                html,
                "<div class=\"reviews\" data-interval=\"{interval_ms}\">"
            );
            let current = rotation.current_index();
            for (index, review) in reviews.iter().enumerate() {
                let hidden = if index == current { "" } else { " hidden" };
                let _ = write!(html, "<blockquote class=\"review\"{hidden}><p>{}</p>", review.text);
                if let Some(rating) = review.rating {
                    let stars = "\u{2605}".repeat(usize::from(rating));
                    let _ = write!(html, "<span class=\"rating\">{stars}</span>");
                }
                if let Some(author) = &review.author {
                    let _ = write!(html, "<cite>{author}</cite>");
                }
                html.push_str("</blockquote>");
            }
            html.push_str("</div>");
        }

        BlockKind::Gallery { images } => {
            html.push_str("<div class=\"gallery\">");
            for image in images {
                let _ = write!(
                    html,
                    "<figure><img src=\"{}\" alt=\"{}\">",
                    escape_attr(&image.src),
                    image.caption.as_deref().unwrap_or_default(),
                );
                if let Some(caption) = &image.caption {
                    let _ = write!(html, "<figcaption>{caption}</figcaption>");
                }
                html.push_str("</figure>");
            }
            html.push_str("</div>");
        }

        BlockKind::Videos { videos } => {
            for video in videos {
                html.push_str("<div class=\"video\">");
                if let Some(title) = &video.title {
                    let _ = write!(html, "<h3>{title}</h3>");
                }
                match &video.embed {
                    VideoEmbed::RawIframe { markup } => html.push_str(markup),
                    VideoEmbed::Platform { url, .. } => {
                        let _ = write!(
                            html,
                            "<iframe src=\"{}\" allowfullscreen loading=\"lazy\"></iframe>",
                            escape_attr(url)
                        );
                    }
                    VideoEmbed::Placeholder => {
                        html.push_str("<div class=\"video-placeholder\">Video unavailable</div>");
                    }
                }
                html.push_str("</div>");
            }
        }

        BlockKind::Social { links } => {
            html.push_str("<ul class=\"social\">");
            for link in links {
                html.push_str("<li>");
                paint_link(html, Some(&link.url), &link.platform);
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }

        BlockKind::Items { items } => {
            html.push_str("<ul class=\"items\">");
            for item in items {
                html.push_str("<li>");
                if let Some(image) = &item.image {
                    let _ = write!(html, "<img src=\"{}\" alt=\"\">", escape_attr(image));
                }
                let _ = write!(html, "<h3>{}</h3>", item.title);
                if let Some(subtitle) = &item.subtitle {
                    let _ = write!(html, "<p class=\"subtitle\">{subtitle}</p>");
                }
                if let Some(price) = &item.price {
                    let _ = write!(html, "<span class=\"price\">{price}</span>");
                }
                if let Some(description) = &item.description {
                    let _ = write!(html, "<p>{description}</p>");
                }
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }

        BlockKind::Appointments {
            booking_url,
            phone,
            phone_href,
            note,
        } => {
            if let Some(url) = booking_url {
                paint_link(html, Some(url), "Book online");
            }
            if let Some(phone) = phone {
                paint_link(html, phone_href.as_deref(), phone);
            }
            if let Some(note) = note {
                let _ = write!(html, "<p>{note}</p>");
            }
        }

        BlockKind::Location { address, map_url } => {
            let _ = write!(html, "<address>{address}</address>");
            paint_link(html, Some(map_url), "View map");
        }

        BlockKind::ActionButtons { buttons } => {
            for button in buttons {
                let _ = write!(
                    html,
                    "<a class=\"button\" href=\"{}\">{}</a>",
                    escape_attr(&button.url),
                    button.label
                );
            }
        }

        BlockKind::LanguageSelector {
            current,
            direction,
            options,
        } => {
            let _ = write!(
                html,
                "<select class=\"language\" data-current=\"{current}\" data-dir=\"{}\">",
                direction.as_str()
            );
            for option in options {
                let selected = if option.selected { " selected" } else { "" };
                let _ = write!(
                    html,
                    "<option value=\"{}\"{selected}>{} {}</option>",
                    option.code, option.flag, option.name
                );
            }
            html.push_str("</select>");
        }

        BlockKind::QrShare { payload, caption } => {
            if let Some(caption) = caption {
                let _ = write!(html, "<p>{caption}</p>");
            }
            let url = escape_attr(payload.qr_text());
            let _ = write!(
                html,
                "<div class=\"qr\" data-qr=\"{url}\"></div><a href=\"{url}\">{url}</a>"
            );
            if !payload.social_links.is_empty() {
                html.push_str("<ul class=\"social\">");
                for link in &payload.social_links {
                    html.push_str("<li>");
                    paint_link(html, Some(&link.url), &link.platform);
                    html.push_str("</li>");
                }
                html.push_str("</ul>");
            }
        }

        BlockKind::Copyright { text } => {
            let _ = write!(html, "<small>{text}</small>");
        }

        BlockKind::Fields { fields, groups } => {
            paint_fields(html, fields);
            for group in groups {
                let _ = write!(html, "<h3>{}</h3>", group.label);
                for row in &group.rows {
                    paint_fields(html, row);
                }
            }
        }
    }

    html.push_str("</section>");
}

fn paint_link(html: &mut String, href: Option<&str>, label: &str) {
    match href {
        Some(href) => {
            let _ = write!(html, "<a href=\"{}\">{label}</a>", escape_attr(href));
        }
        None => {
            let _ = write!(html, "<span>{label}</span>");
        }
    }
}

fn paint_list<'a>(html: &mut String, class: &str, items: impl Iterator<Item = &'a str>) {
    let mut items = items.peekable();
    if items.peek().is_none() {
        return;
    }
    let _ = write!(html, "<ul class=\"{class}\">");
    for item in items {
        let _ = write!(html, "<li>{item}</li>");
    }
    html.push_str("</ul>");
}

fn paint_fields(html: &mut String, fields: &[FieldLine]) {
    if fields.is_empty() {
        return;
    }
    html.push_str("<dl>");
    for field in fields {
        let _ = write!(html, "<dt>{}</dt><dd>{}</dd>", field.label, field.value);
    }
    html.push_str("</dl>");
}

/// Escape a value for a double-quoted attribute.
fn escape_attr(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn css_ident(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

fn css_value(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';' | '\\'))
        .collect()
}
