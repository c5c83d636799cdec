//! Rendered blocks - the building blocks of a card page.
//!
//! Every string in a block has already been through the sanitizer: text is
//! HTML-escaped, links are scheme-checked and embed URLs are allow-listed.
//! Consumers insert block text verbatim.

use serde::{Deserialize, Serialize};

use crate::hours::HoursRow;
use crate::language::TextDirection;
use crate::rotation::Rotation;
use crate::sanitize::sanitize_text;
use crate::share::{SharePayload, SocialLink};
use crate::video::VideoEmbed;

/// One rendered section of a card page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBlock {
    /// Section key the block was rendered from.
    pub key: String,
    /// Section display name.
    pub title: String,
    /// Block content.
    pub kind: BlockKind,
}

impl RenderedBlock {
    /// Create a block.
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind,
        }
    }
}

/// The content of a rendered block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum BlockKind {
    /// Page header with the business name.
    Header {
        /// Business name.
        name: String,
        /// Title or category line.
        subtitle: Option<String>,
        /// Tagline.
        tagline: Option<String>,
        /// Logo image URL.
        logo: Option<String>,
        /// Cover image URL.
        cover_image: Option<String>,
    },

    /// Free-text description.
    About {
        /// Description paragraph.
        description: String,
        /// Highlight tags.
        highlights: Vec<String>,
        /// Year the business was established.
        year_established: Option<String>,
    },

    /// Contact channels.
    Contact {
        /// Channels in display order.
        items: Vec<ContactItem>,
    },

    /// Weekly opening hours with the open-now badge.
    BusinessHours {
        /// Badge text.
        status: String,
        /// Whether the badge says open.
        open: bool,
        /// One line per entered day.
        rows: Vec<HoursLine>,
    },

    /// Customer reviews with rotation state.
    Testimonials {
        /// Reviews in entered order.
        reviews: Vec<Review>,
        /// Initial rotation state.
        rotation: Rotation,
        /// Milliseconds between rotations.
        interval_ms: u64,
    },

    /// Image gallery.
    Gallery {
        /// Images in entered order.
        images: Vec<GalleryImage>,
    },

    /// Video embeds.
    Videos {
        /// Videos in entered order; unresolvable ones are placeholders.
        videos: Vec<VideoItem>,
    },

    /// Social profile links.
    Social {
        /// Sanitized links.
        links: Vec<SocialLink>,
    },

    /// List of offerings: services, menu items, products or team members.
    Items {
        /// Entries in entered order.
        items: Vec<ListItem>,
    },

    /// Booking call-to-action.
    Appointments {
        /// Online booking URL.
        booking_url: Option<String>,
        /// Phone number.
        phone: Option<String>,
        /// `tel:` link for the phone number.
        phone_href: Option<String>,
        /// Extra note.
        note: Option<String>,
    },

    /// Address with a map link.
    Location {
        /// Postal address.
        address: String,
        /// Map URL.
        map_url: String,
    },

    /// Call-to-action buttons.
    ActionButtons {
        /// Buttons in entered order.
        buttons: Vec<LinkButton>,
    },

    /// Language picker.
    LanguageSelector {
        /// Code of the selected language.
        current: String,
        /// Text direction of the selected language.
        direction: TextDirection,
        /// Selectable languages.
        options: Vec<LanguageOption>,
    },

    /// QR code share widget.
    QrShare {
        /// What the code encodes.
        payload: SharePayload,
        /// Caption shown above the code.
        caption: Option<String>,
    },

    /// Copyright footer.
    Copyright {
        /// Footer text.
        text: String,
    },

    /// Generic field listing for sections without a dedicated renderer.
    Fields {
        /// Scalar fields.
        fields: Vec<FieldLine>,
        /// Repeater fields.
        groups: Vec<FieldGroup>,
    },
}

impl BlockKind {
    /// Tag name used in serialized output and CSS classes.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Header { .. } => "header",
            Self::About { .. } => "about",
            Self::Contact { .. } => "contact",
            Self::BusinessHours { .. } => "business_hours",
            Self::Testimonials { .. } => "testimonials",
            Self::Gallery { .. } => "gallery",
            Self::Videos { .. } => "videos",
            Self::Social { .. } => "social",
            Self::Items { .. } => "items",
            Self::Appointments { .. } => "appointments",
            Self::Location { .. } => "location",
            Self::ActionButtons { .. } => "action_buttons",
            Self::LanguageSelector { .. } => "language_selector",
            Self::QrShare { .. } => "qr_share",
            Self::Copyright { .. } => "copyright",
            Self::Fields { .. } => "fields",
        }
    }
}

/// Kind of contact channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Website.
    Website,
    /// Postal address.
    Address,
}

/// A contact channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactItem {
    /// Channel kind.
    pub kind: ContactKind,
    /// Display text.
    pub label: String,
    /// Link target, if the channel is clickable.
    pub href: Option<String>,
}

/// One day in the hours table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursLine {
    /// Day label.
    pub day: String,
    /// `"09:00 - 17:00"` or `"Closed"`.
    pub hours: String,
    /// Closed all day.
    pub closed: bool,
    /// Row is for the current weekday.
    pub today: bool,
}

impl HoursLine {
    pub(crate) fn from_row(row: &HoursRow, today: bool) -> Self {
        let hours = if row.is_closed {
            "Closed".to_string()
        } else {
            match (row.open_time.is_empty(), row.close_time.is_empty()) {
                (false, false) => format!("{} - {}", row.open_time, row.close_time),
                (false, true) => row.open_time.clone(),
                (true, false) => row.close_time.clone(),
                (true, true) => String::new(),
            }
        };
        Self {
            day: sanitize_text(&row.day),
            hours: sanitize_text(&hours),
            closed: row.is_closed,
            today,
        }
    }
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer name.
    pub author: Option<String>,
    /// Review text.
    pub text: String,
    /// Star rating clamped to `1..=5`.
    pub rating: Option<u8>,
}

/// A gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Image URL.
    pub src: String,
    /// Caption.
    pub caption: Option<String>,
}

/// A video entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    /// Video title.
    pub title: Option<String>,
    /// Resolved embed.
    pub embed: VideoEmbed,
}

/// An entry in a services, menu, products or team list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Item title or person name.
    pub title: String,
    /// Role or secondary line.
    pub subtitle: Option<String>,
    /// Description or bio.
    pub description: Option<String>,
    /// Price.
    pub price: Option<String>,
    /// Image URL.
    pub image: Option<String>,
}

/// A labelled link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    /// Button text.
    pub label: String,
    /// Link target.
    pub url: String,
}

/// A language in the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    /// Language code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Flag emoji.
    pub flag: String,
    /// Currently selected.
    pub selected: bool,
}

/// A labelled value in a generic block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLine {
    /// Field label.
    pub label: String,
    /// Field value as text.
    pub value: String,
}

/// A repeater field in a generic block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// Repeater label.
    pub label: String,
    /// One list of field lines per row.
    pub rows: Vec<Vec<FieldLine>>,
}
