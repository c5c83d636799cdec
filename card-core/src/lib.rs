//! # Card Core
//!
//! Section-driven rendering pipeline for digital business cards.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 card-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Template Store  │  Sanitizer               │
//! │  - Definitions   │  - Text escaping         │
//! │  - Defaults      │  - Link / embed checks   │
//! ├─────────────────────────────────────────────┤
//! │  Section Merger  │  Section Orderer         │
//! │  - User content  │  - Saved order           │
//! │  - Fallbacks     │  - Visibility toggles    │
//! ├─────────────────────────────────────────────┤
//! │  Renderer        │  Exports                 │
//! │  - Hours, video  │  - HTML page             │
//! │  - Reviews, i18n │  - vCard / MECARD        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod content;
pub mod error;
pub mod hours;
pub mod html;
pub mod language;
pub mod merge;
pub mod order;
pub mod page;
pub mod record;
pub mod render;
pub mod rotation;
pub mod sanitize;
pub mod schema;
pub mod share;
pub mod store;
pub mod vcard;
pub mod video;

pub use block::{BlockKind, RenderedBlock};
pub use error::{CardError, CardResult};
pub use hours::{BusinessHours, Clock, HoursPolicy};
pub use html::paint_page;
pub use language::{Language, LanguageState, TextDirection};
pub use merge::{merge_sections, ConfigSections};
pub use order::{compute_order, SectionLayout};
pub use page::{render_card, render_page, PageOptions, RenderedPage};
pub use record::{BusinessCard, SavedSection, SectionSettings, TemplateConfig};
pub use render::{RenderContext, RenderFn, Renderer};
pub use rotation::{Rotation, RotationTimer};
pub use schema::{
    ColorPreset, ColorSet, FieldDescriptor, FieldOption, FieldType, FontOption, SectionContent,
    SectionDescriptor, TemplateDefinition,
};
pub use share::{SharePayload, SocialLink};
pub use store::TemplateStore;
pub use vcard::VCard;
pub use video::{IframePolicy, VideoDescriptor, VideoEmbed, VideoPlatform};

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
