//! Versecraft renders short user-authored verses onto themed 1080x1920
//! background images and keeps a small searchable archive of posts.
//!
//! The public API is compositor-oriented:
//!
//! - Scan an [`AssetCatalog`] from an assets root (backgrounds + fonts)
//! - Build a [`Compositor`] over it
//! - Feed it [`RenderRequest`]s and get PNG bytes plus a suggested filename
//!
//! Layout decisions (adaptive font size, character-count word wrap,
//! centering, contrast-aware shadows) live in [`layout`] and
//! [`render::compositor`]; asset fallback chains never fail a render, only
//! empty text and PNG encoding do.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod foundation;
pub mod layout;
pub mod render;
pub mod store;

pub use crate::assets::catalog::{AssetCatalog, DEFAULT_BACKGROUND, DEFAULT_FONT, FontFile, Theme};
pub use crate::assets::color::{Rgb, ShadowColor, parse_hex, resolve_color, shadow_for};
pub use crate::foundation::error::{VerseError, VerseResult};
pub use crate::foundation::resolve::Resolution;
pub use crate::layout::engine::{LineLayout, TextBlock, chars_per_line, font_size_for, wrap_words};
pub use crate::render::compositor::{
    CANVAS_HEIGHT, CANVAS_WIDTH, Compositor, RenderRequest, RenderedImage,
};
pub use crate::store::posts::{Post, PostFilter, PostStore, SortOrder};
