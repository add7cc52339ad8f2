//! Asset resolution: colors, themes, and the background/font catalog.

pub mod catalog;
pub mod color;
