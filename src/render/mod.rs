//! The compositor and its text rasterization helpers.

pub mod compositor;
pub(crate) mod text;
