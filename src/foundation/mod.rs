//! Shared primitives: error types and the resolution tag.

pub mod error;
pub mod resolve;
