//! The layout engine.

pub mod engine;
