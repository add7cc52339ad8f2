//! Post persistence.

pub mod posts;
