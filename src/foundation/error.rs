//! Crate-wide error and result types.

/// Crate-wide result alias.
pub type VerseResult<T> = Result<T, VerseError>;

/// Errors that cross the render/store boundary.
///
/// Asset-resolution problems below the boundary (missing background, unknown
/// font name, bad color string) are absorbed by fallback chains and never
/// surface here; only validation, font-chain exhaustion, and output encoding
/// failures do.
#[derive(thiserror::Error, Debug)]
pub enum VerseError {
    /// Caller-supplied input was rejected before rendering started.
    #[error("validation error: {0}")]
    Validation(String),

    /// Every stage of the font fallback chain failed.
    #[error("asset error: {0}")]
    Asset(String),

    /// Final image serialization failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped I/O or library error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VerseError {
    /// Build a [`VerseError::Validation`] from a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VerseError::Asset`] from a message.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`VerseError::Encode`] from a message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
