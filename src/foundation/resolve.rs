//! Resolution tag reported by asset fallback chains.

/// Outcome tag for one stage of an asset fallback chain.
///
/// Every recoverable resolution (background, color, font) reports whether the
/// caller's request was honored or a fallback was substituted, so callers can
/// log degradations without changing control flow. Chain exhaustion is an
/// error at the call site, not a variant here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The requested value was used as-is.
    Primary(T),
    /// A substitute was used; `reason` says why the request was not honored.
    Fallback {
        /// The substituted value.
        value: T,
        /// Human-readable cause, suitable for a warning log line.
        reason: String,
    },
}

impl<T> Resolution<T> {
    /// Build a fallback with a reason message.
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self::Fallback {
            value,
            reason: reason.into(),
        }
    }

    /// Return the resolved value, discarding the tag.
    pub fn into_value(self) -> T {
        match self {
            Self::Primary(v) => v,
            Self::Fallback { value, .. } => value,
        }
    }

    /// Return the resolved value by reference.
    pub fn value(&self) -> &T {
        match self {
            Self::Primary(v) => v,
            Self::Fallback { value, .. } => value,
        }
    }

    /// Return `true` when a fallback was substituted.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Return the fallback reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Primary(_) => None,
            Self::Fallback { reason, .. } => Some(reason.as_str()),
        }
    }

    /// Map the resolved value, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Primary(v) => Resolution::Primary(f(v)),
            Self::Fallback { value, reason } => Resolution::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}
