// =============================================================================
// Core error taxonomy
// =============================================================================
//
// Only parameter problems surface as errors. Missing statement data is never
// an error; it shows up as a `RatioGap` on the affected series instead.

use thiserror::Error;

/// Errors raised by the indicator and ratio engines.
///
/// Both variants are raised before any computation starts, so a caller never
/// observes a partially built result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A window, span, period, interval or other parameter is out of range
    /// or malformed.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The requested indicator kind is not one the engine knows.
    #[error("unsupported indicator `{0}`")]
    UnsupportedIndicator(String),
}

impl CoreError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
