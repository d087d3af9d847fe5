//! Value model error types

use thiserror::Error;

/// Errors raised while constructing or mutating values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// RegExp pattern failed to compile
    #[error("SyntaxError: Invalid regular expression: /{pattern}/: {reason}")]
    InvalidRegExp {
        /// Pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Unknown or repeated RegExp flag
    #[error("SyntaxError: Invalid regular expression flags '{0}'")]
    InvalidRegExpFlags(String),

    /// Typed array or data view does not fit its buffer
    #[error("RangeError: {0}")]
    OutOfBounds(&'static str),

    /// Object passed where an ArrayBuffer is required
    #[error("TypeError: {0} is not an ArrayBuffer")]
    NotAnArrayBuffer(&'static str),

    /// Date string could not be parsed
    #[error("RangeError: Invalid time value '{0}'")]
    InvalidDate(String),
}

impl ValueError {
    /// Create an out-of-bounds error
    pub fn out_of_bounds(msg: &'static str) -> Self {
        Self::OutOfBounds(msg)
    }
}

/// Result type for value model operations
pub type ValueResult<T> = std::result::Result<T, ValueError>;
