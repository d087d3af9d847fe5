//! Engine error types

use crate::tag::Tag;
use thiserror::Error;

/// Merge failure under strict type checking
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Target and source classify differently
    #[error("cannot merge {} into {}", .incoming.name(), .target.name())]
    Incompatible {
        /// Tag of the target operand
        target: Tag,
        /// Tag of the source operand
        incoming: Tag,
    },
}

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON text did not match the configuration schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for merge operations
pub type MergeResult<T> = std::result::Result<T, MergeError>;
