//! Engine configuration
//!
//! All settings have defaults matching the conventional utility-library
//! behavior, so `ReplicaConfig::default()` is what the free functions use.
//! A configuration can also be loaded from JSON; missing fields keep their
//! defaults.

use crate::error::ConfigError;
use crate::wrapped::DEFAULT_WRAPPER_MARKER;
use serde::{Deserialize, Serialize};

/// How merge combines two arrays. Defaults to `Replace`, the policy-driven
/// merge's default; plain [`merge`](crate::merge) always concatenates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayPolicy {
    /// Target elements followed by source elements
    Concat,
    /// Source elements only
    #[default]
    Replace,
}

/// Equality engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualityConfig {
    /// Treat `-0` and `+0` as different numbers.
    /// Default: false
    pub distinguish_negative_zero: bool,

    /// See through wrapper objects before comparing.
    /// Default: true
    pub unwrap_wrappers: bool,

    /// Own property that marks a wrapper object.
    /// Default: `"__wrapped__"`
    pub wrapper_marker: String,
}

impl Default for EqualityConfig {
    fn default() -> Self {
        Self {
            distinguish_negative_zero: false,
            unwrap_wrappers: true,
            wrapper_marker: DEFAULT_WRAPPER_MARKER.to_string(),
        }
    }
}

impl EqualityConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `-0` and `+0` as different.
    pub fn distinguish_negative_zero(mut self, enabled: bool) -> Self {
        self.distinguish_negative_zero = enabled;
        self
    }

    /// Enable or disable wrapper unwrapping.
    pub fn unwrap_wrappers(mut self, enabled: bool) -> Self {
        self.unwrap_wrappers = enabled;
        self
    }

    /// Set the wrapper marker property.
    pub fn wrapper_marker(mut self, marker: impl Into<String>) -> Self {
        self.wrapper_marker = marker.into();
        self
    }
}

/// Merge engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Array combination policy.
    /// Default: concat
    pub array_policy: ArrayPolicy,

    /// Refuse to merge operands of different types at the top level
    /// instead of letting the source win.
    /// Default: false
    pub strict_types: bool,

    /// See through wrapper objects before merging.
    /// Default: true
    pub unwrap_wrappers: bool,

    /// Own property that marks a wrapper object.
    /// Default: `"__wrapped__"`
    pub wrapper_marker: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            array_policy: ArrayPolicy::Concat,
            strict_types: false,
            unwrap_wrappers: true,
            wrapper_marker: DEFAULT_WRAPPER_MARKER.to_string(),
        }
    }
}

impl MergeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for policy-driven merging: strict types and the given policy.
    pub fn with_policy(policy: ArrayPolicy) -> Self {
        Self {
            array_policy: policy,
            strict_types: true,
            ..Default::default()
        }
    }

    /// Set the array policy.
    pub fn array_policy(mut self, policy: ArrayPolicy) -> Self {
        self.array_policy = policy;
        self
    }

    /// Enable or disable strict top-level type checking.
    pub fn strict_types(mut self, enabled: bool) -> Self {
        self.strict_types = enabled;
        self
    }

    /// Enable or disable wrapper unwrapping.
    pub fn unwrap_wrappers(mut self, enabled: bool) -> Self {
        self.unwrap_wrappers = enabled;
        self
    }

    /// Set the wrapper marker property.
    pub fn wrapper_marker(mut self, marker: impl Into<String>) -> Self {
        self.wrapper_marker = marker.into();
        self
    }
}

/// Configuration for all engines
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// Equality settings
    pub equality: EqualityConfig,
    /// Merge settings
    pub merge: MergeOptions,
}

impl ReplicaConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON text. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str(text)?;
        tracing::debug!(target: "replica::config", ?config, "configuration loaded");
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReplicaConfig::default();
        assert!(!config.equality.distinguish_negative_zero);
        assert!(config.equality.unwrap_wrappers);
        assert_eq!(config.equality.wrapper_marker, "__wrapped__");
        assert_eq!(config.merge.array_policy, ArrayPolicy::Concat);
        assert!(!config.merge.strict_types);
    }

    #[test]
    fn test_array_policy_defaults() {
        assert_eq!(ArrayPolicy::default(), ArrayPolicy::Replace);
        assert_eq!(MergeOptions::default().array_policy, ArrayPolicy::Concat);
        let options = MergeOptions::with_policy(ArrayPolicy::default());
        assert_eq!(options.array_policy, ArrayPolicy::Replace);
    }

    #[test]
    fn test_partial_json() {
        let config = ReplicaConfig::from_json_str(
            r#"{ "equality": { "distinguish_negative_zero": true }, "merge": { "array_policy": "replace" } }"#,
        )
        .unwrap();
        assert!(config.equality.distinguish_negative_zero);
        assert!(config.equality.unwrap_wrappers);
        assert_eq!(config.merge.array_policy, ArrayPolicy::Replace);
    }

    #[test]
    fn test_invalid_json() {
        let err = ReplicaConfig::from_json_str(r#"{ "merge": { "array_policy": "zip" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ReplicaConfig {
            equality: EqualityConfig::new().wrapper_marker("inner"),
            merge: MergeOptions::with_policy(ArrayPolicy::Replace),
        };
        let text = config.to_json_string().unwrap();
        assert_eq!(ReplicaConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_builder_setters() {
        let options = MergeOptions::new()
            .array_policy(ArrayPolicy::Replace)
            .strict_types(true)
            .unwrap_wrappers(false);
        assert_eq!(options.array_policy, ArrayPolicy::Replace);
        assert!(options.strict_types);
        assert!(!options.unwrap_wrappers);
    }
}
