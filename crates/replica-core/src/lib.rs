//! Replica - deep equality, deep clone and deep merge over JavaScript-style
//! values.
//!
//! The free functions use default settings. For configured behavior build a
//! [`Comparator`], [`Cloner`] or [`Merger`] directly, optionally from a
//! [`ReplicaConfig`] loaded from JSON.
//!
//! ```ignore
//! use replica_core::{clone_deep, is_equal};
//! use replica_value::ObjectBuilder;
//!
//! let original = ObjectBuilder::new().property("a", 1).build();
//! let copy = clone_deep(&original);
//! assert!(is_equal(&original, &copy));
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod clone;
pub mod config;
pub mod equal;
pub mod error;
pub mod merge;
pub mod registry;
pub mod select;
pub mod stack;
pub mod tag;
pub mod wrapped;

pub use clone::Cloner;
pub use config::{ArrayPolicy, EqualityConfig, MergeOptions, ReplicaConfig};
pub use equal::{Comparator, Customizer};
pub use error::{ConfigError, MergeError, MergeResult};
pub use merge::Merger;
pub use registry::{PairRegistry, SeenRegistry};
pub use select::{omit, pick};
pub use tag::{PrimitiveTag, Tag, classify};
pub use wrapped::{DEFAULT_WRAPPER_MARKER, MarkerProbe, NoProbe, WrapperProbe};

use replica_value::Value;

/// Deep structural equality with default settings
pub fn is_equal(a: &Value, b: &Value) -> bool {
    Comparator::new().is_equal(a, b)
}

/// Deep equality with a customizer consulted on every pair. `Some` decides
/// the pair, `None` falls through to the default rules.
pub fn is_equal_with<F>(a: &Value, b: &Value, customizer: F) -> bool
where
    F: Fn(&Value, &Value) -> Option<bool>,
{
    Comparator::new().customizer(&customizer).is_equal(a, b)
}

/// Whether `object` contains everything in `source`
pub fn is_match(object: &Value, source: &Value) -> bool {
    Comparator::new().is_match(object, source)
}

/// Deep clone preserving shared references and cycles
pub fn clone_deep(value: &Value) -> Value {
    Cloner::new().clone(value)
}

/// Deep merge with concatenated arrays. On a type mismatch the source wins.
pub fn merge(target: &Value, source: &Value) -> Value {
    Merger::new().merge(target, source)
}

/// Deep merge with an explicit array policy. `None` when target and source
/// have different types.
pub fn merge_with_policy(target: &Value, source: &Value, policy: ArrayPolicy) -> Option<Value> {
    Merger::with_options(MergeOptions::with_policy(policy))
        .try_merge(target, source)
        .ok()
}
