//! Wrapper objects
//!
//! Chainable wrapper objects (`_(value)`-style) hold the value they wrap
//! under a marker property. Equality and merge see through a wrapper to the
//! wrapped value. [`WrapperProbe`] is the single place that decides what
//! counts as a wrapper.

use replica_value::{PropertyKey, Value};

/// Marker property used by [`MarkerProbe::default`]
pub const DEFAULT_WRAPPER_MARKER: &str = "__wrapped__";

/// Detects wrapper objects
pub trait WrapperProbe: Send + Sync {
    /// The wrapped value when `value` is a wrapper
    fn unwrap(&self, value: &Value) -> Option<Value>;
}

/// Treats an object with an own data property named by the marker as a
/// wrapper around that property's value.
#[derive(Debug, Clone)]
pub struct MarkerProbe {
    marker: PropertyKey,
}

impl MarkerProbe {
    /// Probe for a custom marker
    pub fn new(marker: &str) -> Self {
        Self {
            marker: PropertyKey::string(marker),
        }
    }
}

impl Default for MarkerProbe {
    fn default() -> Self {
        Self::new(DEFAULT_WRAPPER_MARKER)
    }
}

impl WrapperProbe for MarkerProbe {
    fn unwrap(&self, value: &Value) -> Option<Value> {
        let obj = value.as_object()?;
        if !matches!(obj.kind(), replica_value::ObjectKind::Ordinary) {
            return None;
        }
        obj.get_own_property(&self.marker)?.value().cloned()
    }
}

/// Never detects a wrapper
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl WrapperProbe for NoProbe {
    fn unwrap(&self, _value: &Value) -> Option<Value> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_value::ObjectBuilder;

    #[test]
    fn test_marker_probe() {
        let wrapper = ObjectBuilder::new()
            .property(DEFAULT_WRAPPER_MARKER, 5)
            .build();
        let probe = MarkerProbe::default();
        assert_eq!(probe.unwrap(&wrapper), Some(Value::int32(5)));
        assert_eq!(probe.unwrap(&Value::plain_object()), None);
        assert_eq!(probe.unwrap(&Value::int32(5)), None);
    }

    #[test]
    fn test_inherited_marker_is_ignored() {
        let proto = ObjectBuilder::new()
            .property(DEFAULT_WRAPPER_MARKER, 1)
            .build();
        let child = ObjectBuilder::new()
            .prototype(replica_value::Prototype::Object(proto.as_object().unwrap().clone()))
            .build();
        assert_eq!(MarkerProbe::default().unwrap(&child), None);
    }

    #[test]
    fn test_custom_marker_and_no_probe() {
        let wrapper = ObjectBuilder::new().property("inner", "x").build();
        assert_eq!(MarkerProbe::new("inner").unwrap(&wrapper), Some(Value::string("x")));
        assert_eq!(NoProbe.unwrap(&wrapper), None);
    }
}
