//! Shared helpers for the integration tests

#![allow(dead_code)]

use replica_value::{ObjectBuilder, PropertyKey, Value};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a tracing subscriber driven by `RUST_LOG` (once per test binary).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Plain object from `(key, value)` pairs
pub fn obj(entries: Vec<(&str, Value)>) -> Value {
    entries
        .into_iter()
        .fold(ObjectBuilder::new(), |builder, (k, v)| builder.property(k, v))
        .build()
}

/// Array of int32 values
pub fn ints(values: &[i32]) -> Value {
    Value::array(values.iter().map(|&v| Value::int32(v)).collect())
}

/// `a.self = a`, plus a `name` field
pub fn self_referential(name: &str) -> Value {
    let value = obj(vec![("name", Value::string(name))]);
    value.set_property("self", value.clone());
    value
}

/// Read an own or inherited property, panicking on getter failure
pub fn get(value: &Value, key: &str) -> Value {
    value.get(&PropertyKey::string(key)).unwrap()
}
