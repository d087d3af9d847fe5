//! JSON conversion
//!
//! Builds value trees from `serde_json::Value`: objects become plain
//! objects (key order preserved), arrays become dense arrays.

use crate::object::JsObject;
use crate::value::Value;

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => Value::boolean(*b),
            serde_json::Value::Number(n) => Value::number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                let obj = JsObject::ordinary();
                for (key, value) in map {
                    obj.set(key.as_str().into(), Value::from(value));
                }
                Value::from_object(obj)
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

impl Value {
    /// Parse JSON text into a value tree
    pub fn from_json_str(text: &str) -> Result<Value, serde_json::Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(&json))
    }
}
