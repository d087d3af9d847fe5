//! Shallow key selection: `pick` and `omit`

use replica_value::{JsObject, PropertyKey, Value};
use rustc_hash::FxHashSet;

/// New plain object with those of `keys` that `object` has, own or
/// inherited. Values are not copied.
pub fn pick(object: &Value, keys: &[PropertyKey]) -> Value {
    let result = JsObject::ordinary();
    if let Some(obj) = object.as_object() {
        for key in keys {
            if !obj.has_property(key) {
                continue;
            }
            match obj.get(key, object) {
                Ok(value) => {
                    result.set(key.clone(), value);
                }
                Err(error) => {
                    tracing::debug!(
                        target: "replica::select",
                        ?key,
                        %error,
                        "getter failed, key skipped"
                    );
                }
            }
        }
    }
    Value::from_object(result)
}

/// New plain object with every own enumerable key of `object` except
/// `keys`. Values are not copied.
pub fn omit(object: &Value, keys: &[PropertyKey]) -> Value {
    let result = JsObject::ordinary();
    if let Some(obj) = object.as_object() {
        let excluded: FxHashSet<&PropertyKey> = keys.iter().collect();
        for key in obj.own_enumerable_keys() {
            if excluded.contains(&key) {
                continue;
            }
            match obj.get(&key, object) {
                Ok(value) => {
                    result.set(key, value);
                }
                Err(error) => {
                    tracing::debug!(
                        target: "replica::select",
                        ?key,
                        %error,
                        "getter failed, key skipped"
                    );
                }
            }
        }
    }
    Value::from_object(result)
}
