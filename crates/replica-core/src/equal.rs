//! Deep structural equality
//!
//! [`Comparator`] decides whether two value graphs are structurally equal.
//! Each call walks both graphs in lockstep, keeping the pairs currently
//! under comparison in a [`PairRegistry`] so cyclic inputs terminate: a pair
//! met again while still on the path is equal exactly when both sides were
//! entered against each other. Pairs that finish equal are remembered for
//! the rest of the call, so shared substructure is compared once.
//!
//! The same walk also implements partial matching ([`Comparator::is_match`]),
//! where the left-hand side only has to be contained in the right-hand side.

use crate::config::EqualityConfig;
use crate::registry::PairRegistry;
use crate::stack::ensure_sufficient_stack;
use crate::tag::{Tag, classify};
use crate::wrapped::{MarkerProbe, NoProbe, WrapperProbe};
use replica_value::{GcRef, JsObject, PropertyKey, Value};

/// Per-pair override: `Some` decides the pair, `None` defers to the
/// default rules.
pub type Customizer<'a> = &'a dyn Fn(&Value, &Value) -> Option<bool>;

/// Configurable equality engine
pub struct Comparator<'a> {
    config: EqualityConfig,
    probe: Box<dyn WrapperProbe>,
    customizer: Option<Customizer<'a>>,
}

impl Default for Comparator<'_> {
    fn default() -> Self {
        Self::with_config(EqualityConfig::default())
    }
}

impl<'a> Comparator<'a> {
    /// Comparator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparator with the given settings
    pub fn with_config(config: EqualityConfig) -> Self {
        let probe: Box<dyn WrapperProbe> = if config.unwrap_wrappers {
            Box::new(MarkerProbe::new(&config.wrapper_marker))
        } else {
            Box::new(NoProbe)
        };
        Self {
            config,
            probe,
            customizer: None,
        }
    }

    /// Active settings
    pub fn config(&self) -> &EqualityConfig {
        &self.config
    }

    /// Replace the wrapper probe
    pub fn probe(mut self, probe: impl WrapperProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Install a customizer consulted before the default rules on every pair
    pub fn customizer<'b>(self, customizer: Customizer<'b>) -> Comparator<'b> {
        Comparator {
            config: self.config,
            probe: self.probe,
            customizer: Some(customizer),
        }
    }

    /// Deep structural equality
    pub fn is_equal(&self, a: &Value, b: &Value) -> bool {
        Walk::new(self, false).equal(a, b)
    }

    /// Whether `object` contains everything in `source`: every enumerable
    /// own key of `source` is present on `object` (own or inherited) with a
    /// partially-equal value. A non-object `source` is compared with
    /// [`Comparator::is_equal`].
    pub fn is_match(&self, object: &Value, source: &Value) -> bool {
        let Some(src) = source.as_object() else {
            return self.is_equal(object, source);
        };
        let keys = src.own_enumerable_keys();
        let Some(obj) = object.as_object() else {
            return keys.is_empty();
        };

        let mut walk = Walk::new(self, true);
        for key in &keys {
            if !obj.has_property(key) {
                return false;
            }
            let (Ok(expected), Ok(actual)) = (read(src, key), read(obj, key)) else {
                return false;
            };
            if !walk.equal(&expected, &actual) {
                return false;
            }
        }
        true
    }

    /// Strict equality with the configured treatment of `-0`
    fn same(&self, a: &Value, b: &Value) -> bool {
        if self.config.distinguish_negative_zero {
            if let (Value::Number(x), Value::Number(y)) = (a, b) {
                if *x == 0.0 && *y == 0.0 {
                    return x.is_sign_negative() == y.is_sign_negative();
                }
            }
        }
        a.strict_equals(b)
    }

    fn same_primitive(&self, a: &Value, b: &Value) -> bool {
        self.same(a, b) || (a.is_nan() && b.is_nan())
    }
}

/// State of one top-level comparison
struct Walk<'c, 'a> {
    cmp: &'c Comparator<'a>,
    pairs: PairRegistry,
    partial: bool,
}

impl<'c, 'a> Walk<'c, 'a> {
    fn new(cmp: &'c Comparator<'a>, partial: bool) -> Self {
        Self {
            cmp,
            pairs: PairRegistry::new(),
            partial,
        }
    }

    fn equal(&mut self, a: &Value, b: &Value) -> bool {
        if let Some(customizer) = self.cmp.customizer {
            if let Some(result) = customizer(a, b) {
                return result;
            }
        }
        if self.cmp.same(a, b) {
            return true;
        }
        if a.is_primitive() && b.is_primitive() {
            return a.is_nan() && b.is_nan();
        }
        if a.is_nullish() || b.is_nullish() {
            return false;
        }
        ensure_sufficient_stack(|| self.equal_deep(a, b))
    }

    fn equal_deep(&mut self, a: &Value, b: &Value) -> bool {
        let a_bucket = classify(a).comparison_bucket();
        let b_bucket = classify(b).comparison_bucket();
        let a_is_obj = a_bucket == Tag::Object;
        let b_is_obj = b_bucket == Tag::Object;

        if a_bucket == b_bucket && !a_is_obj {
            return self.equal_by_tag(a, b, a_bucket);
        }

        if !self.partial {
            let a_inner = if a_is_obj { self.unwrap(a) } else { None };
            let b_inner = if b_is_obj { self.unwrap(b) } else { None };
            if a_inner.is_some() || b_inner.is_some() {
                tracing::trace!(target: "replica::equal", "comparing wrapped values");
                let a = a_inner.unwrap_or_else(|| a.clone());
                let b = b_inner.unwrap_or_else(|| b.clone());
                return self.equal(&a, &b);
            }
        }

        if a_bucket != b_bucket {
            return false;
        }
        match (a.as_object(), b.as_object()) {
            (Some(x), Some(y)) => self.equal_objects(x, y),
            _ => false,
        }
    }

    fn unwrap(&self, value: &Value) -> Option<Value> {
        self.cmp
            .probe
            .unwrap(value)
            .filter(|inner| !inner.same_object(value))
    }

    fn equal_by_tag(&mut self, a: &Value, b: &Value, bucket: Tag) -> bool {
        if matches!(
            bucket,
            Tag::Boolean | Tag::Number | Tag::String | Tag::BigInt | Tag::Symbol
        ) {
            return self.cmp.same_primitive(&unbox(a), &unbox(b));
        }
        let (Some(x), Some(y)) = (a.as_object(), b.as_object()) else {
            return false;
        };
        match bucket {
            Tag::Array => self.equal_arrays(x, y),
            Tag::Map => self.equal_maps(x, y),
            Tag::Set => self.equal_sets(x, y),
            Tag::Date => match (x.date_value(), y.date_value()) {
                (Some(p), Some(q)) => p == q || (p.is_nan() && q.is_nan()),
                _ => false,
            },
            Tag::RegExp => match (x.regexp_data(), y.regexp_data()) {
                (Some(p), Some(q)) => p.source() == q.source() && p.flags() == q.flags(),
                _ => false,
            },
            Tag::Error => x.error_name() == y.error_name() && x.error_message() == y.error_message(),
            Tag::TypedArray(_) => match (x.typed_array_data(), y.typed_array_data()) {
                (Some(p), Some(q)) => p.byte_length() == q.byte_length() && p.bytes() == q.bytes(),
                _ => false,
            },
            Tag::ArrayBuffer => match (x.array_buffer_data(), y.array_buffer_data()) {
                (Some(p), Some(q)) => p.byte_length() == q.byte_length() && p.to_vec() == q.to_vec(),
                _ => false,
            },
            Tag::DataView => match (x.data_view_data(), y.data_view_data()) {
                (Some(p), Some(q)) => {
                    p.byte_length() == q.byte_length()
                        && p.byte_offset() == q.byte_offset()
                        && whole_buffer(p.buffer()) == whole_buffer(q.buffer())
                }
                _ => false,
            },
            // Functions and host objects are equal only by identity
            _ => false,
        }
    }

    fn equal_arrays(&mut self, x: &GcRef<JsObject>, y: &GcRef<JsObject>) -> bool {
        let a = holes_as_undefined(x.elements());
        let b = holes_as_undefined(y.elements());
        if a.len() != b.len() && !(self.partial && b.len() > a.len()) {
            return false;
        }
        if let Some(result) = self.pairs.lookup(x, y) {
            return result;
        }

        self.pairs.enter(x, y);
        let result = if self.partial {
            self.match_unordered(&a, &b)
        } else {
            a.iter().zip(b.iter()).all(|(p, q)| self.equal(p, q))
        };
        self.pairs.exit(x, y, result);
        result
    }

    fn equal_maps(&mut self, x: &GcRef<JsObject>, y: &GcRef<JsObject>) -> bool {
        if !self.sizes_compatible(x, y) {
            return false;
        }
        if let Some(result) = self.pairs.lookup(x, y) {
            return result;
        }

        self.pairs.enter(x, y);
        let (a, b) = (x.map_entries(), y.map_entries());
        let mut consumed = vec![false; b.len()];
        let mut result = true;
        for (key, value) in &a {
            let mut found = false;
            for (i, (other_key, other_value)) in b.iter().enumerate() {
                if !consumed[i] && self.equal(key, other_key) && self.equal(value, other_value) {
                    consumed[i] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                result = false;
                break;
            }
        }
        self.pairs.exit(x, y, result);
        result
    }

    fn equal_sets(&mut self, x: &GcRef<JsObject>, y: &GcRef<JsObject>) -> bool {
        if !self.sizes_compatible(x, y) {
            return false;
        }
        if let Some(result) = self.pairs.lookup(x, y) {
            return result;
        }

        self.pairs.enter(x, y);
        let result = self.match_unordered(&x.set_values(), &y.set_values());
        self.pairs.exit(x, y, result);
        result
    }

    fn sizes_compatible(&self, x: &GcRef<JsObject>, y: &GcRef<JsObject>) -> bool {
        let (a, b) = (x.collection_size(), y.collection_size());
        a == b || (self.partial && b > a)
    }

    /// Every element of `a` pairs with a distinct element of `b`
    fn match_unordered(&mut self, a: &[Value], b: &[Value]) -> bool {
        let mut consumed = vec![false; b.len()];
        for value in a {
            let mut found = false;
            for (i, other) in b.iter().enumerate() {
                if !consumed[i] && self.equal(value, other) {
                    consumed[i] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                return false;
            }
        }
        true
    }

    fn equal_objects(&mut self, x: &GcRef<JsObject>, y: &GcRef<JsObject>) -> bool {
        let keys = x.own_enumerable_keys();
        if !self.partial && keys.len() != y.own_enumerable_keys().len() {
            return false;
        }
        for key in &keys {
            let present = if self.partial {
                y.has_property(key)
            } else {
                y.has_own(key)
            };
            if !present {
                return false;
            }
        }
        if let Some(result) = self.pairs.lookup(x, y) {
            return result;
        }

        self.pairs.enter(x, y);
        let mut result = true;
        let mut skip_ctor = self.partial;
        for key in &keys {
            let (a, b) = match (read(x, key), read(y, key)) {
                (Ok(a), Ok(b)) => (a, b),
                (Err(error), _) | (_, Err(error)) => {
                    tracing::debug!(
                        target: "replica::equal",
                        ?key,
                        %error,
                        "getter failed, treating objects as unequal"
                    );
                    result = false;
                    break;
                }
            };
            if !self.equal(&a, &b) {
                result = false;
                break;
            }
            skip_ctor |= key.as_str() == Some("constructor");
        }
        if result && !skip_ctor && !constructors_match(x, y) {
            tracing::trace!(target: "replica::equal", "constructor mismatch");
            result = false;
        }
        self.pairs.exit(x, y, result);
        result
    }
}

/// Constructors differ only when both sides have one and at least one of
/// them is user-defined.
fn constructors_match(x: &JsObject, y: &JsObject) -> bool {
    match (x.constructor(), y.constructor()) {
        (Some(p), Some(q)) => p.same_as(&q) || (p.is_intrinsic() && q.is_intrinsic()),
        _ => true,
    }
}

fn read(obj: &GcRef<JsObject>, key: &PropertyKey) -> Result<Value, String> {
    obj.get(key, &Value::object(obj.clone()))
}

fn unbox(value: &Value) -> Value {
    match value.as_object().and_then(|o| o.boxed_value()) {
        Some(inner) => inner.clone(),
        None => value.clone(),
    }
}

fn holes_as_undefined(elements: Vec<Option<Value>>) -> Vec<Value> {
    elements.into_iter().map(Option::unwrap_or_default).collect()
}

fn whole_buffer(buffer: &GcRef<JsObject>) -> Option<Vec<u8>> {
    buffer.array_buffer_data().map(|b| b.to_vec())
}
