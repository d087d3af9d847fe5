//! Deep merge
//!
//! [`Merger`] combines a target and a source into a new value. Neither input
//! is touched. Values that need no combining are deep-cloned through one
//! [`SeenRegistry`], so aliasing inside them survives.
//!
//! A combined container is remembered under its `(target, source)` pair for
//! the rest of the call. While a pair is being filled, both of its operands
//! also resolve to the result in the clone registry, so a reference back to
//! an ancestor from either input comes out as a cycle in the result. Those
//! entries are dropped when the pair is done: an object met again outside
//! its ancestor merge is merged or cloned on its own terms.
//!
//! Per kind:
//! - Arrays concatenate or get replaced, per [`ArrayPolicy`]
//! - Maps and Sets form a union in target order
//! - Objects merge key by key, skipping `undefined` source values
//! - Anything else: the source wins

use crate::clone::Cloner;
use crate::config::{ArrayPolicy, MergeOptions};
use crate::error::{MergeError, MergeResult};
use crate::registry::SeenRegistry;
use crate::stack::ensure_sufficient_stack;
use crate::tag::{Tag, classify};
use crate::wrapped::{MarkerProbe, NoProbe, WrapperProbe};
use replica_value::{GcRef, JsObject, PropertyDescriptor, PropertyKey, Value};
use rustc_hash::{FxHashMap, FxHashSet};

/// Deep merge engine
pub struct Merger {
    options: MergeOptions,
    probe: Box<dyn WrapperProbe>,
    cloner: Cloner,
    /// `(target, source)` → combined result, for the current call
    merged: FxHashMap<(usize, usize), (GcRef<JsObject>, GcRef<JsObject>, Value)>,
}

/// A pair whose result is being filled in
struct OpenPair {
    target: GcRef<JsObject>,
    source: GcRef<JsObject>,
    target_before: Option<Value>,
    source_before: Option<Value>,
}

impl Default for Merger {
    fn default() -> Self {
        Self::with_options(MergeOptions::default())
    }
}

impl std::fmt::Debug for Merger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger")
            .field("options", &self.options)
            .field("seen", &self.cloner.registry().len())
            .field("merged", &self.merged.len())
            .finish()
    }
}

impl Merger {
    /// Merger with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Merger with the given options
    pub fn with_options(options: MergeOptions) -> Self {
        let probe: Box<dyn WrapperProbe> = if options.unwrap_wrappers {
            Box::new(MarkerProbe::new(&options.wrapper_marker))
        } else {
            Box::new(NoProbe)
        };
        Self {
            options,
            probe,
            cloner: Cloner::new(),
            merged: FxHashMap::default(),
        }
    }

    /// Resume from a registry left by an earlier merge or clone
    pub fn with_registry(mut self, registry: SeenRegistry) -> Self {
        self.cloner = Cloner::with_registry(registry);
        self
    }

    /// Replace the wrapper probe
    pub fn probe(mut self, probe: impl WrapperProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Active options
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Give back the registry
    pub fn into_registry(self) -> SeenRegistry {
        self.cloner.into_registry()
    }

    /// Merge `source` into a copy of `target`. On a type mismatch the
    /// source wins.
    pub fn merge(&mut self, target: &Value, source: &Value) -> Value {
        self.merged.clear();
        self.merge_values(target, source)
    }

    /// Like [`Merger::merge`], but with `strict_types` set a top-level type
    /// mismatch is an error.
    pub fn try_merge(&mut self, target: &Value, source: &Value) -> MergeResult<Value> {
        if self.options.strict_types {
            let target_tag = classify(&self.unwrap(target));
            let source_tag = classify(&self.unwrap(source));
            let defined = target_tag != Tag::Undefined && source_tag != Tag::Undefined;
            if defined && target_tag.name() != source_tag.name() {
                tracing::debug!(
                    target: "replica::merge",
                    target_tag = %target_tag.name(),
                    source_tag = %source_tag.name(),
                    "refusing to merge mismatched types"
                );
                return Err(MergeError::Incompatible {
                    target: target_tag,
                    incoming: source_tag,
                });
            }
        }
        Ok(self.merge(target, source))
    }

    fn unwrap(&self, value: &Value) -> Value {
        match self.probe.unwrap(value) {
            Some(inner) if !inner.same_object(value) => inner,
            _ => value.clone(),
        }
    }

    fn merge_values(&mut self, target: &Value, source: &Value) -> Value {
        let target = self.unwrap(target);
        let source = self.unwrap(source);

        if source.is_undefined() {
            return self.cloner.clone(&target);
        }
        if target.is_undefined() || target.same_object(&source) {
            return self.cloner.clone(&source);
        }

        let (Some(t), Some(s)) = (target.as_object(), source.as_object()) else {
            return self.cloner.clone(&source);
        };
        if let Some((_, _, result)) = self.merged.get(&(t.addr(), s.addr())) {
            return result.clone();
        }

        match (classify(&target), classify(&source)) {
            (Tag::Array, Tag::Array) => ensure_sufficient_stack(|| self.merge_arrays(t, s)),
            (Tag::Map, Tag::Map) => ensure_sufficient_stack(|| self.merge_maps(t, s)),
            (Tag::Set, Tag::Set) => ensure_sufficient_stack(|| self.merge_sets(t, s)),
            (Tag::Object, Tag::Object) => ensure_sufficient_stack(|| self.merge_objects(t, s)),
            (Tag::Date, Tag::Date) => {
                let time = s.date_value().unwrap_or(f64::NAN);
                Value::from_object(JsObject::date(time).with_prototype(s.prototype()))
            }
            (target_tag, source_tag) => {
                if target_tag != source_tag {
                    tracing::trace!(
                        target: "replica::merge",
                        target_tag = %target_tag.name(),
                        source_tag = %source_tag.name(),
                        "type mismatch, source wins"
                    );
                }
                self.cloner.clone(&source)
            }
        }
    }

    /// Create the result container for `(t, s)` and open the pair
    fn open(
        &mut self,
        shell: JsObject,
        t: &GcRef<JsObject>,
        s: &GcRef<JsObject>,
    ) -> (GcRef<JsObject>, OpenPair) {
        let result = GcRef::new(shell);
        let value = Value::object(result.clone());
        self.merged
            .insert((t.addr(), s.addr()), (t.clone(), s.clone(), value.clone()));

        let registry = self.cloner.registry_mut();
        let target_before = registry.insert(t, value.clone());
        let source_before = registry.insert(s, value);
        let pair = OpenPair {
            target: t.clone(),
            source: s.clone(),
            target_before,
            source_before,
        };
        (result, pair)
    }

    /// Put the clone registry back the way [`Merger::open`] found it
    fn close(&mut self, pair: OpenPair) {
        let registry = self.cloner.registry_mut();
        for (operand, before) in [
            (pair.source, pair.source_before),
            (pair.target, pair.target_before),
        ] {
            match before {
                Some(before) => {
                    registry.insert(&operand, before);
                }
                None => {
                    registry.remove(&operand);
                }
            }
        }
    }

    fn merge_arrays(&mut self, t: &GcRef<JsObject>, s: &GcRef<JsObject>) -> Value {
        let (result, pair) = self.open(JsObject::sparse_array(Vec::new(), t.prototype()), t, s);

        let mut elements = match self.options.array_policy {
            ArrayPolicy::Concat => t.elements(),
            ArrayPolicy::Replace => Vec::new(),
        };
        elements.extend(s.elements());

        result.set_array_length(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            if let Some(element) = element {
                let cloned = self.cloner.clone(&element);
                result.set_element(index, cloned);
            }
        }
        self.close(pair);
        Value::object(result)
    }

    fn merge_maps(&mut self, t: &GcRef<JsObject>, s: &GcRef<JsObject>) -> Value {
        let (result, pair) = self.open(JsObject::map().with_prototype(t.prototype()), t, s);

        for (key, value) in t.map_entries() {
            let merged = match s.map_get(&key) {
                Some(incoming) => self.merge_values(&value, &incoming),
                None => self.cloner.clone(&value),
            };
            let key = self.cloner.clone(&key);
            result.map_set(key, merged);
        }
        for (key, value) in s.map_entries() {
            if t.map_has(&key) {
                continue;
            }
            let key = self.cloner.clone(&key);
            let value = self.cloner.clone(&value);
            result.map_set(key, value);
        }
        self.close(pair);
        Value::object(result)
    }

    fn merge_sets(&mut self, t: &GcRef<JsObject>, s: &GcRef<JsObject>) -> Value {
        let (result, pair) = self.open(JsObject::new_set().with_prototype(t.prototype()), t, s);

        for value in t.set_values() {
            let value = self.cloner.clone(&value);
            result.set_add(value);
        }
        for value in s.set_values() {
            if !t.set_has(&value) {
                let value = self.cloner.clone(&value);
                result.set_add(value);
            }
        }
        self.close(pair);
        Value::object(result)
    }

    fn merge_objects(&mut self, t: &GcRef<JsObject>, s: &GcRef<JsObject>) -> Value {
        let (result, pair) = self.open(JsObject::new(t.prototype()), t, s);

        let target_keys = t.own_enumerable_keys();
        let target_set: FxHashSet<&PropertyKey> = target_keys.iter().collect();
        let source_keys: FxHashSet<PropertyKey> = s.own_enumerable_keys().into_iter().collect();

        for key in &target_keys {
            let Some(base) = t.get_own_property(key) else {
                continue;
            };
            let incoming = if source_keys.contains(key) {
                s.get_own_property(key)
            } else {
                None
            };
            let desc = match (base, incoming) {
                (base, None) => self.clone_descriptor(base),
                (base, Some(PropertyDescriptor::Data { value, .. })) if value.is_undefined() => {
                    self.clone_descriptor(base)
                }
                (
                    PropertyDescriptor::Data { value: current, .. },
                    Some(PropertyDescriptor::Data { value, attributes }),
                ) => {
                    let both_containers = classify(&self.unwrap(&current)).is_mergeable_container()
                        && classify(&self.unwrap(&value)).is_mergeable_container();
                    let merged = if both_containers {
                        self.merge_values(&current, &value)
                    } else {
                        self.cloner.clone(&value)
                    };
                    PropertyDescriptor::data_with_attrs(merged, attributes)
                }
                (_, Some(incoming)) => self.clone_descriptor(incoming),
            };
            result.define_property(key.clone(), desc);
        }

        for key in s.own_enumerable_keys() {
            if target_set.contains(&key) {
                continue;
            }
            let Some(desc) = s.get_own_property(&key) else {
                continue;
            };
            if desc.value().is_some_and(Value::is_undefined) {
                continue;
            }
            let desc = self.clone_descriptor(desc);
            result.define_property(key, desc);
        }
        self.close(pair);
        Value::object(result)
    }

    fn clone_descriptor(&mut self, desc: PropertyDescriptor) -> PropertyDescriptor {
        match desc {
            PropertyDescriptor::Data { value, attributes } => PropertyDescriptor::Data {
                value: self.cloner.clone(&value),
                attributes,
            },
            accessor => accessor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_value::ObjectBuilder;

    #[test]
    fn test_undefined_operands() {
        let mut merger = Merger::new();
        let obj = ObjectBuilder::new().property("a", 1).build();

        let merged = merger.merge(&obj, &Value::undefined());
        assert!(!merged.same_object(&obj));
        assert_eq!(merged.get_str("a").unwrap(), Value::int32(1));

        let merged = Merger::new().merge(&Value::undefined(), &obj);
        assert_eq!(merged.get_str("a").unwrap(), Value::int32(1));
    }

    #[test]
    fn test_primitive_source_wins() {
        let mut merger = Merger::new();
        assert_eq!(merger.merge(&Value::int32(1), &Value::int32(2)), Value::int32(2));
        let merged = merger.merge(&Value::plain_object(), &Value::string("s"));
        assert_eq!(merged, Value::string("s"));
    }

    #[test]
    fn test_strict_types() {
        let mut merger = Merger::with_options(MergeOptions::with_policy(ArrayPolicy::Replace));
        let err = merger
            .try_merge(&Value::plain_object(), &Value::array(vec![]))
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::Incompatible {
                target: Tag::Object,
                incoming: Tag::Array
            }
        );
        assert_eq!(err.to_string(), "cannot merge [object Array] into [object Object]");

        let mut lenient = Merger::new();
        assert!(lenient.try_merge(&Value::plain_object(), &Value::array(vec![])).is_ok());
    }

    #[test]
    fn test_strict_types_allow_undefined() {
        let mut merger = Merger::with_options(MergeOptions::with_policy(ArrayPolicy::Concat));
        let merged = merger.try_merge(&Value::undefined(), &Value::int32(3)).unwrap();
        assert_eq!(merged, Value::int32(3));
    }

    #[test]
    fn test_date_takes_source_time() {
        let t = Value::date(1.0);
        let s = Value::date(2.0);
        let merged = Merger::new().merge(&t, &s);
        assert!(!merged.same_object(&s));
        assert_eq!(merged.as_object().unwrap().date_value(), Some(2.0));
    }

    #[test]
    fn test_accessor_copied_without_call() {
        let getter = Value::native_function("boom", |_, _| Err("called".to_string()));
        let source = ObjectBuilder::new()
            .accessor("x", Some(getter.clone()), None)
            .build();
        let merged = Merger::new().merge(&Value::plain_object(), &source);

        let desc = merged
            .as_object()
            .unwrap()
            .get_own_property(&PropertyKey::string("x"))
            .unwrap();
        assert!(desc.is_accessor());
    }

    #[test]
    fn test_registry_holds_clones_only() {
        let mut merger = Merger::new();
        let inner = ObjectBuilder::new().property("x", 1).build();
        let t = ObjectBuilder::new().property("a", inner.clone()).build();
        let s = ObjectBuilder::new().property("b", 2).build();
        let merged = merger.merge(&t, &s);

        let registry = merger.into_registry();
        assert_eq!(registry.len(), 1);
        let copy = registry.get(inner.as_object().unwrap()).unwrap();
        assert!(copy.same_object(&merged.get_str("a").unwrap()));
        assert!(!registry.contains(t.as_object().unwrap()));
        assert!(!registry.contains(s.as_object().unwrap()));
    }

    #[test]
    fn test_same_pair_merges_once_per_call() {
        let x = ObjectBuilder::new().property("p", 1).build();
        let y = ObjectBuilder::new().property("q", 2).build();
        let t = ObjectBuilder::new().property("a", x.clone()).property("b", x).build();
        let s = ObjectBuilder::new().property("a", y.clone()).property("b", y).build();

        let mut merger = Merger::new();
        let merged = merger.merge(&t, &s);
        let a = merged.get_str("a").unwrap();
        assert!(a.same_object(&merged.get_str("b").unwrap()));
        assert_eq!(a.get_str("p").unwrap(), Value::int32(1));
        assert_eq!(a.get_str("q").unwrap(), Value::int32(2));

        // A new call starts from an empty pair memo
        let again = merger.merge(&t, &s);
        assert!(!again.get_str("a").unwrap().same_object(&a));
    }
}
