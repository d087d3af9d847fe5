//! Deep cloning
//!
//! [`Cloner`] copies a value graph. Every heap object is registered in the
//! [`SeenRegistry`] before its children are visited, so shared references
//! stay shared in the copy and cycles are reproduced as cycles.
//!
//! Key features:
//! - Prototypes are kept: a class instance clones to an instance of the
//!   same class
//! - All own properties are copied, including non-enumerable and
//!   symbol-keyed ones; accessors are copied without being invoked
//! - Array holes stay holes
//! - Functions are shared, not copied

use crate::registry::SeenRegistry;
use crate::stack::ensure_sufficient_stack;
use replica_value::{
    GcRef, JsArrayBuffer, JsDataView, JsObject, JsTypedArray, ObjectKind, PropertyDescriptor,
    Value,
};

/// Performs deep clones
#[derive(Debug, Default)]
pub struct Cloner {
    /// Map from source object to its copy
    registry: SeenRegistry,
}

impl Cloner {
    /// Create a new cloner
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloner that resumes from an existing registry
    pub fn with_registry(registry: SeenRegistry) -> Self {
        Self { registry }
    }

    /// The registry built so far
    pub fn registry(&self) -> &SeenRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut SeenRegistry {
        &mut self.registry
    }

    /// Give back the registry
    pub fn into_registry(self) -> SeenRegistry {
        self.registry
    }

    /// Deep-clone a value
    pub fn clone(&mut self, value: &Value) -> Value {
        match value {
            Value::Object(obj) => self.clone_object(obj),
            primitive => primitive.clone(),
        }
    }

    fn clone_object(&mut self, obj: &GcRef<JsObject>) -> Value {
        if let Some(cloned) = self.registry.get(obj) {
            return cloned;
        }
        ensure_sufficient_stack(|| self.clone_fresh(obj))
    }

    fn clone_fresh(&mut self, obj: &GcRef<JsObject>) -> Value {
        let prototype = obj.prototype();
        // Buffer registered bare, its properties copied once the view is registered
        let mut pending_buffer = None;
        let shell = match obj.kind() {
            ObjectKind::Function(_) => return Value::object(obj.clone()),
            ObjectKind::Ordinary => JsObject::new(prototype),
            ObjectKind::Array(_) => {
                JsObject::sparse_array(vec![None; obj.array_length()], prototype)
            }
            ObjectKind::Arguments(_) => {
                JsObject::sparse_arguments(vec![None; obj.array_length()], prototype)
            }
            ObjectKind::Map(_) => JsObject::map().with_prototype(prototype),
            ObjectKind::Set(_) => JsObject::new_set().with_prototype(prototype),
            ObjectKind::Date(time) => JsObject::date(*time.read()).with_prototype(prototype),
            ObjectKind::RegExp(re) => {
                JsObject::with_kind(ObjectKind::RegExp(re.clone()), prototype)
            }
            ObjectKind::Error(kind) => JsObject::with_kind(ObjectKind::Error(*kind), prototype),
            ObjectKind::Boxed(inner) => {
                JsObject::with_kind(ObjectKind::Boxed(inner.clone()), prototype)
            }
            ObjectKind::ArrayBuffer(buffer) => JsObject::with_kind(
                ObjectKind::ArrayBuffer(JsArrayBuffer::from_bytes(buffer.to_vec())),
                prototype,
            ),
            ObjectKind::TypedArray(view) => match self.clone_typed_array(view, &mut pending_buffer) {
                Some(view) => JsObject::with_kind(ObjectKind::TypedArray(view), prototype),
                None => self.fallback(obj, prototype),
            },
            ObjectKind::DataView(view) => match self.clone_data_view(view, &mut pending_buffer) {
                Some(view) => JsObject::with_kind(ObjectKind::DataView(view), prototype),
                None => self.fallback(obj, prototype),
            },
            ObjectKind::Opaque(_) => self.fallback(obj, prototype),
        };

        let copy = GcRef::new(shell);
        let result = Value::object(copy.clone());
        // Register before cloning children (to handle circular refs)
        self.registry.insert(obj, result.clone());

        if let Some((buffer, buffer_copy)) = pending_buffer {
            self.copy_properties(&buffer, &buffer_copy);
        }

        match obj.kind() {
            ObjectKind::Array(_) | ObjectKind::Arguments(_) => {
                for (index, element) in obj.elements().into_iter().enumerate() {
                    if let Some(element) = element {
                        let cloned = self.clone(&element);
                        copy.set_element(index, cloned);
                    }
                }
            }
            ObjectKind::Map(_) => {
                for (key, value) in obj.map_entries() {
                    let key = self.clone(&key);
                    let value = self.clone(&value);
                    copy.map_set(key, value);
                }
            }
            ObjectKind::Set(_) => {
                for value in obj.set_values() {
                    let value = self.clone(&value);
                    copy.set_add(value);
                }
            }
            _ => {}
        }

        self.copy_properties(obj, &copy);
        result
    }

    /// Copy every own named property. Data values are cloned; accessor
    /// functions are shared.
    pub(crate) fn copy_properties(&mut self, from: &JsObject, to: &JsObject) {
        for (key, desc) in from.own_property_entries() {
            let desc = match desc {
                PropertyDescriptor::Data { value, attributes } => PropertyDescriptor::Data {
                    value: self.clone(&value),
                    attributes,
                },
                accessor => accessor,
            };
            to.define_property(key, desc);
        }
    }

    fn clone_typed_array(
        &mut self,
        view: &JsTypedArray,
        pending: &mut Option<(GcRef<JsObject>, GcRef<JsObject>)>,
    ) -> Option<JsTypedArray> {
        let buffer = self.clone_buffer(view.buffer(), pending)?;
        JsTypedArray::new(buffer, view.kind(), view.byte_offset(), view.length()).ok()
    }

    fn clone_data_view(
        &mut self,
        view: &JsDataView,
        pending: &mut Option<(GcRef<JsObject>, GcRef<JsObject>)>,
    ) -> Option<JsDataView> {
        let buffer = self.clone_buffer(view.buffer(), pending)?;
        JsDataView::new(buffer, view.byte_offset(), Some(view.byte_length())).ok()
    }

    /// Copy of a view's backing buffer. A buffer met for the first time is
    /// copied and registered without its own properties, and left in
    /// `pending` for the caller.
    fn clone_buffer(
        &mut self,
        buffer: &GcRef<JsObject>,
        pending: &mut Option<(GcRef<JsObject>, GcRef<JsObject>)>,
    ) -> Option<GcRef<JsObject>> {
        if let Some(cloned) = self.registry.get(buffer) {
            return cloned.as_object().cloned();
        }
        let Some(data) = buffer.array_buffer_data() else {
            return self.clone_object(buffer).as_object().cloned();
        };
        let copy = GcRef::new(JsObject::with_kind(
            ObjectKind::ArrayBuffer(JsArrayBuffer::from_bytes(data.to_vec())),
            buffer.prototype(),
        ));
        self.registry.insert(buffer, Value::object(copy.clone()));
        *pending = Some((buffer.clone(), copy.clone()));
        Some(copy)
    }

    fn fallback(&self, obj: &JsObject, prototype: replica_value::Prototype) -> JsObject {
        tracing::debug!(
            target: "replica::clone",
            class = obj.class_name(),
            "no structural clone for this kind, copying own properties"
        );
        JsObject::new(prototype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_value::{ObjectBuilder, PropertyKey, TypedArrayKind};

    #[test]
    fn test_clone_primitives() {
        let mut cloner = Cloner::new();

        assert!(cloner.clone(&Value::undefined()).is_undefined());
        assert!(cloner.clone(&Value::null()).is_null());
        assert_eq!(cloner.clone(&Value::boolean(true)).as_boolean(), Some(true));
        assert_eq!(cloner.clone(&Value::int32(42)).as_number(), Some(42.0));
        assert!(cloner.registry().is_empty());
    }

    #[test]
    fn test_clone_object() {
        let mut cloner = Cloner::new();
        let val = ObjectBuilder::new().property("x", 1).property("y", 2).build();
        let cloned = cloner.clone(&val);

        assert!(!cloned.same_object(&val));
        assert_eq!(cloned.get_str("x").unwrap(), Value::int32(1));
        assert_eq!(cloned.get_str("y").unwrap(), Value::int32(2));
        assert_eq!(cloner.registry().len(), 1);
    }

    #[test]
    fn test_function_is_shared() {
        let mut cloner = Cloner::new();
        let f = Value::function("f");
        assert!(cloner.clone(&f).same_object(&f));
    }

    #[test]
    fn test_clone_typed_array_copies_underlying_buffer() {
        let mut cloner = Cloner::new();
        let buffer = GcRef::new(JsObject::array_buffer(JsArrayBuffer::new(8)));
        let ta = JsTypedArray::new(buffer, TypedArrayKind::Int16, 2, 2).unwrap();
        ta.set(0, &Value::int32(10));
        ta.set(1, &Value::int32(20));
        let original = Value::from_object(JsObject::typed_array(ta));

        let cloned = cloner.clone(&original);
        let cloned_ta = cloned.as_object().unwrap().typed_array_data().unwrap();
        assert_eq!(cloned_ta.kind(), TypedArrayKind::Int16);
        assert_eq!(cloned_ta.byte_offset(), 2);
        assert_eq!(cloned_ta.length(), 2);
        assert_eq!(cloned_ta.get(1), Some(Value::int32(20)));

        assert!(cloned_ta.set(0, &Value::int32(99)));
        let original_ta = original.as_object().unwrap().typed_array_data().unwrap();
        assert_eq!(original_ta.get(0), Some(Value::int32(10)));
    }

    #[test]
    fn test_clone_data_view_copies_underlying_buffer() {
        let mut cloner = Cloner::new();
        let buffer = GcRef::new(JsObject::array_buffer(JsArrayBuffer::new(8)));
        let dv = JsDataView::new(buffer, 1, Some(4)).unwrap();
        dv.set_uint8(0, 11).unwrap();
        let original = Value::from_object(JsObject::data_view(dv));

        let cloned = cloner.clone(&original);
        let cloned_dv = cloned.as_object().unwrap().data_view_data().unwrap();
        assert_eq!(cloned_dv.byte_offset(), 1);
        assert_eq!(cloned_dv.byte_length(), 4);
        assert_eq!(cloned_dv.get_uint8(0).unwrap(), 11);

        cloned_dv.set_uint8(0, 99).unwrap();
        let original_dv = original.as_object().unwrap().data_view_data().unwrap();
        assert_eq!(original_dv.get_uint8(0).unwrap(), 11);
    }

    #[test]
    fn test_buffer_property_pointing_at_its_view() {
        let mut cloner = Cloner::new();
        let buffer = GcRef::new(JsObject::array_buffer(JsArrayBuffer::new(4)));
        let ta = JsTypedArray::over(buffer.clone(), TypedArrayKind::Uint8).unwrap();
        let original = Value::from_object(JsObject::typed_array(ta));
        buffer.set(PropertyKey::string("owner"), original.clone());

        let cloned = cloner.clone(&original);
        let cloned_buffer = cloned
            .as_object()
            .unwrap()
            .typed_array_data()
            .unwrap()
            .buffer()
            .clone();
        assert!(!cloned_buffer.ptr_eq(&buffer));
        let owner = Value::object(cloned_buffer).get_str("owner").unwrap();
        assert!(owner.same_object(&cloned));
    }

    #[test]
    fn test_opaque_falls_back_to_plain_copy() {
        let mut cloner = Cloner::new();
        let weak = JsObject::opaque("WeakMap");
        weak.set(PropertyKey::string("tag"), Value::string("t"));
        let cloned = cloner.clone(&Value::from_object(weak));

        let obj = cloned.as_object().unwrap();
        assert!(matches!(obj.kind(), ObjectKind::Ordinary));
        assert_eq!(cloned.get_str("tag").unwrap(), Value::string("t"));
    }

    #[test]
    fn test_registry_is_reused() {
        let shared = Value::plain_object();
        let mut cloner = Cloner::new();
        let first = cloner.clone(&shared);

        let mut resumed = Cloner::with_registry(cloner.into_registry());
        assert!(resumed.clone(&shared).same_object(&first));
    }
}
