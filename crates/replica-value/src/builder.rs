//! Object and class builders
//!
//! Convenience constructors for object graphs: plain objects with data,
//! hidden and accessor properties, and "classes" (a constructor function
//! paired with a prototype object) whose instances carry a user prototype.

use crate::function::{FunctionFlavor, JsFunction};
use crate::gc::GcRef;
use crate::object::{JsObject, PropertyAttributes, PropertyDescriptor, PropertyKey, Prototype};
use crate::value::Value;

/// Builder for ordinary objects
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    prototype: Prototype,
    properties: Vec<(PropertyKey, PropertyDescriptor)>,
}

impl ObjectBuilder {
    /// Builder for a `{}` with the intrinsic prototype
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prototype
    pub fn prototype(mut self, prototype: Prototype) -> Self {
        self.prototype = prototype;
        self
    }

    /// Add an enumerable data property
    pub fn property(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.properties
            .push((key.into(), PropertyDescriptor::data(value.into())));
        self
    }

    /// Add a non-enumerable data property
    pub fn hidden(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.properties.push((
            key.into(),
            PropertyDescriptor::data_with_attrs(value.into(), PropertyAttributes::hidden()),
        ));
        self
    }

    /// Add an accessor property
    pub fn accessor(
        mut self,
        key: impl Into<PropertyKey>,
        get: Option<Value>,
        set: Option<Value>,
    ) -> Self {
        self.properties
            .push((key.into(), PropertyDescriptor::accessor(get, set)));
        self
    }

    /// Add an enumerable getter backed by a closure receiving `this`
    pub fn getter<F>(self, key: impl Into<PropertyKey>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        let getter = Value::native_function("get", move |this, _| f(this));
        self.accessor(key, Some(getter), None)
    }

    /// Allocate the object
    pub fn build(self) -> Value {
        let obj = JsObject::new(self.prototype);
        for (key, desc) in self.properties {
            obj.define_property(key, desc);
        }
        Value::from_object(obj)
    }
}

/// A constructor function and its prototype object
///
/// The prototype's `constructor` points at the function. The function does
/// not point back at the prototype, so a class never forms a cycle.
#[derive(Debug, Clone)]
pub struct JsClass {
    constructor: Value,
    prototype: GcRef<JsObject>,
}

impl JsClass {
    /// `class Name {}`
    pub fn new(name: &str) -> Self {
        Self::with_parent(name, Prototype::Intrinsic)
    }

    /// `class Name extends Parent {}`
    pub fn extends(name: &str, parent: &JsClass) -> Self {
        Self::with_parent(name, Prototype::Object(parent.prototype.clone()))
    }

    fn with_parent(name: &str, parent: Prototype) -> Self {
        let constructor =
            Value::from_object(JsObject::function(JsFunction::new(name, FunctionFlavor::Class)));
        let prototype = GcRef::new(JsObject::new(parent));
        prototype.define_property(
            PropertyKey::string("constructor"),
            PropertyDescriptor::data_with_attrs(constructor.clone(), PropertyAttributes::hidden()),
        );
        Self {
            constructor,
            prototype,
        }
    }

    /// Add a non-enumerable method to the prototype
    pub fn method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.prototype.define_property(
            PropertyKey::string(name),
            PropertyDescriptor::data_with_attrs(
                Value::native_function(name, f),
                PropertyAttributes::hidden(),
            ),
        );
        self
    }

    /// Add a getter to the prototype
    pub fn getter<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        let getter = Value::native_function(name, move |this, _| f(this));
        self.prototype.define_property(
            PropertyKey::string(name),
            PropertyDescriptor::Accessor {
                get: Some(getter),
                set: None,
                attributes: PropertyAttributes::hidden(),
            },
        );
        self
    }

    /// The constructor function
    pub fn constructor(&self) -> &Value {
        &self.constructor
    }

    /// The prototype object
    pub fn prototype(&self) -> &GcRef<JsObject> {
        &self.prototype
    }

    /// Builder for an instance (`new Name()`)
    pub fn instance(&self) -> ObjectBuilder {
        ObjectBuilder::new().prototype(Prototype::Object(self.prototype.clone()))
    }

    /// Instance of an Array subclass
    pub fn array_instance(&self, elements: Vec<Value>) -> Value {
        Value::from_object(JsObject::sparse_array(
            elements.into_iter().map(Some).collect(),
            Prototype::Object(self.prototype.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Constructor;

    #[test]
    fn test_object_builder() {
        let obj = ObjectBuilder::new()
            .property("a", 1)
            .hidden("secret", "x")
            .getter("double", |this| {
                let a = this.get_str("a")?.as_number().unwrap_or(0.0);
                Ok(Value::number(a * 2.0))
            })
            .build();

        let o = obj.as_object().unwrap();
        assert_eq!(o.own_keys().len(), 3);
        assert_eq!(o.own_enumerable_keys().len(), 2);
        assert_eq!(obj.get_str("double").unwrap(), Value::int32(2));
    }

    #[test]
    fn test_class_instances_share_constructor() {
        let point = JsClass::new("Point").method("norm", |_, _| Ok(Value::int32(0)));
        let p = point.instance().property("x", 1).build();

        match p.as_object().unwrap().constructor() {
            Some(Constructor::Value(ctor)) => assert!(ctor.same_object(point.constructor())),
            other => panic!("unexpected constructor {other:?}"),
        }
        assert!(p.get_str("norm").unwrap().is_function());
        assert_eq!(p.as_object().unwrap().own_enumerable_keys().len(), 1);
    }

    #[test]
    fn test_subclass_chain() {
        let base = JsClass::new("Base").method("hello", |_, _| Ok(Value::string("hi")));
        let derived = JsClass::extends("Derived", &base);
        let d = derived.instance().build();

        let greeting = d.get_str("hello").unwrap().call(&d, &[]).unwrap();
        assert_eq!(greeting.as_str(), Some("hi"));
    }

    #[test]
    fn test_array_subclass() {
        let list = JsClass::new("List");
        let arr = list.array_instance(vec![Value::int32(1)]);
        assert!(arr.is_array());
        assert!(matches!(
            arr.as_object().unwrap().constructor(),
            Some(Constructor::Value(_))
        ));
    }
}
