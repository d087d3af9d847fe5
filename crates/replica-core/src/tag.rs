//! Type classification
//!
//! Every value maps to exactly one [`Tag`]. The engines dispatch on tags
//! rather than on `ObjectKind` directly so that the grouping rules
//! (Arguments compare like objects, boxed primitives like their primitive)
//! live in one place.

use replica_value::{ObjectKind, TypedArrayKind, Value};

/// Primitive category of a boxed primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    /// `new Boolean(..)`
    Boolean,
    /// `new Number(..)`
    Number,
    /// `new String(..)`
    String,
    /// `Object(1n)`
    BigInt,
    /// `Object(Symbol())`
    Symbol,
}

impl PrimitiveTag {
    fn as_tag(self) -> Tag {
        match self {
            PrimitiveTag::Boolean => Tag::Boolean,
            PrimitiveTag::Number => Tag::Number,
            PrimitiveTag::String => Tag::String,
            PrimitiveTag::BigInt => Tag::BigInt,
            PrimitiveTag::Symbol => Tag::Symbol,
        }
    }
}

/// Structural category of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean primitive
    Boolean,
    /// Number primitive
    Number,
    /// String primitive
    String,
    /// BigInt primitive
    BigInt,
    /// Symbol primitive
    Symbol,
    /// Plain or class-instance object
    Object,
    /// Array (including subclasses)
    Array,
    /// Arguments object
    Arguments,
    /// Any callable: normal, arrow, class, async, generator
    Function,
    /// Map
    Map,
    /// Set
    Set,
    /// Date
    Date,
    /// RegExp
    RegExp,
    /// Error of any kind
    Error,
    /// Boxed primitive
    Boxed(PrimitiveTag),
    /// ArrayBuffer
    ArrayBuffer,
    /// DataView
    DataView,
    /// Typed array of the given element kind
    TypedArray(TypedArrayKind),
    /// Host object without structural rules
    Opaque,
}

/// Classify a value. Total: every value gets a tag.
pub fn classify(value: &Value) -> Tag {
    match value {
        Value::Undefined => Tag::Undefined,
        Value::Null => Tag::Null,
        Value::Boolean(_) => Tag::Boolean,
        Value::Number(_) => Tag::Number,
        Value::String(_) => Tag::String,
        Value::BigInt(_) => Tag::BigInt,
        Value::Symbol(_) => Tag::Symbol,
        Value::Object(obj) => match obj.kind() {
            ObjectKind::Ordinary => Tag::Object,
            ObjectKind::Array(_) => Tag::Array,
            ObjectKind::Arguments(_) => Tag::Arguments,
            ObjectKind::Function(_) => Tag::Function,
            ObjectKind::Map(_) => Tag::Map,
            ObjectKind::Set(_) => Tag::Set,
            ObjectKind::Date(_) => Tag::Date,
            ObjectKind::RegExp(_) => Tag::RegExp,
            ObjectKind::Error(_) => Tag::Error,
            ObjectKind::Boxed(inner) => match inner {
                Value::Boolean(_) => Tag::Boxed(PrimitiveTag::Boolean),
                Value::Number(_) => Tag::Boxed(PrimitiveTag::Number),
                Value::String(_) => Tag::Boxed(PrimitiveTag::String),
                Value::BigInt(_) => Tag::Boxed(PrimitiveTag::BigInt),
                Value::Symbol(_) => Tag::Boxed(PrimitiveTag::Symbol),
                _ => Tag::Object,
            },
            ObjectKind::ArrayBuffer(_) => Tag::ArrayBuffer,
            ObjectKind::TypedArray(ta) => Tag::TypedArray(ta.kind()),
            ObjectKind::DataView(_) => Tag::DataView,
            ObjectKind::Opaque(_) => Tag::Opaque,
        },
    }
}

impl Tag {
    /// Whether values with this tag live on the heap
    pub fn is_object_like(&self) -> bool {
        !matches!(
            self,
            Tag::Undefined
                | Tag::Null
                | Tag::Boolean
                | Tag::Number
                | Tag::String
                | Tag::BigInt
                | Tag::Symbol
        )
    }

    /// Tag used for cross-type comparison: Arguments compare as objects and
    /// boxed primitives as the primitive they box.
    pub fn comparison_bucket(&self) -> Tag {
        match self {
            Tag::Arguments => Tag::Object,
            Tag::Boxed(p) => p.as_tag(),
            other => *other,
        }
    }

    /// Whether merge descends into values with this tag
    pub fn is_mergeable_container(&self) -> bool {
        matches!(self, Tag::Object | Tag::Array | Tag::Map | Tag::Set)
    }

    /// `Object.prototype.toString`-style name, e.g. `"[object Map]"`
    pub fn name(&self) -> String {
        let class = match self {
            Tag::Undefined => "Undefined",
            Tag::Null => "Null",
            Tag::Boolean | Tag::Boxed(PrimitiveTag::Boolean) => "Boolean",
            Tag::Number | Tag::Boxed(PrimitiveTag::Number) => "Number",
            Tag::String | Tag::Boxed(PrimitiveTag::String) => "String",
            Tag::BigInt | Tag::Boxed(PrimitiveTag::BigInt) => "BigInt",
            Tag::Symbol | Tag::Boxed(PrimitiveTag::Symbol) => "Symbol",
            Tag::Object | Tag::Opaque => "Object",
            Tag::Array => "Array",
            Tag::Arguments => "Arguments",
            Tag::Function => "Function",
            Tag::Map => "Map",
            Tag::Set => "Set",
            Tag::Date => "Date",
            Tag::RegExp => "RegExp",
            Tag::Error => "Error",
            Tag::ArrayBuffer => "ArrayBuffer",
            Tag::DataView => "DataView",
            Tag::TypedArray(kind) => kind.name(),
        };
        format!("[object {class}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_value::{ErrorKind, JsArrayBuffer, JsObject, JsTypedArray};
    use replica_value::{FunctionFlavor, GcRef, JsFunction};

    #[test]
    fn test_primitives() {
        assert_eq!(classify(&Value::undefined()), Tag::Undefined);
        assert_eq!(classify(&Value::null()), Tag::Null);
        assert_eq!(classify(&Value::nan()), Tag::Number);
        assert_eq!(classify(&Value::bigint(1)), Tag::BigInt);
        assert_eq!(classify(&Value::new_symbol(None)), Tag::Symbol);
    }

    #[test]
    fn test_objects() {
        assert_eq!(classify(&Value::plain_object()), Tag::Object);
        assert_eq!(classify(&Value::array(vec![])), Tag::Array);
        assert_eq!(classify(&Value::arguments(vec![])), Tag::Arguments);
        assert_eq!(classify(&Value::map(vec![])), Tag::Map);
        assert_eq!(classify(&Value::set(vec![])), Tag::Set);
        assert_eq!(classify(&Value::date(0.0)), Tag::Date);
        assert_eq!(classify(&Value::regexp("a", "g").unwrap()), Tag::RegExp);
        assert_eq!(classify(&Value::error(ErrorKind::RangeError, "x")), Tag::Error);
        assert_eq!(
            classify(&Value::boxed(Value::string("s"))),
            Tag::Boxed(PrimitiveTag::String)
        );
        assert_eq!(
            classify(&Value::from_object(JsObject::opaque("WeakMap"))),
            Tag::Opaque
        );
    }

    #[test]
    fn test_every_function_flavor_is_function() {
        for flavor in [
            FunctionFlavor::Normal,
            FunctionFlavor::Arrow,
            FunctionFlavor::Class,
            FunctionFlavor::Async,
            FunctionFlavor::Generator,
            FunctionFlavor::AsyncGenerator,
        ] {
            let f = Value::from_object(JsObject::function(JsFunction::new("f", flavor)));
            assert_eq!(classify(&f), Tag::Function);
        }
    }

    #[test]
    fn test_binary_kinds() {
        let buffer = GcRef::new(JsObject::array_buffer(JsArrayBuffer::new(8)));
        let ta = JsTypedArray::over(buffer.clone(), TypedArrayKind::Float32).unwrap();
        assert_eq!(
            classify(&Value::from_object(JsObject::typed_array(ta))),
            Tag::TypedArray(TypedArrayKind::Float32)
        );
        assert_eq!(classify(&Value::object(buffer)), Tag::ArrayBuffer);
    }

    #[test]
    fn test_buckets() {
        assert_eq!(Tag::Arguments.comparison_bucket(), Tag::Object);
        assert_eq!(Tag::Boxed(PrimitiveTag::Number).comparison_bucket(), Tag::Number);
        assert_eq!(Tag::Array.comparison_bucket(), Tag::Array);
    }

    #[test]
    fn test_names() {
        assert_eq!(Tag::Map.name(), "[object Map]");
        assert_eq!(Tag::Arguments.name(), "[object Arguments]");
        assert_eq!(Tag::TypedArray(TypedArrayKind::Uint8).name(), "[object Uint8Array]");
        assert_eq!(Tag::Boxed(PrimitiveTag::String).name(), "[object String]");
    }

    #[test]
    fn test_mergeable() {
        assert!(Tag::Object.is_mergeable_container());
        assert!(Tag::Set.is_mergeable_container());
        assert!(!Tag::Arguments.is_mergeable_container());
        assert!(!Tag::Date.is_mergeable_container());
        assert!(Tag::Function.is_object_like());
        assert!(!Tag::Symbol.is_object_like());
    }
}
