//! JavaScript objects
//!
//! A `JsObject` is a kind-specific payload (`ObjectKind`), a prototype link
//! and an ordered table of named properties. Array-likes keep their indexed
//! elements in a separate vector where `None` marks a hole.
//!
//! Locks are only held while copying data in or out. Getters, setters and
//! native functions are always invoked with every lock released, so user
//! code may freely re-enter the object it was called on.

use crate::array_buffer::JsArrayBuffer;
use crate::data_view::JsDataView;
use crate::function::JsFunction;
use crate::map_data::{MapData, SetData};
use crate::regexp::JsRegExp;
use crate::typed_array::JsTypedArray;
use crate::gc::GcRef;
use crate::value::{Symbol, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Property key
#[derive(Clone)]
pub enum PropertyKey {
    /// String key (array indices are canonical numeric strings)
    String(Arc<str>),
    /// Symbol key
    Symbol(Arc<Symbol>),
}

impl PropertyKey {
    /// Create a string key
    pub fn string(s: &str) -> Self {
        Self::String(Arc::from(s))
    }

    /// Create a symbol key
    pub fn symbol(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }

    /// Create an index key (`"0"`, `"1"`, ...)
    pub fn index(i: usize) -> Self {
        Self::String(Arc::from(i.to_string()))
    }

    /// String form, if this is a string key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Symbol(_) => None,
        }
    }

    /// Check if this is a symbol key
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Canonical array index (`"0"`, `"17"`; not `"01"` or `"-1"`)
    pub fn as_index(&self) -> Option<usize> {
        let s = self.as_str()?;
        if s == "0" {
            return Some(0);
        }
        if !s.starts_with(|c: char| matches!(c, '1'..='9')) || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match s.parse::<u32>() {
            Ok(n) if n < u32::MAX => Some(n as usize),
            _ => None,
        }
    }

    /// The key as a value (string or symbol)
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Symbol(sym) => Value::Symbol(sym.clone()),
        }
    }
}

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl Eq for PropertyKey {}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Self::Symbol(sym) => {
                1u8.hash(state);
                sym.id.hash(state);
            }
        }
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(sym) => write!(f, "Symbol({})", sym.description.as_deref().unwrap_or("")),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<usize> for PropertyKey {
    fn from(i: usize) -> Self {
        Self::index(i)
    }
}

impl From<Arc<Symbol>> for PropertyKey {
    fn from(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Writable and configurable but skipped by enumeration
    pub const fn hidden() -> Self {
        Self {
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}

/// Property descriptor
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<Value>,
        /// Setter function
        set: Option<Value>,
        /// Attributes (`writable` is ignored)
        attributes: PropertyAttributes,
    },
}

impl PropertyDescriptor {
    /// Create a data property
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Create an enumerable, configurable accessor property
    pub fn accessor(get: Option<Value>, set: Option<Value>) -> Self {
        Self::Accessor {
            get,
            set,
            attributes: PropertyAttributes {
                writable: false,
                enumerable: true,
                configurable: true,
            },
        }
    }

    /// Get the value (for data properties)
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Attributes of either variant
    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    /// Check if writable
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.writable,
            Self::Accessor { .. } => false,
        }
    }

    /// Check if enumerable
    pub fn is_enumerable(&self) -> bool {
        self.attributes().enumerable
    }

    /// Check if this is an accessor
    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }
}

/// Prototype link
#[derive(Clone, Debug, Default)]
pub enum Prototype {
    /// The built-in prototype for the object's kind (`Object.prototype`,
    /// `Array.prototype`, ...)
    #[default]
    Intrinsic,
    /// `Object.create(null)`
    Null,
    /// A user-supplied prototype object
    Object(GcRef<JsObject>),
}

impl Prototype {
    /// Whether two links point at the same prototype
    pub fn same_as(&self, other: &Prototype) -> bool {
        match (self, other) {
            (Self::Intrinsic, Self::Intrinsic) | (Self::Null, Self::Null) => true,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Result of looking up an object's `constructor`
#[derive(Clone, Debug)]
pub enum Constructor {
    /// A built-in constructor, by name (`"Object"`, `"Array"`, ...)
    Intrinsic(String),
    /// Whatever value the `constructor` property holds
    Value(Value),
}

impl Constructor {
    /// Whether this is a built-in constructor
    pub fn is_intrinsic(&self) -> bool {
        matches!(self, Self::Intrinsic(_))
    }

    /// Identity comparison
    pub fn same_as(&self, other: &Constructor) -> bool {
        match (self, other) {
            (Self::Intrinsic(a), Self::Intrinsic(b)) => a == b,
            (Self::Value(a), Self::Value(b)) => a.strict_equals(b),
            _ => false,
        }
    }
}

/// Built-in error constructors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// `Error`
    #[default]
    Error,
    /// `TypeError`
    TypeError,
    /// `RangeError`
    RangeError,
    /// `SyntaxError`
    SyntaxError,
    /// `ReferenceError`
    ReferenceError,
    /// `EvalError`
    EvalError,
    /// `URIError`
    UriError,
}

impl ErrorKind {
    /// Constructor name, also the default `name` property
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::TypeError => "TypeError",
            Self::RangeError => "RangeError",
            Self::SyntaxError => "SyntaxError",
            Self::ReferenceError => "ReferenceError",
            Self::EvalError => "EvalError",
            Self::UriError => "URIError",
        }
    }
}

type Elements = RwLock<Vec<Option<Value>>>;

/// Kind-specific payload
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array; `None` elements are holes
    Array(Elements),
    /// Arguments object
    Arguments(Elements),
    /// Callable
    Function(JsFunction),
    /// Map
    Map(RwLock<MapData>),
    /// Set
    Set(RwLock<SetData>),
    /// Date time value in ms since the epoch (NaN = invalid date)
    Date(RwLock<f64>),
    /// RegExp
    RegExp(JsRegExp),
    /// Error instance
    Error(ErrorKind),
    /// Boxed primitive
    Boxed(Value),
    /// ArrayBuffer
    ArrayBuffer(JsArrayBuffer),
    /// Typed array view
    TypedArray(JsTypedArray),
    /// DataView
    DataView(JsDataView),
    /// Host object with no structural meaning (WeakMap, Promise, ...)
    Opaque(Arc<str>),
}

impl ObjectKind {
    /// Name of the built-in constructor for this kind
    pub fn intrinsic_constructor(&self) -> &str {
        match self {
            Self::Ordinary | Self::Arguments(_) => "Object",
            Self::Array(_) => "Array",
            Self::Function(_) => "Function",
            Self::Map(_) => "Map",
            Self::Set(_) => "Set",
            Self::Date(_) => "Date",
            Self::RegExp(_) => "RegExp",
            Self::Error(kind) => kind.name(),
            Self::Boxed(v) => match v {
                Value::Boolean(_) => "Boolean",
                Value::Number(_) => "Number",
                Value::String(_) => "String",
                Value::BigInt(_) => "BigInt",
                Value::Symbol(_) => "Symbol",
                _ => "Object",
            },
            Self::ArrayBuffer(_) => "ArrayBuffer",
            Self::TypedArray(ta) => ta.kind().name(),
            Self::DataView(_) => "DataView",
            Self::Opaque(name) => name,
        }
    }

    /// Class name as reported by `Object.prototype.toString`
    pub fn class_name(&self) -> &str {
        match self {
            Self::Arguments(_) => "Arguments",
            _ => self.intrinsic_constructor(),
        }
    }
}

type PropertyMap = IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>;

/// A JavaScript object
///
/// Thread-safe with interior mutability.
pub struct JsObject {
    kind: ObjectKind,
    prototype: RwLock<Prototype>,
    properties: RwLock<PropertyMap>,
}

impl JsObject {
    /// Create a plain object with the given prototype
    pub fn new(prototype: Prototype) -> Self {
        Self::with_kind(ObjectKind::Ordinary, prototype)
    }

    /// Create an object of any kind
    pub fn with_kind(kind: ObjectKind, prototype: Prototype) -> Self {
        Self {
            kind,
            prototype: RwLock::new(prototype),
            properties: RwLock::new(PropertyMap::default()),
        }
    }

    /// `{}`
    pub fn ordinary() -> Self {
        Self::new(Prototype::Intrinsic)
    }

    /// Dense array
    pub fn array(elements: Vec<Value>) -> Self {
        Self::sparse_array(elements.into_iter().map(Some).collect(), Prototype::Intrinsic)
    }

    /// Array of `length` holes
    pub fn array_with_length(length: usize) -> Self {
        Self::sparse_array(vec![None; length], Prototype::Intrinsic)
    }

    /// Array with holes and an explicit prototype
    pub fn sparse_array(elements: Vec<Option<Value>>, prototype: Prototype) -> Self {
        Self::with_kind(ObjectKind::Array(RwLock::new(elements)), prototype)
    }

    /// Arguments object
    pub fn arguments(elements: Vec<Value>) -> Self {
        Self::sparse_arguments(elements.into_iter().map(Some).collect(), Prototype::Intrinsic)
    }

    /// Arguments object with holes and an explicit prototype
    pub fn sparse_arguments(elements: Vec<Option<Value>>, prototype: Prototype) -> Self {
        Self::with_kind(ObjectKind::Arguments(RwLock::new(elements)), prototype)
    }

    /// Replace the prototype of a freshly built object
    pub fn with_prototype(mut self, prototype: Prototype) -> Self {
        *self.prototype.get_mut() = prototype;
        self
    }

    /// Empty Map
    pub fn map() -> Self {
        Self::with_kind(ObjectKind::Map(RwLock::new(MapData::new())), Prototype::Intrinsic)
    }

    /// Empty Set
    pub fn new_set() -> Self {
        Self::with_kind(ObjectKind::Set(RwLock::new(SetData::new())), Prototype::Intrinsic)
    }

    /// Date
    pub fn date(time: f64) -> Self {
        Self::with_kind(ObjectKind::Date(RwLock::new(time)), Prototype::Intrinsic)
    }

    /// RegExp; defines the own `lastIndex` property
    pub fn regexp(regexp: JsRegExp, prototype: Prototype) -> Self {
        let obj = Self::with_kind(ObjectKind::RegExp(regexp), prototype);
        obj.define_property(
            PropertyKey::string("lastIndex"),
            PropertyDescriptor::data_with_attrs(
                Value::number(0.0),
                PropertyAttributes {
                    writable: true,
                    enumerable: false,
                    configurable: false,
                },
            ),
        );
        obj
    }

    /// Error; defines the own `message` and `stack` properties
    pub fn error(kind: ErrorKind, message: &str, prototype: Prototype) -> Self {
        let obj = Self::with_kind(ObjectKind::Error(kind), prototype);
        obj.define_property(
            PropertyKey::string("message"),
            PropertyDescriptor::data_with_attrs(Value::string(message), PropertyAttributes::hidden()),
        );
        let stack = if message.is_empty() {
            kind.name().to_string()
        } else {
            format!("{}: {}", kind.name(), message)
        };
        obj.define_property(
            PropertyKey::string("stack"),
            PropertyDescriptor::data_with_attrs(Value::from(stack), PropertyAttributes::hidden()),
        );
        obj
    }

    /// Boxed primitive
    pub fn boxed(primitive: Value) -> Self {
        Self::with_kind(ObjectKind::Boxed(primitive), Prototype::Intrinsic)
    }

    /// ArrayBuffer
    pub fn array_buffer(buffer: JsArrayBuffer) -> Self {
        Self::with_kind(ObjectKind::ArrayBuffer(buffer), Prototype::Intrinsic)
    }

    /// Typed array
    pub fn typed_array(view: JsTypedArray) -> Self {
        Self::with_kind(ObjectKind::TypedArray(view), Prototype::Intrinsic)
    }

    /// DataView
    pub fn data_view(view: JsDataView) -> Self {
        Self::with_kind(ObjectKind::DataView(view), Prototype::Intrinsic)
    }

    /// Function
    pub fn function(function: JsFunction) -> Self {
        Self::with_kind(ObjectKind::Function(function), Prototype::Intrinsic)
    }

    /// Opaque host object of the given class (`"WeakMap"`, `"Promise"`, ...)
    pub fn opaque(class: &str) -> Self {
        Self::with_kind(ObjectKind::Opaque(Arc::from(class)), Prototype::Intrinsic)
    }

    // ------------------------------------------------------------------
    // Kind
    // ------------------------------------------------------------------

    /// Kind payload
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Class name as reported by `Object.prototype.toString`
    pub fn class_name(&self) -> &str {
        self.kind.class_name()
    }

    /// Check if this is an array
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array(_))
    }

    /// Check if this is an Arguments object
    pub fn is_arguments(&self) -> bool {
        matches!(self.kind, ObjectKind::Arguments(_))
    }

    /// Check if this object is callable
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    /// Function payload
    pub fn as_function(&self) -> Option<&JsFunction> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Invoke this object as a function
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, String> {
        match &self.kind {
            ObjectKind::Function(f) => f.call(this, args),
            _ => Err(format!("{} is not a function", self.class_name())),
        }
    }

    /// Date time value
    pub fn date_value(&self) -> Option<f64> {
        match &self.kind {
            ObjectKind::Date(t) => Some(*t.read()),
            _ => None,
        }
    }

    /// Replace the Date time value. Returns `false` for non-dates.
    pub fn set_date_value(&self, time: f64) -> bool {
        match &self.kind {
            ObjectKind::Date(t) => {
                *t.write() = time;
                true
            }
            _ => false,
        }
    }

    /// RegExp payload
    pub fn regexp_data(&self) -> Option<&JsRegExp> {
        match &self.kind {
            ObjectKind::RegExp(re) => Some(re),
            _ => None,
        }
    }

    /// Error kind
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.kind {
            ObjectKind::Error(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Boxed primitive
    pub fn boxed_value(&self) -> Option<&Value> {
        match &self.kind {
            ObjectKind::Boxed(v) => Some(v),
            _ => None,
        }
    }

    /// ArrayBuffer payload
    pub fn array_buffer_data(&self) -> Option<&JsArrayBuffer> {
        match &self.kind {
            ObjectKind::ArrayBuffer(buf) => Some(buf),
            _ => None,
        }
    }

    /// Typed array payload
    pub fn typed_array_data(&self) -> Option<&JsTypedArray> {
        match &self.kind {
            ObjectKind::TypedArray(ta) => Some(ta),
            _ => None,
        }
    }

    /// DataView payload
    pub fn data_view_data(&self) -> Option<&JsDataView> {
        match &self.kind {
            ObjectKind::DataView(dv) => Some(dv),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Map / Set
    // ------------------------------------------------------------------

    /// Map entries in insertion order (empty for non-maps)
    pub fn map_entries(&self) -> Vec<(Value, Value)> {
        match &self.kind {
            ObjectKind::Map(data) => data.read().entries(),
            _ => Vec::new(),
        }
    }

    /// Map lookup
    pub fn map_get(&self, key: &Value) -> Option<Value> {
        match &self.kind {
            ObjectKind::Map(data) => data.read().get(key),
            _ => None,
        }
    }

    /// Map membership
    pub fn map_has(&self, key: &Value) -> bool {
        match &self.kind {
            ObjectKind::Map(data) => data.read().has(key),
            _ => false,
        }
    }

    /// Map insert. Returns `false` for non-maps.
    pub fn map_set(&self, key: Value, value: Value) -> bool {
        match &self.kind {
            ObjectKind::Map(data) => {
                data.write().set(key, value);
                true
            }
            _ => false,
        }
    }

    /// Set values in insertion order (empty for non-sets)
    pub fn set_values(&self) -> Vec<Value> {
        match &self.kind {
            ObjectKind::Set(data) => data.read().values(),
            _ => Vec::new(),
        }
    }

    /// Set membership
    pub fn set_has(&self, value: &Value) -> bool {
        match &self.kind {
            ObjectKind::Set(data) => data.read().has(value),
            _ => false,
        }
    }

    /// Set insert. Returns `false` for non-sets or duplicates.
    pub fn set_add(&self, value: Value) -> bool {
        match &self.kind {
            ObjectKind::Set(data) => data.write().add(value),
            _ => false,
        }
    }

    /// Entry count of a Map or Set
    pub fn collection_size(&self) -> Option<usize> {
        match &self.kind {
            ObjectKind::Map(data) => Some(data.read().size()),
            ObjectKind::Set(data) => Some(data.read().size()),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    fn elements_lock(&self) -> Option<&Elements> {
        match &self.kind {
            ObjectKind::Array(e) | ObjectKind::Arguments(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this object stores indexed elements
    pub fn is_array_like(&self) -> bool {
        self.elements_lock().is_some()
    }

    /// `length` of an array-like (0 otherwise)
    pub fn array_length(&self) -> usize {
        self.elements_lock().map_or(0, |e| e.read().len())
    }

    /// Element at `index`; `None` for holes and out-of-range
    pub fn element(&self, index: usize) -> Option<Value> {
        self.elements_lock()?.read().get(index).cloned().flatten()
    }

    /// Whether `index` holds a value (not a hole)
    pub fn has_element(&self, index: usize) -> bool {
        self.elements_lock()
            .is_some_and(|e| matches!(e.read().get(index), Some(Some(_))))
    }

    /// Store an element, growing with holes if needed
    pub fn set_element(&self, index: usize, value: Value) -> bool {
        let Some(lock) = self.elements_lock() else {
            return false;
        };
        let mut elements = lock.write();
        if index >= elements.len() {
            elements.resize(index + 1, None);
        }
        elements[index] = Some(value);
        true
    }

    /// Append an element
    pub fn push(&self, value: Value) -> bool {
        match self.elements_lock() {
            Some(lock) => {
                lock.write().push(Some(value));
                true
            }
            None => false,
        }
    }

    /// Truncate or extend with holes
    pub fn set_array_length(&self, length: usize) -> bool {
        match self.elements_lock() {
            Some(lock) => {
                lock.write().resize(length, None);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the elements, holes included
    pub fn elements(&self) -> Vec<Option<Value>> {
        self.elements_lock().map(|e| e.read().clone()).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Prototype
    // ------------------------------------------------------------------

    /// Prototype link
    pub fn prototype(&self) -> Prototype {
        self.prototype.read().clone()
    }

    /// Replace the prototype. Fails if the new chain would contain `self`.
    pub fn set_prototype(&self, prototype: Prototype) -> bool {
        let me = self as *const JsObject;
        let mut cursor = prototype.clone();
        while let Prototype::Object(p) = cursor {
            if std::ptr::eq(p.as_ptr(), me) {
                return false;
            }
            cursor = p.prototype();
        }
        *self.prototype.write() = prototype;
        true
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Own property descriptor (elements and array `length` included)
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        if let Some(elements) = self.elements_lock() {
            if let Some(index) = key.as_index() {
                return elements
                    .read()
                    .get(index)
                    .cloned()
                    .flatten()
                    .map(PropertyDescriptor::data);
            }
            if key.as_str() == Some("length") {
                return Some(PropertyDescriptor::data_with_attrs(
                    Value::number(elements.read().len() as f64),
                    PropertyAttributes {
                        writable: true,
                        enumerable: false,
                        configurable: false,
                    },
                ));
            }
        }
        self.properties.read().get(key).cloned()
    }

    /// Named own properties in insertion order (elements excluded)
    pub fn own_property_entries(&self) -> Vec<(PropertyKey, PropertyDescriptor)> {
        self.properties
            .read()
            .iter()
            .map(|(k, d)| (k.clone(), d.clone()))
            .collect()
    }

    /// Check own property
    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.get_own_property(key).is_some()
    }

    /// Check property along the prototype chain. Intrinsic prototypes are
    /// treated as having no enumerable-relevant members.
    pub fn has_property(&self, key: &PropertyKey) -> bool {
        if self.has_own(key) {
            return true;
        }
        let mut cursor = self.prototype();
        while let Prototype::Object(p) = cursor {
            if p.has_own(key) {
                return true;
            }
            cursor = p.prototype();
        }
        false
    }

    /// `[[Get]]`: own property, then the prototype chain. Getters run with
    /// `receiver` as `this`; a getter error is returned as `Err`.
    pub fn get(&self, key: &PropertyKey, receiver: &Value) -> Result<Value, String> {
        if let Some(desc) = self.get_own_property(key) {
            return resolve(desc, receiver);
        }
        let mut cursor = self.prototype();
        while let Prototype::Object(p) = cursor {
            if let Some(desc) = p.get_own_property(key) {
                return resolve(desc, receiver);
            }
            cursor = p.prototype();
        }
        Ok(Value::undefined())
    }

    /// Data write to an own property. Inherited setters are not consulted.
    pub fn set(&self, key: PropertyKey, value: Value) -> bool {
        if self.is_array_like() {
            if let Some(index) = key.as_index() {
                return self.set_element(index, value);
            }
            if key.as_str() == Some("length") {
                return match value.as_number() {
                    Some(n) if n >= 0.0 && n.fract() == 0.0 => self.set_array_length(n as usize),
                    _ => false,
                };
            }
        }
        let mut props = self.properties.write();
        match props.get_mut(&key) {
            Some(PropertyDescriptor::Data {
                value: slot,
                attributes,
            }) => {
                if !attributes.writable {
                    return false;
                }
                *slot = value;
                true
            }
            Some(PropertyDescriptor::Accessor { .. }) => false,
            None => {
                props.insert(key, PropertyDescriptor::data(value));
                true
            }
        }
    }

    /// Define or replace an own property. Non-configurable properties
    /// cannot be replaced. Index keys on array-likes store an element.
    pub fn define_property(&self, key: PropertyKey, desc: PropertyDescriptor) -> bool {
        if self.is_array_like() {
            if let Some(index) = key.as_index() {
                return match desc {
                    PropertyDescriptor::Data { value, .. } => self.set_element(index, value),
                    PropertyDescriptor::Accessor { .. } => false,
                };
            }
            if key.as_str() == Some("length") {
                return false;
            }
        }
        let mut props = self.properties.write();
        if let Some(existing) = props.get(&key) {
            if !existing.attributes().configurable {
                return false;
            }
        }
        props.insert(key, desc);
        true
    }

    /// Delete an own property. Elements become holes.
    pub fn delete(&self, key: &PropertyKey) -> bool {
        if let Some(lock) = self.elements_lock() {
            if let Some(index) = key.as_index() {
                if let Some(slot) = lock.write().get_mut(index) {
                    *slot = None;
                }
                return true;
            }
            if key.as_str() == Some("length") {
                return false;
            }
        }
        let mut props = self.properties.write();
        match props.get(key) {
            Some(desc) if !desc.attributes().configurable => false,
            Some(_) => {
                props.shift_remove(key);
                true
            }
            None => true,
        }
    }

    /// Own keys in property order: integer keys ascending, then strings in
    /// insertion order, then symbols in insertion order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.collect_keys(false)
    }

    /// Own enumerable keys in property order
    pub fn own_enumerable_keys(&self) -> Vec<PropertyKey> {
        self.collect_keys(true)
    }

    fn collect_keys(&self, enumerable_only: bool) -> Vec<PropertyKey> {
        let mut indices: Vec<usize> = match self.elements_lock() {
            Some(lock) => lock
                .read()
                .iter()
                .enumerate()
                .filter_map(|(i, e)| e.as_ref().map(|_| i))
                .collect(),
            None => Vec::new(),
        };
        let mut strings = Vec::new();
        let mut symbols = Vec::new();
        for (key, desc) in self.properties.read().iter() {
            if enumerable_only && !desc.is_enumerable() {
                continue;
            }
            match key {
                PropertyKey::Symbol(_) => symbols.push(key.clone()),
                PropertyKey::String(_) => match key.as_index() {
                    Some(i) => indices.push(i),
                    None => strings.push(key.clone()),
                },
            }
        }
        indices.sort_unstable();
        indices.dedup();

        let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::index).collect();
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    /// Resolve `constructor` the way `obj.constructor` would. `None` when
    /// the chain ends in `null` without one.
    pub fn constructor(&self) -> Option<Constructor> {
        let key = PropertyKey::string("constructor");
        let own = self.properties.read().get(&key).cloned();
        if let Some(desc) = own {
            return Some(Constructor::Value(
                resolve(desc, &Value::undefined()).unwrap_or_default(),
            ));
        }
        match self.prototype() {
            Prototype::Intrinsic => Some(Constructor::Intrinsic(
                self.kind.intrinsic_constructor().to_string(),
            )),
            Prototype::Null => None,
            Prototype::Object(p) => p.constructor(),
        }
    }

    /// Effective `name` of an Error: the inherited/own `name` property when
    /// it is a string, else the kind's constructor name.
    pub fn error_name(&self) -> Option<String> {
        let kind = self.error_kind()?;
        match self.get(&PropertyKey::string("name"), &Value::undefined()) {
            Ok(Value::String(s)) => Some(s.to_string()),
            _ => Some(kind.name().to_string()),
        }
    }

    /// `message` of an Error (empty when absent)
    pub fn error_message(&self) -> Option<String> {
        self.error_kind()?;
        match self.get(&PropertyKey::string("message"), &Value::undefined()) {
            Ok(Value::String(s)) => Some(s.to_string()),
            _ => Some(String::new()),
        }
    }
}

fn resolve(desc: PropertyDescriptor, receiver: &Value) -> Result<Value, String> {
    match desc {
        PropertyDescriptor::Data { value, .. } => Ok(value),
        PropertyDescriptor::Accessor { get: Some(getter), .. } => getter.call(receiver, &[]),
        PropertyDescriptor::Accessor { get: None, .. } => Ok(Value::undefined()),
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("class", &self.class_name())
            .field("elements", &self.array_length())
            .field("properties", &self.properties.read().len())
            .finish()
    }
}
