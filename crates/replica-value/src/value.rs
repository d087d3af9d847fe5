//! JavaScript-style values
//!
//! `Value` is a small, cheaply clonable enum. Primitives are stored inline;
//! everything with identity lives behind a [`GcRef<JsObject>`]. Symbols are
//! primitives with identity: two symbols are equal only when they share an
//! id, whatever their descriptions say.

use crate::array_buffer::JsArrayBuffer;
use crate::error::{ValueError, ValueResult};
use crate::function::{FunctionFlavor, JsFunction};
use crate::gc::GcRef;
use crate::object::{ErrorKind, JsObject, PropertyKey, Prototype};
use crate::regexp::JsRegExp;
use chrono::{DateTime, NaiveDate};
use num_bigint::BigInt;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A JavaScript Symbol
#[derive(Debug)]
pub struct Symbol {
    /// Symbol description
    pub description: Option<String>,
    /// Unique ID
    pub id: u64,
}

impl Symbol {
    /// Create a fresh symbol, distinct from every other symbol.
    pub fn new(description: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            description: description.map(str::to_string),
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
        })
    }
}

/// A JavaScript value
#[derive(Clone)]
pub enum Value {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean primitive
    Boolean(bool),
    /// Number primitive (IEEE 754 double)
    Number(f64),
    /// String primitive
    String(Arc<str>),
    /// BigInt primitive
    BigInt(Arc<BigInt>),
    /// Symbol primitive
    Symbol(Arc<Symbol>),
    /// Any heap object (arrays, functions, maps, ...)
    Object(GcRef<JsObject>),
}

impl Value {
    /// Create undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// Create null value
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Create boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Create number value
    #[inline]
    pub const fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create number value from a 32-bit integer
    #[inline]
    pub fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// Create NaN value explicitly
    #[inline]
    pub const fn nan() -> Self {
        Self::Number(f64::NAN)
    }

    /// Create string value
    pub fn string(s: &str) -> Self {
        Self::String(Arc::from(s))
    }

    /// Create BigInt value
    pub fn bigint(value: impl Into<BigInt>) -> Self {
        Self::BigInt(Arc::new(value.into()))
    }

    /// Create Symbol value
    pub fn symbol(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }

    /// Create a fresh symbol value with an optional description
    pub fn new_symbol(description: Option<&str>) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    /// Create object value
    pub fn object(obj: GcRef<JsObject>) -> Self {
        Self::Object(obj)
    }

    /// Allocate an object and wrap it
    pub fn from_object(obj: JsObject) -> Self {
        Self::Object(GcRef::new(obj))
    }

    /// Empty plain object (`{}`)
    pub fn plain_object() -> Self {
        Self::from_object(JsObject::ordinary())
    }

    /// Dense array
    pub fn array(elements: Vec<Value>) -> Self {
        Self::from_object(JsObject::array(elements))
    }

    /// Array with holes; `None` marks an absent index
    pub fn sparse_array(elements: Vec<Option<Value>>) -> Self {
        Self::from_object(JsObject::sparse_array(elements, Prototype::Intrinsic))
    }

    /// Arguments object
    pub fn arguments(elements: Vec<Value>) -> Self {
        Self::from_object(JsObject::arguments(elements))
    }

    /// Map from `(key, value)` pairs, in insertion order
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        let obj = JsObject::map();
        for (k, v) in entries {
            obj.map_set(k, v);
        }
        Self::from_object(obj)
    }

    /// Set from values, in insertion order
    pub fn set(values: Vec<Value>) -> Self {
        let obj = JsObject::new_set();
        for v in values {
            obj.set_add(v);
        }
        Self::from_object(obj)
    }

    /// Date from a time value in milliseconds since the epoch (NaN = invalid)
    pub fn date(time: f64) -> Self {
        Self::from_object(JsObject::date(time))
    }

    /// Invalid date (`new Date(NaN)`)
    pub fn invalid_date() -> Self {
        Self::date(f64::NAN)
    }

    /// Date parsed from RFC 3339 (`2020-01-01T00:00:00Z`) or a bare
    /// `YYYY-MM-DD` date (midnight UTC)
    pub fn date_from_iso(text: &str) -> ValueResult<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::date(dt.timestamp_millis() as f64));
        }
        let day = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| ValueError::InvalidDate(text.to_string()))?;
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| ValueError::InvalidDate(text.to_string()))?;
        Ok(Self::date(midnight.and_utc().timestamp_millis() as f64))
    }

    /// RegExp from pattern and flags
    pub fn regexp(source: &str, flags: &str) -> ValueResult<Self> {
        let re = JsRegExp::new(source, flags)?;
        Ok(Self::from_object(JsObject::regexp(re, Prototype::Intrinsic)))
    }

    /// Error of the given kind
    pub fn error(kind: ErrorKind, message: &str) -> Self {
        Self::from_object(JsObject::error(kind, message, Prototype::Intrinsic))
    }

    /// Boxed primitive (`new String("a")`, `Object(sym)`, ...)
    pub fn boxed(primitive: Value) -> Self {
        Self::from_object(JsObject::boxed(primitive))
    }

    /// ArrayBuffer holding a copy of `bytes`
    pub fn array_buffer(bytes: &[u8]) -> Self {
        Self::from_object(JsObject::array_buffer(JsArrayBuffer::from_bytes(
            bytes.to_vec(),
        )))
    }

    /// Opaque callable without behavior
    pub fn function(name: &str) -> Self {
        Self::from_object(JsObject::function(JsFunction::new(
            name,
            FunctionFlavor::Normal,
        )))
    }

    /// Callable backed by a Rust closure
    pub fn native_function<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::from_object(JsObject::function(JsFunction::native(name, f)))
    }

    /// Check if value is undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Check if value is null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if value is null or undefined
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Check if value is a boolean
    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    /// Check if value is a number (including NaN)
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Check if value is NaN
    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Number(n) if n.is_nan())
    }

    /// Check if value is a string
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Check if value is a BigInt
    #[inline]
    pub fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    /// Check if value is a symbol
    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Check if value is an object (arrays, functions, maps, ...)
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Check if value is a primitive
    #[inline]
    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    /// Check if value is callable
    pub fn is_function(&self) -> bool {
        self.as_object().is_some_and(|o| o.is_callable())
    }

    /// Check if value is an array (not an Arguments object)
    pub fn is_array(&self) -> bool {
        self.as_object().is_some_and(|o| o.is_array())
    }

    /// Get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number (f64)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as BigInt
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Self::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// Get as symbol
    pub fn as_symbol(&self) -> Option<&Arc<Symbol>> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&GcRef<JsObject>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// `typeof` result
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::BigInt(_) => "bigint",
            Self::Symbol(_) => "symbol",
            Self::Object(o) if o.is_callable() => "function",
            Self::Object(_) => "object",
        }
    }

    /// Strict equality (`===`). `NaN !== NaN`, `-0 === 0`.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.id == b.id,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// SameValueZero: strict equality except that NaN equals NaN.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    /// Whether both values are the same heap object
    pub fn same_object(&self, other: &Value) -> bool {
        matches!((self, other), (Self::Object(a), Self::Object(b)) if a.ptr_eq(b))
    }

    /// Property read through the prototype chain, invoking getters with
    /// `self` as receiver. Primitives have no own properties here.
    pub fn get(&self, key: &PropertyKey) -> Result<Value, String> {
        match self {
            Self::Object(obj) => obj.get(key, self),
            _ => Ok(Value::Undefined),
        }
    }

    /// Shorthand for [`Value::get`] with a string key
    pub fn get_str(&self, key: &str) -> Result<Value, String> {
        self.get(&PropertyKey::string(key))
    }

    /// Data property write. Returns `false` for primitives and rejected writes.
    pub fn set_property(&self, key: impl Into<PropertyKey>, value: Value) -> bool {
        match self {
            Self::Object(obj) => obj.set(key.into(), value),
            _ => false,
        }
    }

    /// Element at `index` for array-like objects (`None` for holes)
    pub fn element(&self, index: usize) -> Option<Value> {
        self.as_object().and_then(|o| o.element(index))
    }

    /// Invoke a callable
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, String> {
        match self {
            Self::Object(obj) => obj.call(this, args),
            _ => Err(format!("{} is not a function", self.type_of())),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Undefined
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::BigInt(b) => write!(f, "{b}n"),
            Self::Symbol(s) => match &s.description {
                Some(d) => write!(f, "Symbol({d})"),
                None => write!(f, "Symbol()"),
            },
            Self::Object(o) => write!(f, "{:?}", **o),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<GcRef<JsObject>> for Value {
    fn from(obj: GcRef<JsObject>) -> Self {
        Self::Object(obj)
    }
}

impl From<Arc<Symbol>> for Value {
    fn from(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }
}
