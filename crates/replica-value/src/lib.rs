//! # Replica Value
//!
//! The dynamically-typed value model the deep-structural engines operate on.
//!
//! ## Design Principles
//!
//! - **Thread-safe**: `Value` and `JsObject` are `Send + Sync`
//! - **Identity**: heap objects are compared by pointer via [`GcRef`]
//! - **Faithful objects**: prototypes, property descriptors, symbol keys
//!   and array holes are all observable

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod array_buffer;
pub mod builder;
pub mod data_view;
pub mod error;
pub mod function;
pub mod gc;
pub mod json;
pub mod map_data;
pub mod object;
pub mod regexp;
pub mod typed_array;
pub mod value;

pub use array_buffer::JsArrayBuffer;
pub use builder::{JsClass, ObjectBuilder};
pub use data_view::JsDataView;
pub use error::{ValueError, ValueResult};
pub use function::{FunctionFlavor, JsFunction, NativeFn};
pub use gc::GcRef;
pub use map_data::{MapData, MapKey, SetData};
pub use object::{
    Constructor, ErrorKind, JsObject, ObjectKind, PropertyAttributes, PropertyDescriptor,
    PropertyKey, Prototype,
};
pub use regexp::JsRegExp;
pub use typed_array::{JsTypedArray, TypedArrayKind};
pub use value::{Symbol, Value};
