//! TypedArray views
//!
//! A typed array is a window over an ArrayBuffer object. It never copies:
//! reads and writes go straight to the buffer's bytes. All 11 element types
//! share one implementation via `TypedArrayKind`.

use crate::array_buffer::JsArrayBuffer;
use crate::error::{ValueError, ValueResult};
use crate::gc::GcRef;
use crate::object::JsObject;
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// The kind of TypedArray - determines element size and interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    /// Int8Array - 8-bit signed integers
    Int8,
    /// Uint8Array - 8-bit unsigned integers
    Uint8,
    /// Uint8ClampedArray - 8-bit unsigned integers (clamped)
    Uint8Clamped,
    /// Int16Array - 16-bit signed integers
    Int16,
    /// Uint16Array - 16-bit unsigned integers
    Uint16,
    /// Int32Array - 32-bit signed integers
    Int32,
    /// Uint32Array - 32-bit unsigned integers
    Uint32,
    /// Float32Array - 32-bit floating point
    Float32,
    /// Float64Array - 64-bit floating point
    Float64,
    /// BigInt64Array - 64-bit signed integers (BigInt)
    BigInt64,
    /// BigUint64Array - 64-bit unsigned integers (BigInt)
    BigUint64,
}

impl TypedArrayKind {
    /// Get the byte size of each element
    pub fn element_size(&self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 | TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => 8,
        }
    }

    /// Get the name of this TypedArray type
    pub fn name(&self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
            TypedArrayKind::BigInt64 => "BigInt64Array",
            TypedArrayKind::BigUint64 => "BigUint64Array",
        }
    }

    /// Check if this is a BigInt typed array
    pub fn is_bigint(&self) -> bool {
        matches!(self, TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64)
    }

    fn decode(&self, bytes: &[u8]) -> Value {
        let mut raw = [0u8; 8];
        raw[..bytes.len()].copy_from_slice(bytes);
        match self {
            TypedArrayKind::Int8 => Value::number(bytes[0] as i8 as f64),
            TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => Value::number(bytes[0] as f64),
            TypedArrayKind::Int16 => Value::number(i16::from_le_bytes([raw[0], raw[1]]) as f64),
            TypedArrayKind::Uint16 => Value::number(u16::from_le_bytes([raw[0], raw[1]]) as f64),
            TypedArrayKind::Int32 => {
                Value::number(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64)
            }
            TypedArrayKind::Uint32 => {
                Value::number(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64)
            }
            TypedArrayKind::Float32 => {
                Value::number(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64)
            }
            TypedArrayKind::Float64 => Value::number(f64::from_le_bytes(raw)),
            TypedArrayKind::BigInt64 => Value::bigint(i64::from_le_bytes(raw)),
            TypedArrayKind::BigUint64 => Value::bigint(u64::from_le_bytes(raw)),
        }
    }

    fn encode(&self, value: &Value) -> Option<Vec<u8>> {
        if self.is_bigint() {
            let big: &BigInt = value.as_bigint()?;
            return Some(match self {
                TypedArrayKind::BigInt64 => big.to_i64()?.to_le_bytes().to_vec(),
                _ => big.to_u64()?.to_le_bytes().to_vec(),
            });
        }
        let n = value.as_number()?;
        let int = if n.is_finite() { n.trunc() } else { 0.0 };
        Some(match self {
            TypedArrayKind::Int8 => vec![int as i64 as i8 as u8],
            TypedArrayKind::Uint8 => vec![int as i64 as u8],
            TypedArrayKind::Uint8Clamped => {
                let clamped = if n.is_nan() { 0.0 } else { n.clamp(0.0, 255.0) };
                vec![clamped.round_ties_even() as u8]
            }
            TypedArrayKind::Int16 => (int as i64 as i16).to_le_bytes().to_vec(),
            TypedArrayKind::Uint16 => (int as i64 as u16).to_le_bytes().to_vec(),
            TypedArrayKind::Int32 => (int as i64 as i32).to_le_bytes().to_vec(),
            TypedArrayKind::Uint32 => (int as i64 as u32).to_le_bytes().to_vec(),
            TypedArrayKind::Float32 => (n as f32).to_le_bytes().to_vec(),
            TypedArrayKind::Float64 => n.to_le_bytes().to_vec(),
            TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => return None,
        })
    }
}

/// A TypedArray view over an ArrayBuffer object
#[derive(Debug, Clone)]
pub struct JsTypedArray {
    /// The ArrayBuffer object being viewed
    buffer: GcRef<JsObject>,
    /// Byte offset into the buffer
    byte_offset: usize,
    /// Number of elements (not bytes)
    length: usize,
    /// The kind of typed array
    kind: TypedArrayKind,
}

impl JsTypedArray {
    /// Create a view of `length` elements starting at `byte_offset`
    pub fn new(
        buffer: GcRef<JsObject>,
        kind: TypedArrayKind,
        byte_offset: usize,
        length: usize,
    ) -> ValueResult<Self> {
        let buffer_len = buffer
            .array_buffer_data()
            .ok_or(ValueError::NotAnArrayBuffer(kind.name()))?
            .byte_length();
        let elem_size = kind.element_size();

        if byte_offset % elem_size != 0 {
            return Err(ValueError::out_of_bounds(
                "start offset must be a multiple of the element size",
            ));
        }
        let byte_length = length
            .checked_mul(elem_size)
            .and_then(|n| n.checked_add(byte_offset))
            .ok_or(ValueError::out_of_bounds("invalid typed array length"))?;
        if byte_length > buffer_len {
            return Err(ValueError::out_of_bounds("invalid typed array length"));
        }

        Ok(Self {
            buffer,
            byte_offset,
            length,
            kind,
        })
    }

    /// View covering the whole buffer
    pub fn over(buffer: GcRef<JsObject>, kind: TypedArrayKind) -> ValueResult<Self> {
        let len = buffer
            .array_buffer_data()
            .ok_or(ValueError::NotAnArrayBuffer(kind.name()))?
            .byte_length();
        if len % kind.element_size() != 0 {
            return Err(ValueError::out_of_bounds(
                "buffer length must be a multiple of the element size",
            ));
        }
        Self::new(buffer, kind, 0, len / kind.element_size())
    }

    /// Element kind
    pub fn kind(&self) -> TypedArrayKind {
        self.kind
    }

    /// The ArrayBuffer object being viewed
    pub fn buffer(&self) -> &GcRef<JsObject> {
        &self.buffer
    }

    /// Byte offset into the buffer
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Number of elements
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of bytes covered
    pub fn byte_length(&self) -> usize {
        self.length * self.kind.element_size()
    }

    fn with_buffer<R>(&self, f: impl FnOnce(&JsArrayBuffer) -> R) -> Option<R> {
        self.buffer.array_buffer_data().map(f)
    }

    /// Copy of the viewed bytes
    pub fn bytes(&self) -> Vec<u8> {
        let (start, end) = (self.byte_offset, self.byte_offset + self.byte_length());
        self.with_buffer(|buf| buf.with_data(|data| data.get(start..end).map(<[u8]>::to_vec)))
            .flatten()
            .unwrap_or_default()
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        if index >= self.length {
            return None;
        }
        let size = self.kind.element_size();
        let start = self.byte_offset + index * size;
        let kind = self.kind;
        self.with_buffer(|buf| {
            buf.with_data(|data| data.get(start..start + size).map(|b| kind.decode(b)))
        })
        .flatten()
    }

    /// Store `value` at `index`. Returns `false` when out of range or when
    /// the value has the wrong primitive type for this kind.
    pub fn set(&self, index: usize, value: &Value) -> bool {
        if index >= self.length {
            return false;
        }
        let Some(encoded) = self.kind.encode(value) else {
            return false;
        };
        let start = self.byte_offset + index * self.kind.element_size();
        self.with_buffer(|buf| {
            buf.with_data_mut(|data| match data.get_mut(start..start + encoded.len()) {
                Some(slot) => {
                    slot.copy_from_slice(&encoded);
                    true
                }
                None => false,
            })
        })
        .unwrap_or(false)
    }

    /// All elements in order
    pub fn to_vec(&self) -> Vec<Value> {
        (0..self.length).filter_map(|i| self.get(i)).collect()
    }
}
