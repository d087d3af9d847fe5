//! DataView
//!
//! An untyped byte window over an ArrayBuffer object.

use crate::array_buffer::JsArrayBuffer;
use crate::error::{ValueError, ValueResult};
use crate::gc::GcRef;
use crate::object::JsObject;

/// A DataView over an ArrayBuffer object
#[derive(Debug, Clone)]
pub struct JsDataView {
    buffer: GcRef<JsObject>,
    byte_offset: usize,
    byte_length: usize,
}

impl JsDataView {
    /// Create a view starting at `byte_offset`. `byte_length` defaults to
    /// the rest of the buffer.
    pub fn new(
        buffer: GcRef<JsObject>,
        byte_offset: usize,
        byte_length: Option<usize>,
    ) -> ValueResult<Self> {
        let buffer_len = buffer
            .array_buffer_data()
            .ok_or(ValueError::NotAnArrayBuffer("DataView"))?
            .byte_length();

        if byte_offset > buffer_len {
            return Err(ValueError::out_of_bounds("start offset is outside the bounds of the buffer"));
        }
        let byte_length = byte_length.unwrap_or(buffer_len - byte_offset);
        if byte_offset + byte_length > buffer_len {
            return Err(ValueError::out_of_bounds("invalid DataView length"));
        }

        Ok(Self {
            buffer,
            byte_offset,
            byte_length,
        })
    }

    /// The ArrayBuffer object being viewed
    pub fn buffer(&self) -> &GcRef<JsObject> {
        &self.buffer
    }

    /// Offset of the view within the buffer
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Length of the view in bytes
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    fn with_buffer<R>(&self, f: impl FnOnce(&JsArrayBuffer) -> R) -> Option<R> {
        self.buffer.array_buffer_data().map(f)
    }

    /// Copy of the viewed bytes
    pub fn bytes(&self) -> Vec<u8> {
        let (start, end) = (self.byte_offset, self.byte_offset + self.byte_length);
        self.with_buffer(|buf| buf.with_data(|data| data.get(start..end).map(<[u8]>::to_vec)))
            .flatten()
            .unwrap_or_default()
    }

    /// Read the byte at view offset `offset`
    pub fn get_uint8(&self, offset: usize) -> ValueResult<u8> {
        if offset >= self.byte_length {
            return Err(ValueError::out_of_bounds("offset is outside the bounds of the DataView"));
        }
        self.with_buffer(|buf| buf.get(self.byte_offset + offset))
            .flatten()
            .ok_or(ValueError::out_of_bounds("offset is outside the bounds of the DataView"))
    }

    /// Write the byte at view offset `offset`
    pub fn set_uint8(&self, offset: usize, value: u8) -> ValueResult<()> {
        if offset >= self.byte_length {
            return Err(ValueError::out_of_bounds("offset is outside the bounds of the DataView"));
        }
        match self.with_buffer(|buf| buf.set(self.byte_offset + offset, value)) {
            Some(true) => Ok(()),
            _ => Err(ValueError::out_of_bounds("offset is outside the bounds of the DataView")),
        }
    }
}
