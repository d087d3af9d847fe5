//! ArrayBuffer storage
//!
//! A fixed-length byte buffer. Typed arrays and data views hold the owning
//! object and read through it, so views over the same buffer see each
//! other's writes.

use parking_lot::RwLock;

/// Raw bytes behind an `ArrayBuffer` object
#[derive(Debug, Default)]
pub struct JsArrayBuffer {
    data: RwLock<Vec<u8>>,
}

impl JsArrayBuffer {
    /// Zero-filled buffer of `byte_length` bytes
    pub fn new(byte_length: usize) -> Self {
        Self::from_bytes(vec![0; byte_length])
    }

    /// Buffer taking ownership of `bytes`
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(bytes),
        }
    }

    /// Length in bytes
    pub fn byte_length(&self) -> usize {
        self.data.read().len()
    }

    /// Copy of `[start, end)`, clamped to the buffer
    pub fn slice(&self, start: usize, end: usize) -> JsArrayBuffer {
        let data = self.data.read();
        let end = end.min(data.len());
        let start = start.min(end);
        JsArrayBuffer::from_bytes(data[start..end].to_vec())
    }

    /// Read a single byte
    pub fn get(&self, index: usize) -> Option<u8> {
        self.data.read().get(index).copied()
    }

    /// Write a single byte. Returns `false` when out of range.
    pub fn set(&self, index: usize, value: u8) -> bool {
        match self.data.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the whole buffer
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Run `f` with read access to the bytes
    pub fn with_data<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        f(&self.data.read())
    }

    /// Run `f` with write access to the bytes
    pub fn with_data_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        f(&mut self.data.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buf = JsArrayBuffer::new(4);
        assert_eq!(buf.byte_length(), 4);
        assert_eq!(buf.to_vec(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_get_set() {
        let buf = JsArrayBuffer::new(2);
        assert!(buf.set(1, 9));
        assert!(!buf.set(2, 9));
        assert_eq!(buf.get(1), Some(9));
        assert_eq!(buf.get(2), None);
    }

    #[test]
    fn test_slice_clamps() {
        let buf = JsArrayBuffer::from_bytes(vec![1, 2, 3, 4]);
        assert_eq!(buf.slice(1, 3).to_vec(), vec![2, 3]);
        assert_eq!(buf.slice(3, 100).to_vec(), vec![4]);
        assert_eq!(buf.slice(5, 2).byte_length(), 0);
    }
}
