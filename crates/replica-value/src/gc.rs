//! Shared heap handles
//!
//! Heap values are reference counted. A `GcRef` is the identity of a heap
//! cell: two handles are "the same object" exactly when they point at the
//! same allocation, which is what the deep-structural engines key their
//! seen-registries on.
//!
//! There is no tracing collector behind these handles. A cyclic graph
//! (`a.self = a`) keeps itself alive until one of its edges is removed.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reference-counted handle to a heap cell with pointer identity.
pub struct GcRef<T: ?Sized> {
    inner: Arc<T>,
}

impl<T> GcRef<T> {
    /// Allocate a new heap cell.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl<T: ?Sized> GcRef<T> {
    /// Raw pointer to the cell (stable for the cell's lifetime).
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        Arc::as_ptr(&self.inner)
    }

    /// Address of the cell, used as a registry key.
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    /// Whether two handles refer to the same cell.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this cell.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T: ?Sized> Clone for GcRef<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized> Deref for GcRef<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized> fmt::Debug for GcRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GcRef({:#x})", self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = GcRef::new(1u32);
        let b = a.clone();
        let c = GcRef::new(1u32);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.addr(), b.addr());
        assert_eq!(*c, 1);
    }

    #[test]
    fn test_strong_count() {
        let a = GcRef::new("hello".to_string());
        assert_eq!(a.strong_count(), 1);
        let b = a.clone();
        assert_eq!(b.strong_count(), 2);
        assert_eq!(a.as_str(), "hello");
    }
}
