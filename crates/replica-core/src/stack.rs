//! Stack growth for deep recursion.
//!
//! All three engines recurse once per nesting level. Inputs nested tens of
//! thousands of levels deep would overflow a thread's native stack, so each
//! recursive step runs through [`ensure_sufficient_stack`].
//!
//! - **Red zone**: 100KB. With less than this remaining, the stack grows.
//! - **Growth size**: 1MB per segment.

/// Minimum stack space to keep available.
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
