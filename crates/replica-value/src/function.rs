//! Callable objects
//!
//! Functions are opaque to the deep-structural engines: they are compared by
//! identity and shared rather than copied. A function may carry a native
//! closure so that getters and constructors can run real code.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Native behavior: `(this, args) -> result`. Errors carry a message.
pub type NativeFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, String> + Send + Sync>;

/// Syntactic flavor of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionFlavor {
    /// `function f() {}`
    #[default]
    Normal,
    /// `() => {}`
    Arrow,
    /// `class C {}`
    Class,
    /// `async function f() {}`
    Async,
    /// `function* f() {}`
    Generator,
    /// `async function* f() {}`
    AsyncGenerator,
}

/// Function payload of a callable object
#[derive(Clone)]
pub struct JsFunction {
    name: String,
    flavor: FunctionFlavor,
    behavior: Option<NativeFn>,
}

impl JsFunction {
    /// Function with no behavior; calling it returns `undefined`
    pub fn new(name: &str, flavor: FunctionFlavor) -> Self {
        Self {
            name: name.to_string(),
            flavor,
            behavior: None,
        }
    }

    /// Function backed by a Rust closure
    pub fn native<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            flavor: FunctionFlavor::Normal,
            behavior: Some(Arc::new(f)),
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Syntactic flavor
    pub fn flavor(&self) -> FunctionFlavor {
        self.flavor
    }

    /// Invoke with `this` and `args`
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, String> {
        match &self.behavior {
            Some(f) => f(this, args),
            None => Ok(Value::undefined()),
        }
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsFunction")
            .field("name", &self.name)
            .field("flavor", &self.flavor)
            .field("native", &self.behavior.is_some())
            .finish()
    }
}
