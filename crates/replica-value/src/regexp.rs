//! RegExp matcher state
//!
//! A RegExp object carries its pattern source, its flags in canonical order,
//! and the compiled `regress` matcher. `lastIndex` is an own data property
//! of the object (see `JsObject::regexp`), not part of this struct.

use crate::error::{ValueError, ValueResult};
use regress::{Flags, Regex};
use std::fmt;
use std::sync::Arc;

/// Flags in the order `RegExp.prototype.flags` reports them
const CANONICAL_FLAGS: &str = "dgimsuvy";

/// Compiled regular expression
#[derive(Clone)]
pub struct JsRegExp {
    source: String,
    flags: String,
    native_regex: Arc<Regex>,
}

impl JsRegExp {
    /// Compile `source` with `flags`. Flags may come in any order; they are
    /// stored canonically so `/a/gi` and `/a/ig` report the same flags.
    pub fn new(source: &str, flags: &str) -> ValueResult<Self> {
        let flags = canonicalize_flags(flags)?;
        let parsed_flags = Flags::from(flags.as_str());
        let native_regex =
            Regex::with_flags(source, parsed_flags).map_err(|e| ValueError::InvalidRegExp {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            source: source.to_string(),
            flags,
            native_regex: Arc::new(native_regex),
        })
    }

    /// Pattern text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Canonical flags string
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Whether `flag` is set
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.native_regex.find(text).is_some()
    }
}

impl fmt::Debug for JsRegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

fn canonicalize_flags(flags: &str) -> ValueResult<String> {
    let mut seen = [false; CANONICAL_FLAGS.len()];
    for c in flags.chars() {
        let slot = CANONICAL_FLAGS
            .find(c)
            .ok_or_else(|| ValueError::InvalidRegExpFlags(flags.to_string()))?;
        if seen[slot] {
            return Err(ValueError::InvalidRegExpFlags(flags.to_string()));
        }
        seen[slot] = true;
    }
    // `u` and `v` are mutually exclusive
    if flags.contains('u') && flags.contains('v') {
        return Err(ValueError::InvalidRegExpFlags(flags.to_string()));
    }
    Ok(CANONICAL_FLAGS
        .chars()
        .zip(seen)
        .filter_map(|(c, on)| on.then_some(c))
        .collect())
}
