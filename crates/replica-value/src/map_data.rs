//! Backing data structures for Map and Set.
//!
//! Keys compare by SameValueZero via `MapKey`. Storage is insertion-ordered
//! with tombstone-based deletion, so entry order survives removals.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;

use crate::value::Value;

// ============================================================================
// MapKey
// ============================================================================

/// A `Value` hashed and compared by SameValueZero.
///
/// `NaN` equals `NaN`, `+0` equals `-0`, objects and symbols compare by
/// identity, strings and BigInts by content.
#[derive(Clone, Debug)]
pub struct MapKey(pub Value);

impl MapKey {
    /// Returns a reference to the underlying `Value`.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consumes the `MapKey` and returns the underlying `Value`.
    pub fn into_value(self) -> Value {
        self.0
    }
}

const HASH_TAG_UNDEFINED: u8 = 0;
const HASH_TAG_NULL: u8 = 1;
const HASH_TAG_BOOL: u8 = 2;
const HASH_TAG_NUMBER: u8 = 3;
const HASH_TAG_STRING: u8 = 4;
const HASH_TAG_SYMBOL: u8 = 5;
const HASH_TAG_OBJECT: u8 = 6;
const HASH_TAG_BIGINT: u8 = 7;

/// Normalize a float for SameValueZero hashing: -0 → +0, NaN → canonical NaN bits.
fn normalize_float_bits(n: f64) -> u64 {
    if n == 0.0 {
        0u64
    } else if n.is_nan() {
        0x7FF8_0000_0000_0000u64
    } else {
        n.to_bits()
    }
}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Undefined => HASH_TAG_UNDEFINED.hash(state),
            Value::Null => HASH_TAG_NULL.hash(state),
            Value::Boolean(b) => {
                HASH_TAG_BOOL.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                HASH_TAG_NUMBER.hash(state);
                normalize_float_bits(*n).hash(state);
            }
            Value::String(s) => {
                HASH_TAG_STRING.hash(state);
                s.hash(state);
            }
            Value::BigInt(b) => {
                HASH_TAG_BIGINT.hash(state);
                b.hash(state);
            }
            Value::Symbol(sym) => {
                HASH_TAG_SYMBOL.hash(state);
                sym.id.hash(state);
            }
            Value::Object(obj) => {
                HASH_TAG_OBJECT.hash(state);
                obj.addr().hash(state);
            }
        }
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_value_zero(&other.0)
    }
}

impl Eq for MapKey {}

// ============================================================================
// MapData
// ============================================================================

/// Internal storage for a `Map`.
///
/// Entries are stored in a `Vec` in insertion order. Deleted entries become
/// `None` (tombstones); a separate index gives O(1) key lookup.
#[derive(Default)]
pub struct MapData {
    /// Insertion-ordered entries. `None` = tombstone (deleted).
    entries: Vec<Option<(MapKey, Value)>>,
    /// Key → index in `entries`.
    index: FxHashMap<MapKey, usize>,
    /// Count of live entries.
    size: usize,
}

impl MapData {
    /// Create an empty MapData.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Look up a key.
    pub fn get(&self, key: &Value) -> Option<Value> {
        let idx = *self.index.get(&MapKey(key.clone()))?;
        self.entries[idx].as_ref().map(|(_, v)| v.clone())
    }

    /// Check whether a key exists.
    pub fn has(&self, key: &Value) -> bool {
        self.index.contains_key(&MapKey(key.clone()))
    }

    /// Insert or update. An existing key keeps its position.
    pub fn set(&mut self, key: Value, value: Value) {
        let key = MapKey(key);
        if let Some(&idx) = self.index.get(&key) {
            if let Some((_, v)) = self.entries[idx].as_mut() {
                *v = value;
            }
            return;
        }
        let idx = self.entries.len();
        self.entries.push(Some((key.clone(), value)));
        self.index.insert(key, idx);
        self.size += 1;
    }

    /// Remove a key. Returns whether it was present.
    pub fn delete(&mut self, key: &Value) -> bool {
        match self.index.remove(&MapKey(key.clone())) {
            Some(idx) => {
                self.entries[idx] = None;
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.size = 0;
    }

    /// Snapshot of live entries in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.entries
            .iter()
            .flatten()
            .map(|(k, v)| (k.0.clone(), v.clone()))
            .collect()
    }
}

// ============================================================================
// SetData
// ============================================================================

/// Internal storage for a `Set`. Same layout as [`MapData`] without values.
#[derive(Default)]
pub struct SetData {
    entries: Vec<Option<MapKey>>,
    index: FxHashMap<MapKey, usize>,
    size: usize,
}

impl SetData {
    /// Create an empty SetData.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live values.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check membership.
    pub fn has(&self, value: &Value) -> bool {
        self.index.contains_key(&MapKey(value.clone()))
    }

    /// Add a value. Returns `false` if it was already present.
    pub fn add(&mut self, value: Value) -> bool {
        let key = MapKey(value);
        if self.index.contains_key(&key) {
            return false;
        }
        let idx = self.entries.len();
        self.entries.push(Some(key.clone()));
        self.index.insert(key, idx);
        self.size += 1;
        true
    }

    /// Remove a value. Returns whether it was present.
    pub fn delete(&mut self, value: &Value) -> bool {
        match self.index.remove(&MapKey(value.clone())) {
            Some(idx) => {
                self.entries[idx] = None;
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Remove all values.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.size = 0;
    }

    /// Snapshot of live values in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().flatten().map(|k| k.0.clone()).collect()
    }
}
