//! Identity registries
//!
//! [`SeenRegistry`] maps a source heap object to the value produced for it
//! (clone and merge). [`PairRegistry`] records which pairs of objects are
//! being compared, and which pairs are already known to be equal
//! (equality). Every entry holds the objects it is keyed on, so an address
//! in a registry always names the same live object, even when the registry
//! outlives the inputs of one call.

use replica_value::{GcRef, JsObject, Value};
use rustc_hash::FxHashMap;

/// Source object → produced value
#[derive(Debug, Default, Clone)]
pub struct SeenRegistry {
    memory: FxHashMap<usize, (GcRef<JsObject>, Value)>,
}

impl SeenRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Value previously produced for `source`
    pub fn get(&self, source: &GcRef<JsObject>) -> Option<Value> {
        self.memory
            .get(&source.addr())
            .map(|(_, produced)| produced.clone())
    }

    /// Record the value produced for `source`, returning the value it
    /// replaces. The registry keeps `source` alive until the entry is
    /// removed.
    pub fn insert(&mut self, source: &GcRef<JsObject>, produced: Value) -> Option<Value> {
        self.memory
            .insert(source.addr(), (source.clone(), produced))
            .map(|(_, previous)| previous)
    }

    /// Drop the entry for `source`
    pub fn remove(&mut self, source: &GcRef<JsObject>) -> Option<Value> {
        self.memory
            .remove(&source.addr())
            .map(|(_, produced)| produced)
    }

    /// Whether `source` has been seen
    pub fn contains(&self, source: &GcRef<JsObject>) -> bool {
        self.memory.contains_key(&source.addr())
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Forget every entry
    pub fn clear(&mut self) {
        self.memory.clear();
    }
}

/// Pairs under comparison, one map per side, plus the pairs already
/// proven equal.
///
/// Entries are pushed when a pair starts comparing and popped when it
/// finishes, so `left` and `right` always describe the current comparison
/// path. A pair that finishes equal without leaning on a pair further up
/// the path is remembered, so shared substructure is compared once.
#[derive(Debug, Default)]
pub struct PairRegistry {
    /// `a` → (`b`, path depth)
    left: FxHashMap<usize, Vec<(usize, usize)>>,
    /// `b` → (`a`, path depth)
    right: FxHashMap<usize, Vec<(usize, usize)>>,
    /// Shallowest path depth each open pair has leaned on
    frames: Vec<usize>,
    equal: FxHashMap<(usize, usize), (GcRef<JsObject>, GcRef<JsObject>)>,
}

impl PairRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(true)` when the pair was already proven equal. Otherwise
    /// `Some(result)` when both objects are on the path: the pair is equal
    /// exactly when each was entered against the other.
    pub fn lookup(&mut self, a: &GcRef<JsObject>, b: &GcRef<JsObject>) -> Option<bool> {
        if self.equal.contains_key(&(a.addr(), b.addr())) {
            return Some(true);
        }
        let &(partner, a_depth) = self.left.get(&a.addr()).and_then(|v| v.last())?;
        let &(other_partner, b_depth) = self.right.get(&b.addr()).and_then(|v| v.last())?;
        self.lean_on(a_depth.min(b_depth));
        Some(partner == b.addr() && other_partner == a.addr())
    }

    /// Push `(a, b)` onto the path
    pub fn enter(&mut self, a: &GcRef<JsObject>, b: &GcRef<JsObject>) {
        let depth = self.frames.len();
        self.left.entry(a.addr()).or_default().push((b.addr(), depth));
        self.right.entry(b.addr()).or_default().push((a.addr(), depth));
        self.frames.push(usize::MAX);
    }

    /// Pop `(a, b)` from the path with the outcome of its comparison
    pub fn exit(&mut self, a: &GcRef<JsObject>, b: &GcRef<JsObject>, result: bool) {
        pop(&mut self.left, a.addr());
        pop(&mut self.right, b.addr());
        let leaned = self.frames.pop().unwrap_or(usize::MAX);
        let depth = self.frames.len();
        if leaned < depth {
            // Provisional: the outcome assumed an ancestor is equal
            self.lean_on(leaned);
        } else if result {
            self.equal
                .insert((a.addr(), b.addr()), (a.clone(), b.clone()));
        }
    }

    /// Whether no comparison is in progress
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty() && self.frames.is_empty()
    }

    /// Number of pairs proven equal so far
    pub fn proven(&self) -> usize {
        self.equal.len()
    }

    fn lean_on(&mut self, depth: usize) {
        if let Some(top) = self.frames.last_mut() {
            *top = (*top).min(depth);
        }
    }
}

fn pop(map: &mut FxHashMap<usize, Vec<(usize, usize)>>, key: usize) {
    if let Some(stack) = map.get_mut(&key) {
        stack.pop();
        if stack.is_empty() {
            map.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj() -> GcRef<JsObject> {
        GcRef::new(JsObject::ordinary())
    }

    #[test]
    fn test_seen_registry() {
        let a = obj();
        let mut seen = SeenRegistry::new();
        assert!(seen.get(&a).is_none());

        assert_eq!(seen.insert(&a, Value::int32(1)), None);
        assert!(seen.contains(&a));
        assert_eq!(seen.get(&a), Some(Value::int32(1)));
        assert_eq!(seen.len(), 1);

        assert_eq!(seen.insert(&a, Value::int32(2)), Some(Value::int32(1)));
        assert_eq!(seen.remove(&a), Some(Value::int32(2)));
        assert!(!seen.contains(&a));
        seen.insert(&a, Value::int32(3));

        seen.clear();
        assert!(seen.is_empty());
    }

    #[test]
    fn test_pair_lookup_requires_both_sides() {
        let (a, b, c) = (obj(), obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);

        assert_eq!(pairs.lookup(&a, &b), Some(true));
        assert_eq!(pairs.lookup(&a, &c), None);
        assert_eq!(pairs.lookup(&c, &b), None);
    }

    #[test]
    fn test_pair_mismatch() {
        let (a, b, c, d) = (obj(), obj(), obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);
        pairs.enter(&c, &d);

        assert_eq!(pairs.lookup(&a, &d), Some(false));
    }

    #[test]
    fn test_exit_restores_outer_entry() {
        let (a, b, c) = (obj(), obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);
        pairs.enter(&a, &c);
        assert_eq!(pairs.lookup(&a, &c), Some(true));

        pairs.exit(&a, &c, true);
        assert_eq!(pairs.lookup(&a, &b), Some(true));
        pairs.exit(&a, &b, true);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_seen_registry_keeps_sources_alive() {
        let mut seen = SeenRegistry::new();
        let first = obj();
        let addr = first.addr();
        seen.insert(&first, Value::int32(1));
        drop(first);

        // The entry still owns the first object, so no new object can take
        // its address while the entry exists.
        let others: Vec<_> = (0..64).map(|_| obj()).collect();
        assert!(others.iter().all(|o| o.addr() != addr));
        assert!(others.iter().all(|o| seen.get(o).is_none()));
    }

    #[test]
    fn test_finished_equal_pair_is_remembered() {
        let (a, b) = (obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);
        pairs.exit(&a, &b, true);

        assert!(pairs.is_empty());
        assert_eq!(pairs.proven(), 1);
        assert_eq!(pairs.lookup(&a, &b), Some(true));
        assert_eq!(pairs.lookup(&b, &a), None);
    }

    #[test]
    fn test_unequal_pair_is_not_remembered() {
        let (a, b) = (obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);
        pairs.exit(&a, &b, false);
        assert_eq!(pairs.proven(), 0);
        assert_eq!(pairs.lookup(&a, &b), None);
    }

    #[test]
    fn test_result_leaning_on_ancestor_is_not_remembered() {
        let (a, b, c, d) = (obj(), obj(), obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);
        pairs.enter(&c, &d);
        // c and d point back at a and b, which are still open
        assert_eq!(pairs.lookup(&a, &b), Some(true));
        pairs.exit(&c, &d, true);
        pairs.exit(&a, &b, false);

        assert_eq!(pairs.proven(), 0);
        assert_eq!(pairs.lookup(&c, &d), None);
    }

    #[test]
    fn test_self_cycle_is_remembered() {
        let (a, b) = (obj(), obj());
        let mut pairs = PairRegistry::new();
        pairs.enter(&a, &b);
        assert_eq!(pairs.lookup(&a, &b), Some(true));
        pairs.exit(&a, &b, true);
        assert_eq!(pairs.proven(), 1);
    }
}
