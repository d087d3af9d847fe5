//! Deep clone integration tests
//!
//! Covers independence from the source, identity preservation (cycles and
//! shared references), prototype retention and the per-kind copies.

mod common;

use common::{get, init_tracing, ints, obj, self_referential};
use replica_core::{Cloner, clone_deep, is_equal};
use replica_value::{
    ErrorKind, GcRef, JsArrayBuffer, JsClass, JsDataView, JsObject, JsTypedArray, ObjectBuilder,
    PropertyKey, TypedArrayKind, Value,
};

// ============================================================================
// Independence
// ============================================================================

#[test]
fn test_clone_is_a_new_object() {
    init_tracing();
    let original = obj(vec![("list", ints(&[1, 2])), ("n", Value::int32(1))]);
    let cloned = clone_deep(&original);

    assert!(!cloned.same_object(&original));
    assert!(!get(&cloned, "list").same_object(&get(&original, "list")));
    assert!(is_equal(&original, &cloned));
}

#[test]
fn test_mutating_source_leaves_clone_alone() {
    let original = obj(vec![("list", ints(&[1, 2]))]);
    let cloned = clone_deep(&original);

    get(&original, "list").as_object().unwrap().push(Value::int32(3));
    original.set_property("extra", Value::boolean(true));

    assert_eq!(get(&cloned, "list").as_object().unwrap().array_length(), 2);
    assert!(get(&cloned, "extra").is_undefined());
}

#[test]
fn test_mutating_clone_leaves_source_alone() {
    let original = Value::map(vec![(Value::string("k"), ints(&[1]))]);
    let cloned = clone_deep(&original);

    let cloned_map = cloned.as_object().unwrap();
    cloned_map.map_set(Value::string("other"), Value::null());
    let inner = cloned_map.map_get(&Value::string("k")).unwrap();
    inner.as_object().unwrap().set_element(0, Value::int32(99));

    let source_map = original.as_object().unwrap();
    assert_eq!(source_map.collection_size(), Some(1));
    let source_inner = source_map.map_get(&Value::string("k")).unwrap();
    assert_eq!(source_inner.element(0), Some(Value::int32(1)));
}

#[test]
fn test_primitives_clone_to_themselves() {
    for value in [
        Value::undefined(),
        Value::null(),
        Value::int32(7),
        Value::string("s"),
        Value::bigint(12),
        Value::nan(),
    ] {
        assert!(is_equal(&clone_deep(&value), &value));
    }
    let sym = Value::new_symbol(None);
    assert_eq!(clone_deep(&sym), sym);
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_cycle_is_preserved() {
    let original = self_referential("root");
    let cloned = clone_deep(&original);

    assert!(!cloned.same_object(&original));
    assert!(get(&cloned, "self").same_object(&cloned));
}

#[test]
fn test_shared_references_stay_shared() {
    let shared = obj(vec![("v", Value::int32(1))]);
    let original = obj(vec![("a", shared.clone()), ("b", shared.clone())]);
    let cloned = clone_deep(&original);

    let a = get(&cloned, "a");
    assert!(a.same_object(&get(&cloned, "b")));
    assert!(!a.same_object(&shared));
}

#[test]
fn test_map_key_and_value_aliasing() {
    let key = obj(vec![("id", Value::int32(1))]);
    let original = Value::map(vec![(key.clone(), key.clone())]);
    let cloned = clone_deep(&original);

    let (cloned_key, cloned_value) = cloned.as_object().unwrap().map_entries().remove(0);
    assert!(cloned_key.same_object(&cloned_value));
    assert!(!cloned_key.same_object(&key));
}

#[test]
fn test_cycle_through_set() {
    let set = Value::set(vec![]);
    set.as_object().unwrap().set_add(set.clone());
    let cloned = clone_deep(&set);

    let values = cloned.as_object().unwrap().set_values();
    assert_eq!(values.len(), 1);
    assert!(values[0].same_object(&cloned));
}

// ============================================================================
// Per-kind copies
// ============================================================================

#[test]
fn test_sparse_array_keeps_holes() {
    let original = Value::sparse_array(vec![Some(Value::int32(1)), None, Some(Value::int32(3))]);
    let cloned = clone_deep(&original);

    let arr = cloned.as_object().unwrap();
    assert_eq!(arr.array_length(), 3);
    assert!(!arr.has_element(1));
    assert!(!arr.has_own(&PropertyKey::index(1)));
    assert_eq!(arr.element(2), Some(Value::int32(3)));
}

#[test]
fn test_array_named_properties() {
    let original = ints(&[1]);
    original.set_property("label", Value::string("x"));
    let cloned = clone_deep(&original);
    assert_eq!(get(&cloned, "label"), Value::string("x"));
}

#[test]
fn test_arguments_stay_arguments() {
    let cloned = clone_deep(&Value::arguments(vec![Value::int32(1)]));
    assert!(cloned.as_object().unwrap().is_arguments());
    assert_eq!(cloned.element(0), Some(Value::int32(1)));
}

#[test]
fn test_class_instance_keeps_prototype() {
    let point = JsClass::new("Point").method("norm", |_, _| Ok(Value::int32(0)));
    let original = point.instance().property("x", 3).build();
    let cloned = clone_deep(&original);

    let proto = cloned.as_object().unwrap().prototype();
    assert!(proto.same_as(&replica_value::Prototype::Object(point.prototype().clone())));
    assert!(get(&cloned, "norm").is_function());
    assert!(is_equal(&original, &cloned));
}

#[test]
fn test_array_subclass_keeps_prototype() {
    let list = JsClass::new("List");
    let original = list.array_instance(vec![Value::int32(1)]);
    let cloned = clone_deep(&original);

    let arr = cloned.as_object().unwrap();
    assert!(arr.is_array());
    assert!(
        arr.prototype()
            .same_as(&replica_value::Prototype::Object(list.prototype().clone()))
    );
}

#[test]
fn test_non_enumerable_and_symbol_properties() {
    let sym = replica_value::Symbol::new(Some("tag"));
    let original = ObjectBuilder::new()
        .hidden("internal", 1)
        .property(sym.clone(), 2)
        .build();
    let cloned = clone_deep(&original);
    let copy = cloned.as_object().unwrap();

    let hidden = copy.get_own_property(&PropertyKey::string("internal")).unwrap();
    assert!(!hidden.is_enumerable());
    assert_eq!(hidden.value(), Some(&Value::int32(1)));
    assert_eq!(cloned.get(&PropertyKey::symbol(sym)).unwrap(), Value::int32(2));
}

#[test]
fn test_accessors_are_not_invoked() {
    let getter = Value::native_function("get", |_, _| Err("must not run".to_string()));
    let original = ObjectBuilder::new()
        .accessor("lazy", Some(getter.clone()), None)
        .build();
    let cloned = clone_deep(&original);

    let desc = cloned
        .as_object()
        .unwrap()
        .get_own_property(&PropertyKey::string("lazy"))
        .unwrap();
    match desc {
        replica_value::PropertyDescriptor::Accessor { get, .. } => {
            assert!(get.unwrap().same_object(&getter));
        }
        other => panic!("expected accessor, got {other:?}"),
    }
}

#[test]
fn test_functions_are_shared() {
    let f = Value::function("handler");
    let original = obj(vec![("on", f.clone())]);
    let cloned = clone_deep(&original);
    assert!(get(&cloned, "on").same_object(&f));
    assert!(clone_deep(&f).same_object(&f));
}

#[test]
fn test_date_regexp_error_boxed() {
    let date = Value::date(86_400_000.0);
    let cloned = clone_deep(&date);
    assert!(!cloned.same_object(&date));
    assert_eq!(cloned.as_object().unwrap().date_value(), Some(86_400_000.0));

    let re = Value::regexp("a|b", "gu").unwrap();
    let cloned = clone_deep(&re);
    assert!(!cloned.same_object(&re));
    assert_eq!(cloned.as_object().unwrap().regexp_data().unwrap().flags(), "gu");
    assert!(is_equal(&re, &cloned));

    let err = Value::error(ErrorKind::SyntaxError, "oops");
    let cloned = clone_deep(&err);
    assert_eq!(cloned.as_object().unwrap().error_kind(), Some(ErrorKind::SyntaxError));
    assert_eq!(cloned.as_object().unwrap().error_message().as_deref(), Some("oops"));

    let boxed = Value::boxed(Value::string("s"));
    let cloned = clone_deep(&boxed);
    assert!(!cloned.same_object(&boxed));
    assert!(is_equal(&boxed, &cloned));
}

#[test]
fn test_views_sharing_a_buffer_still_share() {
    let buffer = GcRef::new(JsObject::array_buffer(JsArrayBuffer::new(4)));
    let bytes = JsTypedArray::over(buffer.clone(), TypedArrayKind::Uint8).unwrap();
    let view = JsDataView::new(buffer.clone(), 0, None).unwrap();
    let original = obj(vec![
        ("bytes", Value::from_object(JsObject::typed_array(bytes))),
        ("view", Value::from_object(JsObject::data_view(view))),
    ]);

    let cloned = clone_deep(&original);
    let cloned_bytes = get(&cloned, "bytes");
    let cloned_view = get(&cloned, "view");
    let bytes_buffer = cloned_bytes.as_object().unwrap().typed_array_data().unwrap().buffer().clone();
    let view_buffer = cloned_view.as_object().unwrap().data_view_data().unwrap().buffer().clone();
    assert!(bytes_buffer.ptr_eq(&view_buffer));
    assert!(!bytes_buffer.ptr_eq(&buffer));

    cloned_view.as_object().unwrap().data_view_data().unwrap().set_uint8(2, 7).unwrap();
    let cloned_ta = cloned_bytes.as_object().unwrap().typed_array_data().unwrap().clone();
    assert_eq!(cloned_ta.get(2), Some(Value::int32(7)));
    assert_eq!(buffer.array_buffer_data().unwrap().get(2), Some(0));
}

// ============================================================================
// Registry reuse
// ============================================================================

#[test]
fn test_cloner_reuses_registry_across_calls() {
    let shared = ints(&[1, 2]);
    let mut cloner = Cloner::new();
    let first = cloner.clone(&obj(vec![("x", shared.clone())]));
    let second = cloner.clone(&obj(vec![("y", shared.clone())]));
    assert!(get(&first, "x").same_object(&get(&second, "y")));
}

#[test]
fn test_cloner_with_dropped_inputs() {
    let mut cloner = Cloner::new();
    let mut earlier = Vec::new();
    for round in 0..32 {
        let cloned = cloner.clone(&obj(vec![("n", Value::int32(round))]));
        assert_eq!(get(&cloned, "n"), Value::int32(round));
        assert!(earlier.iter().all(|e: &Value| !e.same_object(&cloned)));
        earlier.push(cloned);
    }
}
