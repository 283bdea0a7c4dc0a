use crate::value::{Number, Value, ValueTag, canonical_cmp};
use proptest::prelude::*;
use serde_json::json;
use std::cmp::Ordering;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

#[test]
fn cross_type_collation_order() {
    let ordered = vec![
        Value::Missing,
        Value::Null,
        Value::Bool(false),
        Value::Bool(true),
        Value::from(-3),
        Value::from(2.5),
        Value::from("a"),
        v(json!([1])),
        v(json!({"a": 1})),
        Value::Binary(vec![0]),
    ];

    for pair in ordered.windows(2) {
        assert_eq!(
            canonical_cmp(&pair[0], &pair[1]),
            Ordering::Less,
            "{} should sort before {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn arrays_compare_elementwise_then_by_length() {
    assert!(v(json!([1, 2])) < v(json!([1, 3])));
    assert!(v(json!([1, 2])) < v(json!([1, 2, 0])));
    assert!(v(json!([2])) > v(json!([1, 9, 9])));
}

#[test]
fn objects_compare_by_size_first() {
    assert!(v(json!({"z": 1})) < v(json!({"a": 1, "b": 2})));
    assert!(v(json!({"a": 1})) < v(json!({"a": 2})));
    assert!(v(json!({"a": 1})) < v(json!({"b": 0})));
}

#[test]
fn json_numbers_keep_integers_exact() {
    assert!(matches!(v(json!(7)), Value::Number(Number::Int(7))));
    assert!(matches!(v(json!(7.5)), Value::Number(Number::Float(_))));
    assert_eq!(v(json!(7.0)), Value::from(7));
}

#[test]
fn field_lookup_yields_missing_for_absent_paths() {
    let doc = v(json!({"a": {"b": 3}, "n": null}));

    assert_eq!(doc.path(&["a", "b"]), &Value::from(3));
    assert!(doc.path(&["a", "c"]).is_missing());
    assert!(doc.field("n").is_null());
    assert!(Value::from(3).field("a").is_missing());
}

#[test]
fn set_field_only_writes_objects() {
    let mut doc = v(json!({}));
    assert!(doc.set_field("x", Value::from(1)).is_none());
    assert_eq!(doc.field("x"), &Value::from(1));

    let mut scalar = Value::from(1);
    assert!(scalar.set_field("x", Value::Null).is_none());
    assert_eq!(scalar, Value::from(1));
}

#[test]
fn display_renders_json_and_missing() {
    assert_eq!(Value::Missing.to_string(), "MISSING");
    assert_eq!(v(json!({"a": [1, "x", null]})).to_string(), r#"{"a":[1,"x",null]}"#);
    assert_eq!(Value::Binary(vec![1, 2]).to_string(), "<binary 2 bytes>");
}

#[test]
fn non_finite_floats_become_null() {
    assert!(Value::float(f64::NAN).is_null());
    assert_eq!(Value::float(1.5).tag(), ValueTag::Number);
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Missing),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        (-50i64..50).prop_map(|i| Value::float(i as f64 / 4.0)),
        "[a-c]{0,3}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..3).prop_map(Value::Binary),
    ];

    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3).prop_map(Value::Object),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_cmp_is_antisymmetric(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(canonical_cmp(&a, &b), canonical_cmp(&b, &a).reverse());
    }

    #[test]
    fn canonical_cmp_is_transitive(a in arb_value(), b in arb_value(), c in arb_value()) {
        let mut sorted = [a, b, c];
        sorted.sort_by(canonical_cmp);
        prop_assert_ne!(canonical_cmp(&sorted[0], &sorted[2]), Ordering::Greater);
    }

    #[test]
    fn equal_values_share_a_stable_hash(a in arb_value(), b in arb_value()) {
        use crate::value::hash::stable_hash_value;
        if a == b {
            prop_assert_eq!(stable_hash_value(&a), stable_hash_value(&b));
        }
    }
}
