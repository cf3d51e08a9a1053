#![allow(clippy::unwrap_used, clippy::expect_used)]

// Canonicalization must not depend on how a record was built.

use infergov_core::codec::{canonical_hash, canonical_value_bytes, canonicalize, decode};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Render an object with its keys in the given order
fn render_object(pairs: &[(String, Value)]) -> String {
    let body: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}: {}", serde_json::to_string(k).unwrap(), v))
        .collect();
    format!("{{ {} }}", body.join(",\n  "))
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 é✓_-]{0,12}".prop_map(Value::String),
    ]
}

fn arb_pairs() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-z_]{1,8}", arb_leaf(), 1..12)
        .prop_map(|m| m.into_iter().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn key_order_never_changes_bytes(
        (pairs, shuffled) in arb_pairs().prop_flat_map(|p| {
            let shuffled = Just(p.clone()).prop_shuffle();
            (Just(p), shuffled)
        })
    ) {
        let a: Value = serde_json::from_str(&render_object(&pairs)).unwrap();
        let b: Value = serde_json::from_str(&render_object(&shuffled)).unwrap();

        let bytes_a = canonical_value_bytes(&a).unwrap();
        let bytes_b = canonical_value_bytes(&b).unwrap();
        prop_assert_eq!(&bytes_a, &bytes_b);
        prop_assert_eq!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
    }

    #[test]
    fn nested_key_order_never_changes_bytes(
        (pairs, shuffled) in arb_pairs().prop_flat_map(|p| {
            let shuffled = Just(p.clone()).prop_shuffle();
            (Just(p), shuffled)
        })
    ) {
        let a = format!("{{\"outer\": {}, \"list\": [{}]}}", render_object(&pairs), render_object(&pairs));
        let b = format!("{{\"list\": [{}], \"outer\": {}}}", render_object(&shuffled), render_object(&shuffled));
        let a: Value = serde_json::from_str(&a).unwrap();
        let b: Value = serde_json::from_str(&b).unwrap();
        prop_assert_eq!(canonical_value_bytes(&a).unwrap(), canonical_value_bytes(&b).unwrap());
    }

    #[test]
    fn canonical_bytes_are_a_fixed_point(pairs in arb_pairs()) {
        let v: Value = serde_json::from_str(&render_object(&pairs)).unwrap();
        let once = canonical_value_bytes(&v).unwrap();
        let reparsed: Value = decode(&once).unwrap();
        prop_assert_eq!(canonical_value_bytes(&reparsed).unwrap(), once);
    }
}

#[test]
fn test_struct_and_value_agree() {
    #[derive(serde::Serialize)]
    struct Record {
        zeta: u32,
        alpha: &'static str,
    }

    let from_struct = canonicalize(&Record { zeta: 1, alpha: "a" }).unwrap();
    let from_value = canonical_value_bytes(&json!({"alpha": "a", "zeta": 1})).unwrap();
    assert_eq!(from_struct, from_value);
    assert_eq!(from_struct, br#"{"alpha":"a","zeta":1}"#.to_vec());
}

#[test]
fn test_no_insignificant_whitespace() {
    let v: Value = serde_json::from_str("{ \"a\" : [ 1 , 2 ] ,\n \"b\" : { } }").unwrap();
    let bytes = canonical_value_bytes(&v).unwrap();
    assert_eq!(bytes, br#"{"a":[1,2],"b":{}}"#.to_vec());
}
