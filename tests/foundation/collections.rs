//! Integration tests for persistent collections
//!
//! Tests LtVec and LtMap with structural sharing and immutability.

use arbor_foundation::collections::{LtMap, LtVec};
use arbor_foundation::{EntityId, Value};
use std::collections::HashSet;

// =============================================================================
// LtVec
// =============================================================================

#[test]
fn vector_immutability() {
    let v1 = LtVec::new().push_back(Value::Int(1));
    let v2 = v1.push_back(Value::Int(2));

    // v1 is unchanged
    assert_eq!(v1.len(), 1);
    assert_eq!(v2.len(), 2);
}

#[test]
fn vector_structural_sharing() {
    let mut v = LtVec::new();
    for i in 0..1000 {
        v = v.push_back(Value::Int(i));
    }

    let v2 = v.clone();
    let v3 = v2.push_back(Value::Int(1000));
    assert_eq!(v.len(), 1000);
    assert_eq!(v3.len(), 1001);
    assert_eq!(v3.get(1000), Some(&Value::Int(1000)));
}

#[test]
fn default_vector_of_ids_is_empty() {
    let ids: LtVec<EntityId> = LtVec::default();
    let ids = ids.push_back(EntityId::new(1, 0));
    assert_eq!(ids.len(), 1);
    assert_eq!(LtMap::<EntityId, LtVec<EntityId>>::default().len(), 0);
}

#[test]
fn vector_retain_keeps_order() {
    let v: LtVec<i64> = (0..10).collect();
    let evens = v.retain(|n| n % 2 == 0);
    assert_eq!(evens.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
}

// =============================================================================
// LtMap
// =============================================================================

#[test]
fn map_insert_keeps_the_original() {
    let m1 = LtMap::new().insert("name", Value::from("guava"));
    let m2 = m1.insert("level", Value::Int(1));

    assert_eq!(m1.len(), 1);
    assert_eq!(m2.len(), 2);
    assert!(m1.get(&"level").is_none());
    assert_eq!(m2.get(&"name"), Some(&Value::from("guava")));
}

#[test]
fn map_equality_ignores_insertion_order() {
    let a = LtMap::new().insert(1, "one").insert(2, "two");
    let b = LtMap::new().insert(2, "two").insert(1, "one");
    assert_eq!(a, b);
}

#[test]
fn equal_maps_hash_equally() {
    let mut a = LtMap::new();
    let mut b = LtMap::new();
    for i in 0..50 {
        a = a.insert(Value::Int(i), Value::Int(i * 2));
    }
    for i in (0..50).rev() {
        b = b.insert(Value::Int(i), Value::Int(i * 2));
    }

    let mut set = HashSet::new();
    set.insert(Value::Map(a));
    assert!(set.contains(&Value::Map(b)));
}

#[test]
fn map_from_iterator() {
    let m: LtMap<&str, i64> = [("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(m.get(&"b"), Some(&2));
    let mut keys: Vec<_> = m.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["a", "b"]);
}
