//! Integration-style tests exercising `Art` through its public surface,
//! including the concrete scenarios listed in spec.md §8.

use crate::key::{key_from_u48, KeyBytes};
use crate::Art;

#[test]
fn basic_crud() {
    let mut art = Art::new();
    assert_eq!(art.insert([0, 0, 0, 0, 0, 1], 1), None);
    assert_eq!(art.insert([0, 0, 0, 0, 0, 2], 2), None);
    assert_eq!(art.insert([0, 0, 0, 0, 0, 3], 3), None);
    assert_eq!(art.insert([0, 0, 0, 0, 0, 4], 4), None);
    assert_eq!(art.insert([0, 0, 0, 0, 1, 5], 5), None);

    assert_eq!(art.find(&[0, 0, 0, 0, 0, 1]), Some(1));
    assert_eq!(art.erase(&[0, 0, 0, 0, 0, 1]), Some(1));
    assert_eq!(art.find(&[0, 0, 0, 0, 0, 1]), None);
    art.validate().expect("tree should validate");
}

#[test]
fn empty_tree_bounds_are_null() {
    let mut art = Art::new();
    assert!(art.iter().lower_bound(&[0, 0, 0, 0, 0, 0]).is_none());
    assert!(art.iter().lower_bound(&[0, 0, 0, 0, 0, 1]).is_none());
}

#[test]
fn n48_shrink_and_regrow_preserves_order() {
    let mut art = Art::new();
    for byte5 in 0..48u8 {
        let mut k = [1, 2, 3, 4, 5, 0];
        k[5] = byte5;
        art.insert(k, byte5 as u64);
    }
    art.validate().expect("should validate after bulk insert");

    for byte5 in 0..8u8 {
        let mut k = [1, 2, 3, 4, 5, 0];
        k[5] = byte5;
        assert_eq!(art.erase(&k), Some(byte5 as u64));
    }
    art.validate().expect("should validate after partial erase");

    let mut cursor = art.iter();
    let mut seen = Vec::new();
    let mut entry = cursor.seek_to_first();
    while let Some((k, v)) = entry {
        seen.push((k[5], v));
        entry = cursor.next();
    }
    assert_eq!(seen, (8..48u8).map(|b| (b, b as u64)).collect::<Vec<_>>());

    for byte5 in 0..8u8 {
        let mut k = [1, 2, 3, 4, 5, 0];
        k[5] = byte5;
        art.insert(k, byte5 as u64);
    }
    art.validate().expect("should validate after re-insert");

    let mut cursor = art.iter();
    let mut seen = Vec::new();
    let mut entry = cursor.seek_to_first();
    while let Some((k, v)) = entry {
        seen.push((k[5], v));
        entry = cursor.next();
    }
    assert_eq!(seen, (0..48u8).map(|b| (b, b as u64)).collect::<Vec<_>>());
}

#[test]
fn max_depth_single_bit_keys() {
    let mut art = Art::new();
    let entries: [(KeyBytes, u64); 7] = [
        ([0, 0, 0, 0, 0, 0], 0),
        ([0, 0, 0, 0, 0, 1], 1),
        ([0, 0, 0, 0, 1, 0], 2),
        ([0, 0, 0, 1, 0, 0], 3),
        ([0, 0, 1, 0, 0, 0], 4),
        ([0, 1, 0, 0, 0, 0], 5),
        ([1, 0, 0, 0, 0, 0], 6),
    ];
    for (k, v) in entries {
        art.insert(k, v);
    }
    art.validate().expect("should validate");

    let mut cursor = art.iter();
    let mut forward = Vec::new();
    let mut entry = cursor.seek_to_first();
    while let Some(kv) = entry {
        forward.push(kv);
        entry = cursor.next();
    }
    assert_eq!(forward, entries.to_vec());

    let mut backward = Vec::new();
    let mut entry = cursor.seek_to_last();
    while let Some(kv) = entry {
        backward.push(kv);
        entry = cursor.prev();
    }
    let mut expected_rev = entries.to_vec();
    expected_rev.reverse();
    assert_eq!(backward, expected_rev);
}

#[test]
fn lower_bound_across_a_node_boundary() {
    let mut art = Art::new();
    art.insert([0, 0, 0, 0, 0, 1], 1);
    art.insert([0, 0, 0, 0, 0, 3], 3);
    art.insert([0, 0, 0, 0, 0, 4], 4);
    art.insert([0, 0, 1, 0, 0, 5], 5);

    let mut cursor = art.iter();
    let found = cursor.lower_bound(&[0, 0, 0, 0, 0, 2]);
    assert_eq!(found, Some(([0, 0, 0, 0, 0, 3], 3)));

    let found = cursor.lower_bound(&[0, 0, 0, 0, 0, 1]);
    assert_eq!(found, Some(([0, 0, 0, 0, 0, 1], 1)));
}

#[test]
fn upper_bound_is_strict() {
    let mut art = Art::new();
    art.insert([0, 0, 0, 0, 0, 1], 1);
    art.insert([0, 0, 0, 0, 0, 3], 3);

    let mut cursor = art.iter();
    assert_eq!(cursor.upper_bound(&[0, 0, 0, 0, 0, 1]), Some(([0, 0, 0, 0, 0, 3], 3)));
    assert_eq!(cursor.upper_bound(&[0, 0, 0, 0, 0, 3]), None);
}

#[test]
fn iterator_driven_bulk_erase() {
    let mut art = Art::new();
    for k in 0..10_000u64 {
        art.insert(key_from_u48(k), k);
    }
    assert_eq!(art.len(), 10_000);

    let mut cursor = art.iter();
    let mut observed = Vec::with_capacity(10_000);
    cursor.seek_to_first();
    while let Some(value) = cursor.erase_here() {
        observed.push(value);
    }

    assert_eq!(observed, (0..10_000u64).collect::<Vec<_>>());
    assert!(art.is_empty());
    art.validate().expect("empty tree should validate");
}

#[test]
fn double_insert_keeps_one_leaf_with_latest_value() {
    let mut art = Art::new();
    let k = key_from_u48(42);
    assert_eq!(art.insert(k, 1), None);
    assert_eq!(art.insert(k, 2), Some(1));
    assert_eq!(art.len(), 1);
    assert_eq!(art.find(&k), Some(2));
}

#[test]
fn shrink_serialize_frozen_round_trip_matches_iteration() {
    let mut art = Art::new();
    for k in (0..2_000u64).step_by(3) {
        art.insert(key_from_u48(k), k);
    }
    art.shrink_to_fit();
    art.validate().expect("shrink_to_fit should preserve invariants");

    let size = art.size_in_bytes();
    let bytes = art.serialize();
    assert_eq!(bytes.len(), size);

    let frozen = Art::frozen_view(&bytes).expect("frozen_view should accept its own output");

    let mut cursor = art.iter();
    let mut expected = Vec::new();
    let mut entry = cursor.seek_to_first();
    while let Some(kv) = entry {
        expected.push(kv);
        entry = cursor.next();
    }

    assert_eq!(frozen.iter_ascending(), expected);
}

#[test]
fn bulk_insert_then_bulk_erase_yields_empty_tree() {
    let mut art = Art::new();
    for k in 0..5_000u64 {
        art.insert(key_from_u48(k), k);
    }
    for k in 0..5_000u64 {
        assert_eq!(art.erase(&key_from_u48(k)), Some(k));
    }
    assert!(art.is_empty());
    assert_eq!(art.len(), 0);
    art.validate().expect("emptied tree should validate");
}

#[test]
fn erase_of_absent_key_is_idempotent() {
    let mut art = Art::new();
    art.insert(key_from_u48(5), 5);
    assert_eq!(art.erase(&key_from_u48(5)), Some(5));
    assert_eq!(art.erase(&key_from_u48(5)), None);
    assert_eq!(art.erase(&key_from_u48(5)), None);
}

#[test]
fn frozen_view_rejects_foreign_garbage() {
    let garbage = [0u8; 16];
    assert!(Art::frozen_view(&garbage).is_err());
}
