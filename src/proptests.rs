//! Differential testing against a `BTreeMap<KeyBytes, u64>` shadow model,
//! grounded in `hot-rs`'s `src/proptests.rs` sibling in this retrieval
//! pack — same idea (replay a sequence of actions against both the tree
//! under test and a reference collection, assert agreement after each
//! step), adapted to this crate's fixed 6-byte key space rather than
//! `proptest-derive`'s `Arbitrary` macro, since the key space here is small
//! and uniform enough to express directly as a `Strategy`.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::key::KeyBytes;
use crate::Art;

#[derive(Debug, Clone)]
enum Action {
    Insert(KeyBytes, u64),
    Erase(KeyBytes),
    Find(KeyBytes),
    LowerBound(KeyBytes),
    UpperBound(KeyBytes),
}

/// Keys are drawn from a narrow range so the same byte collides across
/// actions often enough to exercise splits, collapses, and variant
/// growth/shrink rather than scattering one leaf per node.
fn key_strategy() -> impl Strategy<Value = KeyBytes> {
    (0u8..24, 0u8..24, 0u8..4, 0u8..4, 0u8..4, 0u8..4)
        .prop_map(|(a, b, c, d, e, f)| [a, b, c, d, e, f])
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (key_strategy(), any::<u64>()).prop_map(|(k, v)| Action::Insert(k, v)),
        2 => key_strategy().prop_map(Action::Erase),
        2 => key_strategy().prop_map(Action::Find),
        1 => key_strategy().prop_map(Action::LowerBound),
        1 => key_strategy().prop_map(Action::UpperBound),
    ]
}

fn apply(tree: &mut Art, model: &mut BTreeMap<KeyBytes, u64>, action: &Action) {
    match *action {
        Action::Insert(k, v) => {
            assert_eq!(tree.insert(k, v), model.insert(k, v), "insert({k:?}, {v})");
        }
        Action::Erase(k) => {
            assert_eq!(tree.erase(&k), model.remove(&k), "erase({k:?})");
        }
        Action::Find(k) => {
            assert_eq!(tree.find(&k), model.get(&k).copied(), "find({k:?})");
        }
        Action::LowerBound(k) => {
            let expected = model.range(k..).next().map(|(&k, &v)| (k, v));
            assert_eq!(tree.iter().lower_bound(&k), expected, "lower_bound({k:?})");
        }
        Action::UpperBound(k) => {
            let expected = model
                .range((std::ops::Bound::Excluded(k), std::ops::Bound::Unbounded))
                .next()
                .map(|(&k, &v)| (k, v));
            assert_eq!(tree.iter().upper_bound(&k), expected, "upper_bound({k:?})");
        }
    }
    assert_eq!(tree.len(), model.len());
    assert_eq!(tree.is_empty(), model.is_empty());
}

fn forward_iteration(tree: &mut Art) -> Vec<(KeyBytes, u64)> {
    let mut cursor = tree.iter();
    let mut out = Vec::new();
    let mut entry = cursor.seek_to_first();
    while let Some(kv) = entry {
        out.push(kv);
        entry = cursor.next();
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn matches_btreemap_under_random_actions(actions in prop::collection::vec(action_strategy(), 1..200)) {
        let mut tree = Art::new();
        let mut model = BTreeMap::new();
        for action in &actions {
            apply(&mut tree, &mut model, action);
        }
        tree.validate().expect("tree invariants must hold after any action sequence");

        let iterated = forward_iteration(&mut tree);
        let expected: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(iterated, expected);
    }

    #[test]
    fn shrink_to_fit_then_frozen_view_matches_live_tree(
        actions in prop::collection::vec(action_strategy(), 1..200),
    ) {
        let mut tree = Art::new();
        let mut model = BTreeMap::new();
        for action in &actions {
            apply(&mut tree, &mut model, action);
        }

        tree.shrink_to_fit();
        tree.validate().expect("shrink_to_fit must preserve invariants");

        let bytes = tree.serialize();
        prop_assert_eq!(bytes.len(), tree.size_in_bytes());
        let frozen = Art::frozen_view(&bytes).expect("serialize output must parse back");

        let expected: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(frozen.iter_ascending(), expected);
        prop_assert_eq!(frozen.len(), model.len());
    }
}
