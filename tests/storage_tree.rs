// ==============================================
// STORAGE TREE TESTS (integration)
// ==============================================
//
// End-to-end behavior of `Root` through the public builder: lookups, limits,
// lifecycle callbacks and the last-path record.

use std::cell::RefCell;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use memokit::prelude::*;
use proptest::prelude::*;

// ==============================================
// Observer that audits lifecycle events
// ==============================================

#[derive(Default)]
struct Audit {
    live_storages: HashSet<StorageId>,
    removed_storages: HashSet<StorageId>,
    live_nested: usize,
    live_leaf_storages: usize,
    live_leaves: usize,
    leaf_log: Vec<String>,
    leaf_owners: Vec<StorageId>,
}

#[derive(Clone, Default)]
struct Auditor(Rc<RefCell<Audit>>);

impl Observer<u32, u32> for Auditor {
    fn on_create_storage(&mut self, info: StorageInfo) {
        let mut audit = self.0.borrow_mut();
        assert!(audit.live_storages.insert(info.id), "storage created twice");
        match info.kind {
            StorageKind::Nested => audit.live_nested += 1,
            StorageKind::Leaf => audit.live_leaf_storages += 1,
        }
    }

    fn on_remove_storage(&mut self, info: StorageInfo) {
        let mut audit = self.0.borrow_mut();
        assert!(audit.live_storages.remove(&info.id), "unknown storage removed");
        assert!(audit.removed_storages.insert(info.id), "storage removed twice");
        match info.kind {
            StorageKind::Nested => audit.live_nested -= 1,
            StorageKind::Leaf => audit.live_leaf_storages -= 1,
        }
    }

    fn on_create_leaf(&mut self, storage: StorageInfo, _key: &u32, value: &u32) {
        let mut audit = self.0.borrow_mut();
        assert_eq!(storage.kind, StorageKind::Leaf);
        assert!(audit.live_storages.contains(&storage.id), "entry in unknown storage");
        audit.live_leaves += 1;
        audit.leaf_log.push(format!("+{value}"));
        audit.leaf_owners.push(storage.id);
    }

    fn on_remove_leaf(&mut self, storage: StorageInfo, _key: &u32, value: &u32) {
        let mut audit = self.0.borrow_mut();
        assert_eq!(storage.kind, StorageKind::Leaf);
        audit.live_leaves -= 1;
        audit.leaf_log.push(format!("-{value}"));
    }
}

fn audited(builder: TreeBuilder) -> (Root<u32, u32>, Rc<RefCell<Audit>>) {
    let auditor = Auditor::default();
    let audit = auditor.0.clone();
    (builder.observer(auditor).build::<u32, u32>(), audit)
}

fn encode(path: &[u32]) -> u32 {
    path.iter().fold(0, |acc, k| acc * 10 + k)
}

// ==============================================
// Lookups
// ==============================================

#[test]
fn deep_round_trip() {
    let mut root = TreeBuilder::new(4).build::<u32, u32>();
    let paths = [[1, 2, 3, 4], [1, 2, 3, 5], [1, 9, 3, 4], [7, 2, 3, 4]];
    for path in &paths {
        assert_eq!(root.get_or_insert_with(path, encode).unwrap(), encode(path));
    }
    for path in &paths {
        assert_eq!(root.extract_path(path), Some(&encode(path)));
    }
    assert_eq!(root.len(), 4);
    assert_eq!(root.extract_path(&[1, 2, 3, 6]), None);
    assert_eq!(root.extract_path(&[1, 2, 4, 4]), None);
    assert_eq!(root.extract_path(&[2, 2, 3, 4]), None);
}

#[test]
fn repeated_path_computes_once() {
    let mut root = TreeBuilder::new(3).build::<u32, u32>();
    let mut calls = 0;
    for _ in 0..5 {
        let value = root
            .get_or_insert_with(&[4, 5, 6], |p| {
                calls += 1;
                encode(p)
            })
            .unwrap();
        assert_eq!(value, 456);
    }
    assert_eq!(calls, 1);
}

#[test]
fn interleaved_paths_stay_consistent() {
    let mut root = TreeBuilder::new(2).build::<u32, u32>();
    for round in 0..3 {
        for a in 0..4 {
            for b in 0..4 {
                let mut computed = false;
                let value = root
                    .get_or_insert_with(&[a, b], |p| {
                        computed = true;
                        encode(p)
                    })
                    .unwrap();
                assert_eq!(value, a * 10 + b);
                assert_eq!(computed, round == 0);
            }
        }
    }
}

#[test]
fn path_length_is_checked() {
    let mut root = TreeBuilder::new(3).build::<u32, u32>();
    let err = root.get_or_insert_with(&[1, 2], encode).unwrap_err();
    assert!(matches!(
        err,
        MemoError::PathLength {
            expected: 3,
            actual: 2
        }
    ));
    assert!(root.get_or_insert_with(&[1, 2, 3, 4], encode).is_err());
    assert!(root.is_empty());
    assert_eq!(root.storage_count(), 1);
}

// ==============================================
// Failing computations
// ==============================================

#[test]
fn failed_computation_is_not_cached() {
    let (mut root, audit) = audited(TreeBuilder::new(3));

    let result: Result<u32, MemoError> = root.try_get_or_insert_with(&[1, 2, 3], |_| {
        Err(MemoError::from(ConfigError::new("unavailable")))
    });
    assert!(result.is_err());
    assert!(root.is_empty());
    assert_eq!(root.storage_count(), 1);
    assert!(audit.borrow().leaf_log.is_empty());

    assert_eq!(root.get_or_insert_with(&[1, 2, 3], encode).unwrap(), 123);
}

#[test]
fn panicking_computation_leaves_tree_untouched() {
    let mut root = TreeBuilder::new(2).build::<u32, u32>();
    root.get_or_insert_with(&[1, 1], encode).unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _ = root.get_or_insert_with(&[1, 2], |_| panic!("boom"));
    }));
    assert!(outcome.is_err());

    assert_eq!(root.len(), 1);
    assert_eq!(root.storage_count(), 2);
    assert_eq!(root.extract_path(&[1, 2]), None);
    assert_eq!(root.get_or_insert_with(&[1, 2], encode).unwrap(), 12);
}

// ==============================================
// Limits and lifecycle callbacks
// ==============================================

#[test]
fn single_leaf_budget_reports_removal_first() {
    let (mut root, audit) = audited(TreeBuilder::new(2).total_leaves_limit(1));
    root.get_or_insert_with(&[1, 1], encode).unwrap();
    root.get_or_insert_with(&[2, 2], encode).unwrap();

    assert_eq!(audit.borrow().leaf_log, ["+11", "-11", "+22"]);
    assert_eq!(root.len(), 1);
    assert_eq!(root.extract_path(&[1, 1]), None);
    // root plus the one leaf storage still holding an entry
    assert_eq!(root.storage_count(), 2);
}

#[test]
fn leaves_per_storage_limit_is_local() {
    let (mut root, audit) = audited(
        TreeBuilder::new(2)
            .total_leaves_limit(Limit::Unbounded)
            .leaves_per_storage_limit(2),
    );
    for b in 1..=3 {
        root.get_or_insert_with(&[1, b], encode).unwrap();
        root.get_or_insert_with(&[2, b], encode).unwrap();
    }

    assert_eq!(root.len(), 4);
    assert_eq!(root.extract_path(&[1, 1]), None);
    assert_eq!(root.extract_path(&[2, 1]), None);
    assert_eq!(root.extract_path(&[1, 3]), Some(&13));
    assert_eq!(audit.borrow().live_leaves, 4);
}

#[test]
fn leaf_storage_limit_evicts_whole_storages() {
    let (mut root, audit) = audited(TreeBuilder::new(2).total_leaf_storages_limit(2));
    root.get_or_insert_with(&[1, 1], encode).unwrap();
    root.get_or_insert_with(&[1, 2], encode).unwrap();
    root.get_or_insert_with(&[2, 1], encode).unwrap();
    root.get_or_insert_with(&[3, 1], encode).unwrap();

    let audit = audit.borrow();
    assert_eq!(audit.live_leaf_storages, 2);
    // [1] goes with both of its entries, in table order, before +31.
    assert_eq!(audit.leaf_log[..3], ["+11", "+12", "+21"]);
    let mut dropped = audit.leaf_log[3..5].to_vec();
    dropped.sort();
    assert_eq!(dropped, ["-11", "-12"]);
    assert_eq!(audit.leaf_log[5], "+31");
    assert_eq!(root.len(), 2);
    assert_eq!(root.extract_path(&[1, 2]), None);
}

#[test]
fn storage_limit_orphans_are_collected() {
    let (mut root, audit) = audited(TreeBuilder::new(3).total_storages_limit(2));
    root.get_or_insert_with(&[1, 1, 1], encode).unwrap();
    root.get_or_insert_with(&[2, 1, 1], encode).unwrap();

    // [1] was evicted from the nested pool; its leaf storage is unreachable.
    // The root counts as nested.
    assert_eq!(audit.borrow().live_nested, 2);
    assert_eq!(root.extract_path(&[1, 1, 1]), None);
    assert_eq!(root.extract_path(&[2, 1, 1]), Some(&211));

    let mut recomputed = false;
    root.get_or_insert_with(&[1, 1, 1], |p| {
        recomputed = true;
        encode(p)
    })
    .unwrap();
    assert!(recomputed);
}

#[test]
fn deep_chain_survives_tight_storage_limit() {
    assert!(TreeBuilder::new(4)
        .total_storages_limit(2)
        .try_build::<u32, u32>()
        .is_err());

    let (mut root, audit) = audited(TreeBuilder::new(4).total_storages_limit(3));
    let mut calls = 0;
    for _ in 0..3 {
        let value = root
            .get_or_insert_with(&[1, 2, 3, 4], |p| {
                calls += 1;
                encode(p)
            })
            .unwrap();
        assert_eq!(value, 1234);
    }
    assert_eq!(calls, 1);
    assert_eq!(root.len(), 1);
    assert_eq!(root.extract_path(&[1, 2, 3, 4]), Some(&1234));
    // root, [1], [1,2], [1,2,3]
    assert_eq!(root.storage_count(), 4);
    assert_eq!(audit.borrow().live_nested, 3);
}

#[test]
fn lfu_storage_pool_keeps_fresh_parent() {
    let (mut root, audit) = audited(
        TreeBuilder::new(4)
            .strategies(Policy::Lru, Policy::Lfu)
            .total_storages_limit(3),
    );
    for _ in 0..2 {
        root.get_or_insert_with(&[1, 2, 3, 4], encode).unwrap();
    }

    let mut calls = 0;
    for _ in 0..3 {
        let value = root
            .get_or_insert_with(&[5, 6, 7, 8], |p| {
                calls += 1;
                encode(p)
            })
            .unwrap();
        assert_eq!(value, 5678);
    }
    assert_eq!(calls, 1);
    assert_eq!(root.extract_path(&[5, 6, 7, 8]), Some(&5678));
    assert_eq!(root.extract_path(&[1, 2, 3, 4]), None);
    assert!(audit.borrow().live_nested <= 3);
}

#[test]
fn leaf_hooks_name_the_owning_storage() {
    let (mut root, audit) = audited(TreeBuilder::new(2).total_leaves_limit(1));
    root.get_or_insert_with(&[1, 7], encode).unwrap();
    root.get_or_insert_with(&[2, 7], encode).unwrap();

    let audit = audit.borrow();
    assert_eq!(audit.leaf_log, ["+17", "-17", "+27"]);
    assert_eq!(audit.leaf_owners.len(), 2);
    assert_ne!(audit.leaf_owners[0], audit.leaf_owners[1]);
    assert!(audit.removed_storages.contains(&audit.leaf_owners[0]));
    assert!(audit.live_storages.contains(&audit.leaf_owners[1]));
}

#[test]
fn every_storage_is_removed_exactly_once() {
    let (mut root, audit) = audited(
        TreeBuilder::new(3)
            .total_leaves_limit(6)
            .total_storages_limit(4)
            .total_leaf_storages_limit(3),
    );
    for i in 0..200u32 {
        let path = [i % 5, (i / 5) % 3, i % 7];
        root.get_or_insert_with(&path, encode).unwrap();
    }

    let audit = audit.borrow();
    assert_eq!(audit.live_storages.len(), root.storage_count());
    assert_eq!(audit.live_leaves, root.len());
    assert!(root.len() <= 6);
    assert!(audit.live_nested <= 3 + 1);
    assert!(audit.live_storages.is_disjoint(&audit.removed_storages));
}

// ==============================================
// Explicit invalidation
// ==============================================

#[test]
fn remove_path_and_clear() {
    let (mut root, audit) = audited(TreeBuilder::new(3));
    for path in [[1, 1, 1], [1, 1, 2], [1, 2, 1], [2, 1, 1]] {
        root.get_or_insert_with(&path, encode).unwrap();
    }
    assert_eq!(root.storage_count(), 1 + 2 + 3);

    assert_eq!(root.remove_path(&[1, 1, 1]).unwrap(), Some(111));
    assert_eq!(root.remove_path(&[1, 1, 1]).unwrap(), None);
    assert_eq!(root.remove_path(&[9, 9, 9]).unwrap(), None);
    assert_eq!(root.storage_count(), 6);

    assert_eq!(root.remove_path(&[1, 1, 2]).unwrap(), Some(112));
    assert_eq!(root.storage_count(), 5);
    assert_eq!(root.len(), 2);

    root.clear().unwrap();
    assert!(root.is_empty());
    assert_eq!(root.storage_count(), 1);
    assert_eq!(audit.borrow().live_leaves, 0);
    assert_eq!(audit.borrow().live_storages.len(), 1);

    assert_eq!(root.get_or_insert_with(&[2, 1, 1], encode).unwrap(), 211);
}

#[test]
fn depth_one_root_rejoins_after_clear() {
    let mut root = TreeBuilder::new(1).total_leaves_limit(2).build::<u32, u32>();
    root.get_or_insert_with(&[1], encode).unwrap();
    root.clear().unwrap();
    for k in 2..6 {
        root.get_or_insert_with(&[k], encode).unwrap();
    }
    assert_eq!(root.len(), 2);
    assert_eq!(root.storage_count(), 1);
    assert_eq!(root.extract_path(&[5]), Some(&5));
}

// ==============================================
// Key adapters
// ==============================================

#[test]
fn float_keys_compare_by_canonical_value() {
    let mut root = TreeBuilder::new(2).build::<FloatKey, f64>();
    let mul = |p: &[FloatKey]| p[0].get() * p[1].get();

    let a = [FloatKey::from(0.0), FloatKey::from(f64::NAN)];
    let b = [FloatKey::from(-0.0), FloatKey::from(f64::NAN)];
    assert!(root.get_or_insert_with(&a, mul).unwrap().is_nan());

    let mut recomputed = false;
    root.get_or_insert_with(&b, |p| {
        recomputed = true;
        mul(p)
    })
    .unwrap();
    assert!(!recomputed);
    assert_eq!(root.len(), 1);
}

#[test]
fn identity_keys_compare_by_pointer() {
    let mut root = TreeBuilder::new(1).build::<IdentityKey<str>, usize>();
    let first: Rc<str> = Rc::from("config");
    let twin: Rc<str> = Rc::from("config");

    let len = |p: &[IdentityKey<str>]| p[0].get().len();
    root.get_or_insert_with(&[IdentityKey::new(first.clone())], len)
        .unwrap();
    root.get_or_insert_with(&[IdentityKey::new(twin)], len).unwrap();

    assert_eq!(root.len(), 2);
    assert_eq!(root.extract_path(&[IdentityKey::new(first)]), Some(&6));
}

// ==============================================
// Property tests
// ==============================================

fn policies() -> impl proptest::strategy::Strategy<Value = Policy> {
    prop_oneof![Just(Policy::Lru), Just(Policy::Lfu), Just(Policy::Fifo)]
}

proptest! {
    /// Property: every answer equals the function, and every limit holds.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_bounded_tree_is_a_faithful_memo(
        depth in 3usize..=4,
        paths in prop::collection::vec(prop::collection::vec(0u32..4, 4), 1..150),
        total_leaves in 1usize..8,
        extra_storages in 0usize..4,
        leaf_storages in 1usize..5,
        leaf_policy in policies(),
        storage_policy in policies(),
        check_last in any::<bool>(),
    ) {
        let total_storages = depth - 1 + extra_storages;
        let (mut root, audit) = audited(
            TreeBuilder::new(depth)
                .strategies(leaf_policy, storage_policy)
                .total_leaves_limit(total_leaves)
                .total_storages_limit(total_storages)
                .total_leaf_storages_limit(leaf_storages)
                .check_last(check_last),
        );

        for path in &paths {
            let path = &path[..depth];
            prop_assert_eq!(root.get_or_insert_with(path, encode).unwrap(), encode(path));
            prop_assert_eq!(root.extract_path(path), Some(&encode(path)));

            let audit = audit.borrow();
            prop_assert!(root.len() <= total_leaves);
            prop_assert_eq!(audit.live_leaves, root.len());
            prop_assert!(audit.live_nested <= total_storages);
            prop_assert!(audit.live_leaf_storages <= leaf_storages);
            prop_assert_eq!(audit.live_storages.len(), root.storage_count());
        }
    }
}
