//! Lifecycle hooks.
//!
//! An [`Observer`] hears about every storage and every cached entry the tree
//! creates or drops. These are the only externally visible eviction signals.
//! Each logical creation and removal is reported exactly once, and when one
//! call both evicts and inserts, the removals are reported first. Entry
//! hooks also receive the leaf storage holding the entry, since the last key
//! alone does not identify a path.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use memokit::builder::TreeBuilder;
//! use memokit::observer::{Observer, StorageInfo};
//!
//! #[derive(Default)]
//! struct Log(Rc<RefCell<Vec<String>>>);
//!
//! impl Observer<u32, u32> for Log {
//!     fn on_create_leaf(&mut self, _: StorageInfo, key: &u32, _: &u32) {
//!         self.0.borrow_mut().push(format!("+{key}"));
//!     }
//!     fn on_remove_leaf(&mut self, _: StorageInfo, key: &u32, _: &u32) {
//!         self.0.borrow_mut().push(format!("-{key}"));
//!     }
//! }
//!
//! let events = Rc::new(RefCell::new(Vec::new()));
//! let mut root = TreeBuilder::new(1)
//!     .total_leaves_limit(1)
//!     .observer(Log(events.clone()))
//!     .build::<u32, u32>();
//!
//! root.get_or_insert_with(&[1], |_| 10).unwrap();
//! root.get_or_insert_with(&[2], |_| 20).unwrap();
//! assert_eq!(*events.borrow(), ["+1", "-1", "+2"]);
//! ```

use crate::store::StorageId;

/// What a storage holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Maps one argument to the next level's storage.
    Nested,
    /// Maps the last argument to a cached value.
    Leaf,
}

/// Identity and position of a storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageInfo {
    pub id: StorageId,
    /// Argument position the storage is keyed by; the root is at 0.
    pub depth: usize,
    pub kind: StorageKind,
}

/// Receives creation and removal events. Every method defaults to a no-op.
pub trait Observer<K, V> {
    fn on_create_storage(&mut self, _info: StorageInfo) {}

    fn on_remove_storage(&mut self, _info: StorageInfo) {}

    /// `storage` is the leaf storage the entry was cached in.
    fn on_create_leaf(&mut self, _storage: StorageInfo, _key: &K, _value: &V) {}

    fn on_remove_leaf(&mut self, _storage: StorageInfo, _key: &K, _value: &V) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<K, V> Observer<K, V> for NoopObserver {}
