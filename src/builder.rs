//! Storage tree builder.
//!
//! Collects the tree shape, the strategies and the limits, validates them
//! once, and produces a [`Root`].
//!
//! | Setting                     | Default       |
//! |-----------------------------|---------------|
//! | `policy` / `strategies`     | LRU / LRU     |
//! | `total_leaves_limit`        | 10 000        |
//! | `total_storages_limit`      | unbounded     |
//! | `total_leaf_storages_limit` | unbounded     |
//! | `leaves_per_storage_limit`  | unbounded     |
//! | `check_last`                | on            |
//!
//! ## Example
//!
//! ```rust
//! use memokit::builder::{Limit, TreeBuilder};
//! use memokit::policy::Policy;
//!
//! let mut root = TreeBuilder::new(2)
//!     .strategies(Policy::Lfu, Policy::Lru)
//!     .total_leaves_limit(Limit::Unbounded)
//!     .leaves_per_storage_limit(64)
//!     .build::<u64, String>();
//!
//! let value = root.get_or_insert_with(&[1, 2], |p| format!("{}+{}", p[0], p[1])).unwrap();
//! assert_eq!(value, "1+2");
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::observer::{NoopObserver, Observer};
use crate::policy::Policy;
use crate::store::context::ContextConfig;
use crate::store::Root;
use crate::traits::Capacity;

/// Default bound on cached values across the whole tree.
pub const DEFAULT_TOTAL_LEAVES: usize = 10_000;

/// A configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    Max(usize),
    Unbounded,
}

impl From<usize> for Limit {
    fn from(value: usize) -> Self {
        Limit::Max(value)
    }
}

impl Limit {
    fn to_capacity(self, name: &str) -> Result<Capacity, ConfigError> {
        match self {
            Limit::Unbounded => Ok(Capacity::Unbounded),
            Limit::Max(n) => Capacity::try_new(n)
                .map_err(|_| ConfigError::new(format!("{name} must be at least 1, got {n}"))),
        }
    }
}

/// Builder for [`Root`].
#[derive(Debug, Clone)]
pub struct TreeBuilder<O = NoopObserver> {
    depth: usize,
    leaf_policy: Policy,
    storage_policy: Policy,
    total_leaves: Limit,
    total_storages: Limit,
    total_leaf_storages: Limit,
    leaves_per_storage: Limit,
    check_last: bool,
    observer: O,
}

impl TreeBuilder {
    /// Starts a builder for paths of `depth` keys.
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            leaf_policy: Policy::Lru,
            storage_policy: Policy::Lru,
            total_leaves: Limit::Max(DEFAULT_TOTAL_LEAVES),
            total_storages: Limit::Unbounded,
            total_leaf_storages: Limit::Unbounded,
            leaves_per_storage: Limit::Unbounded,
            check_last: true,
            observer: NoopObserver,
        }
    }
}

impl<O> TreeBuilder<O> {
    /// Uses `policy` for leaves and storages alike.
    pub fn policy(self, policy: Policy) -> Self {
        self.strategies(policy, policy)
    }

    /// Policy for cached values and leaf storages, and policy for nested storages.
    pub fn strategies(mut self, leaf: Policy, storage: Policy) -> Self {
        self.leaf_policy = leaf;
        self.storage_policy = storage;
        self
    }

    /// Bound on cached values across the tree.
    pub fn total_leaves_limit(mut self, limit: impl Into<Limit>) -> Self {
        self.total_leaves = limit.into();
        self
    }

    /// Bound on nested (non-leaf) storages, root included. Leaf storages are
    /// bounded by [`total_leaf_storages_limit`](Self::total_leaf_storages_limit).
    pub fn total_storages_limit(mut self, limit: impl Into<Limit>) -> Self {
        self.total_storages = limit.into();
        self
    }

    /// Bound on leaf storages.
    pub fn total_leaf_storages_limit(mut self, limit: impl Into<Limit>) -> Self {
        self.total_leaf_storages = limit.into();
        self
    }

    /// Bound on cached values inside any one leaf storage.
    pub fn leaves_per_storage_limit(mut self, limit: impl Into<Limit>) -> Self {
        self.leaves_per_storage = limit.into();
        self
    }

    /// Whether to remember the last resolved path.
    pub fn check_last(mut self, enabled: bool) -> Self {
        self.check_last = enabled;
        self
    }

    pub fn observer<O2>(self, observer: O2) -> TreeBuilder<O2> {
        TreeBuilder {
            depth: self.depth,
            leaf_policy: self.leaf_policy,
            storage_policy: self.storage_policy,
            total_leaves: self.total_leaves,
            total_storages: self.total_storages,
            total_leaf_storages: self.total_leaf_storages,
            leaves_per_storage: self.leaves_per_storage,
            check_last: self.check_last,
            observer,
        }
    }

    /// Validates the configuration and builds the tree.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the depth is zero, a bounded limit is zero, or the
    /// storage limit is below `depth - 1`, too small to hold one full chain
    /// of nested storages.
    pub fn try_build<K, V>(self) -> Result<Root<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        O: Observer<K, V> + 'static,
    {
        if self.depth == 0 {
            return Err(ConfigError::new("depth must be at least 1"));
        }
        let config = ContextConfig {
            depth: self.depth,
            leaf_policy: self.leaf_policy,
            storage_policy: self.storage_policy,
            total_leaves: self.total_leaves.to_capacity("total_leaves_limit")?,
            total_storages: self.total_storages.to_capacity("total_storages_limit")?,
            total_leaf_storages: self
                .total_leaf_storages
                .to_capacity("total_leaf_storages_limit")?,
            leaves_per_storage: self
                .leaves_per_storage
                .to_capacity("leaves_per_storage_limit")?,
        };
        // The root plus one pooled storage per intermediate level.
        let chain_storages = self.depth - 1;
        if config
            .total_storages
            .get()
            .is_some_and(|n| n < chain_storages)
        {
            return Err(ConfigError::new(format!(
                "total_storages_limit must be at least {chain_storages} for depth {}",
                self.depth
            )));
        }
        Ok(Root::new(config, self.check_last, Box::new(self.observer)))
    }

    /// Like [`try_build`](Self::try_build), panicking on an invalid
    /// configuration.
    pub fn build<K, V>(self) -> Root<K, V>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        O: Observer<K, V> + 'static,
    {
        match self.try_build() {
            Ok(root) => root,
            Err(err) => panic!("{}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::StorageInfo;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn defaults() {
        let builder = TreeBuilder::new(3);
        assert_eq!(builder.total_leaves, Limit::Max(DEFAULT_TOTAL_LEAVES));
        assert_eq!(builder.total_storages, Limit::Unbounded);
        assert_eq!(builder.leaves_per_storage, Limit::Unbounded);
        assert!(builder.check_last);

        let root = builder.build::<u8, u8>();
        assert_eq!(root.depth(), 3);
        assert_eq!(root.storage_count(), 1);
        assert!(root.is_empty());
    }

    #[test]
    fn rejects_zero_depth_and_zero_limits() {
        let err = TreeBuilder::new(0).try_build::<u8, u8>().unwrap_err();
        assert!(err.message().contains("depth"));

        let err = TreeBuilder::new(1)
            .total_leaves_limit(0)
            .try_build::<u8, u8>()
            .unwrap_err();
        assert!(err.message().contains("total_leaves_limit"));

        let err = TreeBuilder::new(2)
            .leaves_per_storage_limit(0)
            .try_build::<u8, u8>()
            .unwrap_err();
        assert!(err.message().contains("leaves_per_storage_limit"));
    }

    #[test]
    fn deep_trees_need_room_for_intermediate_storages() {
        assert!(TreeBuilder::new(3)
            .total_storages_limit(1)
            .try_build::<u8, u8>()
            .is_err());
        assert!(TreeBuilder::new(2)
            .total_storages_limit(1)
            .try_build::<u8, u8>()
            .is_ok());
        assert!(TreeBuilder::new(3)
            .total_storages_limit(2)
            .try_build::<u8, u8>()
            .is_ok());

        let err = TreeBuilder::new(4)
            .total_storages_limit(2)
            .try_build::<u8, u8>()
            .unwrap_err();
        assert!(err.message().contains("at least 3"));
        assert!(TreeBuilder::new(4)
            .total_storages_limit(3)
            .try_build::<u8, u8>()
            .is_ok());
    }

    #[test]
    #[should_panic(expected = "depth")]
    fn build_panics_on_invalid_config() {
        let _ = TreeBuilder::new(0).build::<u8, u8>();
    }

    #[test]
    fn observer_sees_root_creation() {
        struct CountStorages(Rc<Cell<usize>>);

        impl Observer<u8, u8> for CountStorages {
            fn on_create_storage(&mut self, _: StorageInfo) {
                self.0.set(self.0.get() + 1);
            }
        }

        let created = Rc::new(Cell::new(0));
        let _root = TreeBuilder::new(2)
            .policy(Policy::Fifo)
            .observer(CountStorages(created.clone()))
            .build::<u8, u8>();
        assert_eq!(created.get(), 1);
    }
}
