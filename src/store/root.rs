//! Entry point of a storage tree.
//!
//! A [`Root`] memoizes a function of `depth` arguments. Each argument selects
//! one level of the tree; the last one selects the cached value inside a leaf
//! storage.
//!
//! ## Lookup
//!
//! ```text
//!   path = [a, b, c]             depth = 3
//!
//!   root ──a──► S1 ──b──► L ──c──► value
//!   chain = [root, S1, L]
//! ```
//!
//! The root remembers the last resolved path and its chain of storages. A
//! repeated call with the same path is answered from that record once every
//! storage on the chain is confirmed alive. A call that shares a prefix with
//! it resumes the walk from the deepest shared storage.
//!
//! ## Miss
//!
//! The computation runs before anything in the tree changes, so a failing or
//! panicking computation leaves no trace. Missing storages are then created
//! top-down and the value is stored in the leaf storage, evicting at most one
//! existing entry.
//!
//! ## Example Usage
//! ```
//! use memokit::builder::TreeBuilder;
//!
//! let mut root = TreeBuilder::new(2).build::<&str, String>();
//! let mut calls = 0;
//! let mut join = |path: &[&str]| {
//!     calls += 1;
//!     path.join("/")
//! };
//!
//! assert_eq!(root.get_or_insert_with(&["a", "b"], &mut join).unwrap(), "a/b");
//! assert_eq!(root.get_or_insert_with(&["a", "b"], &mut join).unwrap(), "a/b");
//! assert_eq!(calls, 1);
//! assert_eq!(root.extract_path(&["a", "b"]).map(String::as_str), Some("a/b"));
//! assert_eq!(root.extract_path(&["a", "c"]), None);
//! ```

use std::fmt;
use std::hash::Hash;

use tracing::trace;

use crate::error::MemoError;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
#[cfg(feature = "metrics")]
use crate::metrics::TreeMetricsSnapshot;
use crate::observer::{Observer, StorageKind};
use crate::store::context::{ContextConfig, StorageContext};
use crate::store::node::StorageId;

/// Last resolved path. `chain[i]` is the storage keyed by `path[i]`.
struct LastPath<K, V> {
    path: Vec<K>,
    chain: Vec<StorageId>,
    value: V,
}

/// A bounded memoization tree over paths of `depth` keys.
///
/// Built with [`TreeBuilder`](crate::builder::TreeBuilder).
pub struct Root<K, V> {
    context: StorageContext<K, V>,
    depth: usize,
    check_last: bool,
    last: Option<LastPath<K, V>>,
}

impl<K, V> Root<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub(crate) fn new(
        config: ContextConfig,
        check_last: bool,
        observer: Box<dyn Observer<K, V>>,
    ) -> Self {
        Self {
            depth: config.depth,
            context: StorageContext::new(config, observer),
            check_last,
            last: None,
        }
    }

    /// Number of arguments in every path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.context.leaves()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live storages, root included.
    pub fn storage_count(&self) -> usize {
        self.context.storage_count()
    }

    /// Returns the value cached for `path`, computing and caching it on a miss.
    ///
    /// # Errors
    ///
    /// [`MemoError::PathLength`] if `path` does not have exactly
    /// [`depth`](Self::depth) keys.
    pub fn get_or_insert_with<F>(&mut self, path: &[K], calculate: F) -> Result<V, MemoError>
    where
        F: FnOnce(&[K]) -> V,
    {
        self.try_get_or_insert_with(path, |keys| Ok::<V, MemoError>(calculate(keys)))
    }

    /// Fallible form of [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// An error from `calculate` is returned as is and nothing is cached.
    ///
    /// ```
    /// use memokit::builder::TreeBuilder;
    /// use memokit::error::MemoError;
    ///
    /// #[derive(Debug)]
    /// enum AppError {
    ///     Tree(MemoError),
    ///     Parse,
    /// }
    ///
    /// impl From<MemoError> for AppError {
    ///     fn from(err: MemoError) -> Self {
    ///         AppError::Tree(err)
    ///     }
    /// }
    ///
    /// let mut root = TreeBuilder::new(1).build::<&str, u32>();
    /// let parse = |path: &[&str]| path[0].parse::<u32>().map_err(|_| AppError::Parse);
    ///
    /// assert!(matches!(root.try_get_or_insert_with(&["x"], parse), Err(AppError::Parse)));
    /// assert!(root.is_empty());
    /// assert_eq!(root.try_get_or_insert_with(&["7"], parse).unwrap(), 7);
    /// ```
    pub fn try_get_or_insert_with<F, E>(&mut self, path: &[K], calculate: F) -> Result<V, E>
    where
        F: FnOnce(&[K]) -> Result<V, E>,
        E: From<MemoError>,
    {
        self.check_path(path)?;
        #[cfg(feature = "metrics")]
        self.context.record_lookup();

        if let Some(value) = self.fast_path(path)? {
            return Ok(value);
        }

        let last_key = &path[self.depth - 1];
        let mut chain = self.resume_chain(path);
        while chain.len() < self.depth {
            let level = chain.len() - 1;
            match self.context.child(chain[level], &path[level]) {
                Some(child) => chain.push(child),
                None => break,
            }
        }

        if chain.len() == self.depth {
            let leaf = chain[self.depth - 1];
            if let Some(value) = self.context.leaf_value(leaf, last_key).cloned() {
                self.touch_chain(&chain, last_key)?;
                #[cfg(feature = "metrics")]
                self.context.record_hit(false);
                self.remember(path, chain, value.clone());
                return Ok(value);
            }
        }

        #[cfg(feature = "metrics")]
        self.context.record_miss();
        self.last = None;
        let value = calculate(path)?;

        for &id in &chain {
            self.context.touch_storage(id)?;
        }
        while chain.len() < self.depth {
            let level = chain.len();
            let kind = if level == self.depth - 1 {
                StorageKind::Leaf
            } else {
                StorageKind::Nested
            };
            let child = self
                .context
                .create_child(&chain, path[level - 1].clone(), level, kind)?;
            chain.push(child);
        }
        let leaf = chain[self.depth - 1];
        self.context
            .insert_leaf(leaf, last_key.clone(), value.clone())?;
        self.remember(path, chain, value.clone());
        Ok(value)
    }

    /// Returns the cached value for `path` without recording an access.
    ///
    /// A path of the wrong length is never cached and yields `None`.
    pub fn extract_path(&self, path: &[K]) -> Option<&V> {
        let found = if path.len() == self.depth {
            self.resolve_leaf(path)
                .and_then(|leaf| self.context.leaf_value(leaf, &path[self.depth - 1]))
        } else {
            None
        };
        #[cfg(feature = "metrics")]
        self.context.record_probe(found.is_some());
        found
    }

    /// Drops the value cached for `path`, returning it.
    ///
    /// A leaf storage left empty is destroyed along with its entry in the
    /// parent storage.
    pub fn remove_path(&mut self, path: &[K]) -> Result<Option<V>, MemoError> {
        self.check_path(path)?;
        self.last = None;
        match self.resolve_leaf(path) {
            Some(leaf) => self.context.remove_entry(leaf, &path[self.depth - 1]),
            None => Ok(None),
        }
    }

    /// Drops every cached value and every storage but the root.
    pub fn clear(&mut self) -> Result<(), MemoError> {
        self.last = None;
        self.context.clear()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> TreeMetricsSnapshot {
        self.context.metrics_snapshot()
    }

    /// Walks the tables from the root to the leaf storage for `path`.
    fn resolve_leaf(&self, path: &[K]) -> Option<StorageId> {
        path[..self.depth - 1]
            .iter()
            .try_fold(self.context.root(), |current, key| self.context.child(current, key))
    }

    fn check_path(&self, path: &[K]) -> Result<(), MemoError> {
        if path.len() == self.depth {
            Ok(())
        } else {
            Err(MemoError::PathLength {
                expected: self.depth,
                actual: path.len(),
            })
        }
    }

    /// Answers an exact repeat of the last resolved path.
    fn fast_path(&mut self, path: &[K]) -> Result<Option<V>, MemoError> {
        if !self.check_last {
            return Ok(None);
        }
        let Some(last) = self.last.take() else {
            return Ok(None);
        };
        if last.path.as_slice() != path {
            self.last = Some(last);
            return Ok(None);
        }
        if !last.chain.iter().all(|id| self.context.contains(*id)) {
            return Ok(None);
        }

        self.touch_chain(&last.chain, &path[self.depth - 1])?;
        #[cfg(feature = "metrics")]
        self.context.record_hit(true);
        trace!(depth = self.depth, "last path hit");
        let value = last.value.clone();
        self.last = Some(last);
        Ok(Some(value))
    }

    /// Storages to resume the walk from: the live prefix shared with the last
    /// path, or just the root.
    fn resume_chain(&self, path: &[K]) -> Vec<StorageId> {
        let root = self.context.root();
        let Some(last) = self.last.as_ref().filter(|_| self.check_last) else {
            return vec![root];
        };
        let shared = last
            .path
            .iter()
            .zip(path)
            .take_while(|(a, b)| a == b)
            .count()
            .min(self.depth - 1);
        let prefix = &last.chain[..=shared];
        if prefix.iter().all(|id| self.context.contains(*id)) {
            prefix.to_vec()
        } else {
            vec![root]
        }
    }

    fn touch_chain(&mut self, chain: &[StorageId], key: &K) -> Result<(), MemoError> {
        for &id in chain {
            self.context.touch_storage(id)?;
        }
        self.context.touch_entry(chain[self.depth - 1], key)
    }

    fn remember(&mut self, path: &[K], chain: Vec<StorageId>, value: V) {
        if !self.check_last {
            return;
        }
        let alive = chain.iter().all(|id| self.context.contains(*id))
            && self
                .context
                .leaf_value(chain[self.depth - 1], &path[self.depth - 1])
                .is_some();
        self.last = alive.then(|| LastPath {
            path: path.to_vec(),
            chain,
            value,
        });
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<TreeMetricsSnapshot> for Root<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    fn snapshot(&self) -> TreeMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for Root<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nested, leaf_storages) = self.context.pool_sizes();
        f.debug_struct("Root")
            .field("depth", &self.depth)
            .field("leaves", &self.context.leaves())
            .field("storages", &self.context.storage_count())
            .field("nested_pool", &nested)
            .field("leaf_pool", &leaf_storages)
            .field("check_last", &self.check_last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::TreeBuilder;
    use crate::error::MemoError;
    use crate::policy::Policy;

    #[test]
    fn wrong_path_length_is_rejected() {
        let mut root = TreeBuilder::new(2).build::<u32, u32>();
        let err = root.get_or_insert_with(&[1], |_| 0).unwrap_err();
        assert!(matches!(
            err,
            MemoError::PathLength {
                expected: 2,
                actual: 1
            }
        ));
        assert!(root.remove_path(&[1, 2, 3]).is_err());
        assert_eq!(root.extract_path(&[1]), None);
    }

    #[test]
    fn resumes_from_shared_prefix() {
        let mut root = TreeBuilder::new(3).build::<u32, u32>();
        root.get_or_insert_with(&[1, 2, 3], |_| 123).unwrap();
        root.get_or_insert_with(&[1, 2, 4], |_| 124).unwrap();
        root.get_or_insert_with(&[1, 5, 3], |_| 153).unwrap();

        assert_eq!(root.len(), 3);
        // root, [1], [1,2], [1,5]
        assert_eq!(root.storage_count(), 4);
        assert_eq!(root.extract_path(&[1, 2, 3]), Some(&123));
        assert_eq!(root.extract_path(&[1, 2, 4]), Some(&124));
        assert_eq!(root.extract_path(&[1, 5, 3]), Some(&153));
    }

    #[test]
    fn hits_without_last_path_record() {
        let mut root = TreeBuilder::new(2).check_last(false).build::<u32, u32>();
        let mut calls = 0;
        for _ in 0..3 {
            root.get_or_insert_with(&[1, 1], |_| {
                calls += 1;
                11
            })
            .unwrap();
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn last_path_is_dropped_when_its_storage_goes() {
        let mut root = TreeBuilder::new(2)
            .total_leaf_storages_limit(1)
            .build::<u32, u32>();
        root.get_or_insert_with(&[1, 1], |_| 11).unwrap();
        root.get_or_insert_with(&[2, 2], |_| 22).unwrap();

        let mut recomputed = false;
        let value = root
            .get_or_insert_with(&[1, 1], |_| {
                recomputed = true;
                111
            })
            .unwrap();
        assert!(recomputed);
        assert_eq!(value, 111);
    }

    #[test]
    fn remove_path_drops_emptied_leaf_storage() {
        let mut root = TreeBuilder::new(2).build::<u32, u32>();
        root.get_or_insert_with(&[1, 1], |_| 11).unwrap();
        assert_eq!(root.storage_count(), 2);

        assert_eq!(root.remove_path(&[1, 1]).unwrap(), Some(11));
        assert_eq!(root.remove_path(&[1, 1]).unwrap(), None);
        assert_eq!(root.storage_count(), 1);
        assert!(root.is_empty());
    }

    #[test]
    fn lfu_leaves_keep_hot_entries() {
        let mut root = TreeBuilder::new(1)
            .policy(Policy::Lfu)
            .total_leaves_limit(2)
            .build::<u32, u32>();
        root.get_or_insert_with(&[1], |_| 1).unwrap();
        root.get_or_insert_with(&[2], |_| 2).unwrap();
        root.get_or_insert_with(&[1], |_| 0).unwrap();
        root.get_or_insert_with(&[3], |_| 3).unwrap();

        assert_eq!(root.extract_path(&[1]), Some(&1));
        assert_eq!(root.extract_path(&[2]), None);
        assert_eq!(root.extract_path(&[3]), Some(&3));
    }

    #[test]
    fn debug_reports_sizes() {
        let mut root = TreeBuilder::new(2).build::<u32, u32>();
        root.get_or_insert_with(&[1, 2], |_| 3).unwrap();
        let rendered = format!("{root:?}");
        assert!(rendered.contains("leaves: 1"));
        assert!(rendered.contains("storages: 2"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_lookups_and_lifecycle() {
        let mut root = TreeBuilder::new(2).total_leaves_limit(1).build::<u32, u32>();
        root.get_or_insert_with(&[1, 1], |_| 11).unwrap();
        root.get_or_insert_with(&[1, 1], |_| 11).unwrap();
        root.get_or_insert_with(&[2, 2], |_| 22).unwrap();
        root.get_or_insert_with(&[2, 2], |_| 22).unwrap();
        assert_eq!(root.extract_path(&[2, 2]), Some(&22));
        assert_eq!(root.extract_path(&[1, 1]), None);

        let snapshot = root.metrics_snapshot();
        assert_eq!(snapshot.lookups, 4);
        assert_eq!(snapshot.misses, 2);
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.fast_path_hits, 2);
        assert_eq!(snapshot.leaves_created, 2);
        assert_eq!(snapshot.leaves_evicted, 1);
        assert_eq!(snapshot.storages_created, 3);
        assert_eq!(snapshot.storages_destroyed, 1);
        assert_eq!((snapshot.probes, snapshot.probe_hits), (2, 1));
        assert_eq!((snapshot.leaves, snapshot.storages), (1, 2));
        assert_eq!(snapshot.hit_rate(), 0.5);
    }
}
