//! Shared state of one storage tree.
//!
//! [`StorageContext`] owns every storage node and the two global pools that
//! bound them:
//!
//! ```text
//!   nodes: SlotArena<StorageNode>          every storage, root included
//!   storage_pool: Destroyable<Strategy>    nested storages except the root,
//!                                          capacity total_storages - 1
//!   leaf_pool: RootLeafStrategy            leaf storages (total_leaf_storages)
//!                                          and the entry budget (total_leaves)
//! ```
//!
//! ## Destroy cascade
//!
//! A pool that drops a storage only queues its id. [`StorageContext::settle`]
//! then destroys each queued storage: every [`ParentPath`] is notified once
//! (the parent table forgets the entry, the pool forgets the id), the slot is
//! freed, and the observer hears about the storage and any entries it still
//! held. Children of a destroyed nested storage are left alone; they become
//! unreachable and leave when their own pool evicts them.

use std::hash::Hash;

use tracing::{debug, trace};

use crate::ds::SlotArena;
use crate::error::{InvariantError, MemoError};
#[cfg(feature = "metrics")]
use crate::metrics::traits::{TreeMetricsReadRecorder, TreeMetricsRecorder};
#[cfg(feature = "metrics")]
use crate::metrics::{TreeMetrics, TreeMetricsSnapshot};
use crate::observer::{Observer, StorageInfo, StorageKind};
use crate::policy::{Destroyable, Policy, Strategy};
use crate::store::leaf::LeafStorage;
use crate::store::node::{NodeKind, ParentPath, StorageId, StorageNode};
use crate::store::root_leaf::RootLeafStrategy;
use crate::store::table::Table;
use crate::traits::{CacheStrategy, Capacity};

/// Validated tree shape and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContextConfig {
    pub depth: usize,
    pub leaf_policy: Policy,
    pub storage_policy: Policy,
    pub total_leaves: Capacity,
    pub total_storages: Capacity,
    pub total_leaf_storages: Capacity,
    pub leaves_per_storage: Capacity,
}

pub(crate) struct StorageContext<K, V> {
    nodes: SlotArena<StorageNode<K, V>>,
    storage_pool: Destroyable<Strategy<StorageId>, StorageId>,
    leaf_pool: RootLeafStrategy,
    leaf_policy: Policy,
    leaves_per_storage: Capacity,
    track_entries: bool,
    root: StorageId,
    observer: Box<dyn Observer<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: TreeMetrics,
}

impl<K, V> StorageContext<K, V>
where
    K: Clone + Eq + Hash,
{
    pub(crate) fn new(config: ContextConfig, observer: Box<dyn Observer<K, V>>) -> Self {
        // The root never occupies a slot of the nested pool.
        let storage_pool = match config
            .total_storages
            .get()
            .and_then(|n| Capacity::try_new(n - 1).ok())
        {
            Some(capacity) => Strategy::new(config.storage_policy, capacity),
            None => Strategy::noop(),
        };

        let budgeted = !config.total_leaves.is_unbounded();
        let leaf_storages = if budgeted || !config.total_leaf_storages.is_unbounded() {
            Strategy::new(config.leaf_policy, config.total_leaf_storages)
        } else {
            Strategy::noop()
        };
        let track_entries = budgeted || !config.leaves_per_storage.is_unbounded();

        let root_kind = if config.depth == 1 {
            NodeKind::Leaf(LeafStorage::new(leaf_strategy(
                config.leaf_policy,
                config.leaves_per_storage,
                track_entries,
            )))
        } else {
            NodeKind::Nested(Table::new())
        };
        let mut nodes = SlotArena::new();
        let root = nodes.insert(StorageNode::new(root_kind, 0, Vec::new()));

        let mut context = Self {
            nodes,
            storage_pool: Destroyable::new(storage_pool),
            leaf_pool: RootLeafStrategy::new(leaf_storages, config.total_leaves),
            leaf_policy: config.leaf_policy,
            leaves_per_storage: config.leaves_per_storage,
            track_entries,
            root,
            observer,
            #[cfg(feature = "metrics")]
            metrics: TreeMetrics::new(),
        };
        context.report_created(root);
        debug!(
            depth = config.depth,
            leaf_policy = ?config.leaf_policy,
            storage_policy = ?config.storage_policy,
            total_leaves = ?config.total_leaves.get(),
            total_storages = ?config.total_storages.get(),
            total_leaf_storages = ?config.total_leaf_storages.get(),
            leaves_per_storage = ?config.leaves_per_storage.get(),
            "storage tree created"
        );
        context
    }

    pub(crate) fn root(&self) -> StorageId {
        self.root
    }

    pub(crate) fn contains(&self, id: StorageId) -> bool {
        self.nodes.contains(id)
    }

    /// Number of live storages, root included.
    pub(crate) fn storage_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of cached entries.
    pub(crate) fn leaves(&self) -> usize {
        self.leaf_pool.leaves()
    }

    /// Sizes of the nested pool and the leaf-storage pool.
    pub(crate) fn pool_sizes(&self) -> (usize, usize) {
        (self.storage_pool.len(), self.leaf_pool.storage_count())
    }

    /// Live child of nested storage `parent` under `key`.
    pub(crate) fn child(&self, parent: StorageId, key: &K) -> Option<StorageId> {
        self.nodes
            .get(parent)?
            .nested()?
            .get(key)
            .copied()
            .filter(|id| self.nodes.contains(*id))
    }

    pub(crate) fn leaf_value(&self, leaf: StorageId, key: &K) -> Option<&V> {
        self.nodes.get(leaf)?.leaf()?.get(key)
    }

    /// Records an access to a storage in whichever pool tracks it.
    pub(crate) fn touch_storage(&mut self, id: StorageId) -> Result<(), MemoError> {
        let Some(node) = self.nodes.get(id) else {
            return Ok(());
        };
        match node.kind() {
            StorageKind::Nested if id == self.root => return Ok(()),
            StorageKind::Nested => {
                if self.storage_pool.has(&id) {
                    self.storage_pool.read(&id)?;
                } else {
                    self.storage_pool.write(id)?;
                }
            },
            StorageKind::Leaf => self.leaf_pool.touch_storage(id)?,
        }
        self.settle()
    }

    /// Records an access to a cached entry.
    pub(crate) fn touch_entry(&mut self, leaf: StorageId, key: &K) -> Result<(), MemoError> {
        self.leaf_mut(leaf)?.touch(key)
    }

    /// Creates a storage under the last storage of `chain` and tracks it in
    /// its pool.
    ///
    /// `chain` is the path of storages from the root being extended. None of
    /// them is evicted to make room for the new storage.
    pub(crate) fn create_child(
        &mut self,
        chain: &[StorageId],
        key: K,
        depth: usize,
        kind: StorageKind,
    ) -> Result<StorageId, MemoError> {
        let parent = *chain
            .last()
            .ok_or_else(|| InvariantError::new("storage chain has no root"))?;
        let (node_kind, pool) = match kind {
            StorageKind::Nested => (NodeKind::Nested(Table::new()), ParentPath::StoragePool),
            StorageKind::Leaf => (
                NodeKind::Leaf(LeafStorage::new(leaf_strategy(
                    self.leaf_policy,
                    self.leaves_per_storage,
                    self.track_entries,
                ))),
                ParentPath::LeafPool,
            ),
        };
        let parents = vec![
            ParentPath::Table {
                parent,
                key: key.clone(),
            },
            pool,
        ];
        let id = self.nodes.insert(StorageNode::new(node_kind, depth, parents));
        if let Some(table) = self.nodes.get_mut(parent).and_then(StorageNode::nested_mut) {
            table.insert(key, id);
        }

        match kind {
            StorageKind::Nested => self.track_nested(id, chain)?,
            StorageKind::Leaf => self.leaf_pool.touch_storage(id)?,
        }
        self.settle()?;
        self.report_created(id);
        Ok(id)
    }

    /// Stores a new entry in `leaf`, evicting at most one existing entry.
    ///
    /// The storage's own limit is enforced first; if it has room, the global
    /// entry budget is. Removals are reported before the new entry.
    pub(crate) fn insert_leaf(&mut self, leaf: StorageId, key: K, value: V) -> Result<(), MemoError> {
        self.leaf_pool.touch_storage(leaf)?;
        self.settle()?;

        let storage = self.leaf_mut(leaf)?;
        if storage.will_be_full() {
            let evicted = storage.reserve()?;
            self.leaf_pool.forget_leaves(evicted.len());
            let info = self.storage_info(leaf)?;
            for (k, v) in &evicted {
                self.report_evicted_leaf(info, k, v);
            }
        } else {
            while self.leaf_pool.will_be_full() {
                let Some(evicted) = self.leaf_pool.take_leaf(&mut self.nodes, leaf)? else {
                    break;
                };
                let info = self.storage_info(evicted.storage)?;
                self.report_evicted_leaf(info, &evicted.key, &evicted.value);
                self.settle()?;
            }
        }

        let evicted = self.leaf_mut(leaf)?.insert(key.clone(), value)?;
        self.leaf_pool.forget_leaves(evicted.len());
        let info = self.storage_info(leaf)?;
        for (k, v) in &evicted {
            self.report_evicted_leaf(info, k, v);
        }
        self.leaf_pool.add_leaf();

        let stored = self
            .nodes
            .get(leaf)
            .and_then(StorageNode::leaf)
            .and_then(|storage| storage.get(&key))
            .ok_or_else(|| InvariantError::new("inserted entry is missing"))?;
        self.observer.on_create_leaf(info, &key, stored);
        #[cfg(feature = "metrics")]
        self.metrics.record_leaf_created();
        trace!(storage = ?leaf, leaves = self.leaf_pool.leaves(), "entry cached");
        Ok(())
    }

    /// Removes one entry. A non-root leaf storage left empty is destroyed.
    pub(crate) fn remove_entry(&mut self, leaf: StorageId, key: &K) -> Result<Option<V>, MemoError> {
        let storage = self.leaf_mut(leaf)?;
        let Some(value) = storage.remove(key)? else {
            return Ok(None);
        };
        let now_empty = storage.is_empty();
        self.leaf_pool.forget_leaves(1);
        let info = self.storage_info(leaf)?;
        self.observer.on_remove_leaf(info, key, &value);

        if now_empty && leaf != self.root {
            self.destroy(leaf)?;
        }
        Ok(Some(value))
    }

    /// Destroys every storage except the root, then empties the root.
    pub(crate) fn clear(&mut self) -> Result<(), MemoError> {
        let doomed: Vec<StorageId> = self.nodes.ids().filter(|id| *id != self.root).collect();
        for id in doomed {
            self.destroy(id)?;
        }

        let root = self.root;
        let info = self.storage_info(root)?;
        if let Some(storage) = self.nodes.get_mut(root).and_then(StorageNode::leaf_mut) {
            let entries = storage.drain()?;
            self.leaf_pool.forget_leaves(entries.len());
            self.leaf_pool.detach(root)?;
            for (k, v) in &entries {
                self.observer.on_remove_leaf(info, k, v);
            }
        }
        self.settle()?;
        debug!(storages = self.nodes.len(), "storage tree cleared");
        Ok(())
    }

    /// Tears down one storage. Idempotent; the root is never destroyed.
    pub(crate) fn destroy(&mut self, id: StorageId) -> Result<(), MemoError> {
        if id == self.root {
            return Ok(());
        }
        let Some(paths) = self.nodes.get_mut(id).and_then(StorageNode::begin_destroy) else {
            return Ok(());
        };

        for path in paths {
            match path {
                ParentPath::Table { parent, key } => {
                    if let Some(table) = self.nodes.get_mut(parent).and_then(StorageNode::nested_mut) {
                        if table.get(&key) == Some(&id) {
                            table.remove(&key);
                        }
                    }
                },
                ParentPath::StoragePool => {
                    self.storage_pool.detach(&id)?;
                },
                ParentPath::LeafPool => {
                    self.leaf_pool.detach(id)?;
                },
            }
        }

        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| InvariantError::new("destroyed storage vanished"))?;
        let info = node.info(id);
        let mut dropped_entries = 0;
        if let NodeKind::Leaf(mut storage) = node.into_kind() {
            let entries = storage.drain()?;
            dropped_entries = entries.len();
            self.leaf_pool.forget_leaves(dropped_entries);
            for (k, v) in &entries {
                self.report_evicted_leaf(info, k, v);
            }
        }

        self.observer.on_remove_storage(info);
        #[cfg(feature = "metrics")]
        self.metrics.record_storage_destroyed();
        debug!(
            storage = ?id,
            depth = info.depth,
            kind = ?info.kind,
            dropped_entries,
            "storage destroyed"
        );
        Ok(())
    }

    /// Destroys every storage the pools dropped, until none is pending.
    pub(crate) fn settle(&mut self) -> Result<(), MemoError> {
        loop {
            let mut doomed = self.storage_pool.drain_destroyed();
            doomed.extend(self.leaf_pool.drain_destroyed());
            if doomed.is_empty() {
                return Ok(());
            }
            for id in doomed {
                self.destroy(id)?;
            }
        }
    }

    /// Adds a new nested storage to the pool without evicting any storage
    /// of `chain`.
    ///
    /// Victims on the chain are set aside while the pool makes room and are
    /// tracked again before the new storage.
    fn track_nested(&mut self, id: StorageId, chain: &[StorageId]) -> Result<(), MemoError> {
        let capacity = self.storage_pool.capacity();
        let mut set_aside = Vec::new();
        while capacity.will_be_full(self.storage_pool.len() + set_aside.len()) {
            let Some(victim) = self.storage_pool.peek().copied() else {
                return Err(InvariantError::new("storage pool cannot hold the current chain").into());
            };
            if chain.contains(&victim) {
                self.storage_pool.detach(&victim)?;
                set_aside.push(victim);
            } else {
                self.storage_pool.remove(&victim)?;
            }
        }
        for ancestor in set_aside {
            self.storage_pool.write(ancestor)?;
        }
        self.storage_pool.write(id)?;
        Ok(())
    }

    fn leaf_mut(&mut self, id: StorageId) -> Result<&mut LeafStorage<K, V>, MemoError> {
        self.nodes
            .get_mut(id)
            .and_then(StorageNode::leaf_mut)
            .ok_or_else(|| InvariantError::new("expected a live leaf storage").into())
    }

    fn report_created(&mut self, id: StorageId) {
        if let Some(node) = self.nodes.get(id) {
            let info = node.info(id);
            self.observer.on_create_storage(info);
            #[cfg(feature = "metrics")]
            self.metrics.record_storage_created();
            trace!(storage = ?id, depth = info.depth, kind = ?info.kind, "storage created");
        }
    }

    fn storage_info(&self, id: StorageId) -> Result<StorageInfo, MemoError> {
        self.nodes
            .get(id)
            .map(|node| node.info(id))
            .ok_or_else(|| InvariantError::new("expected a live storage").into())
    }

    fn report_evicted_leaf(&mut self, info: StorageInfo, key: &K, value: &V) {
        self.observer.on_remove_leaf(info, key, value);
        #[cfg(feature = "metrics")]
        self.metrics.record_leaf_evicted();
        trace!(storage = ?info.id, depth = info.depth, "entry evicted");
    }
}

#[cfg(feature = "metrics")]
impl<K, V> StorageContext<K, V> {
    pub(crate) fn record_lookup(&mut self) {
        self.metrics.record_lookup();
    }

    pub(crate) fn record_hit(&mut self, fast_path: bool) {
        if fast_path {
            self.metrics.record_fast_path_hit();
        } else {
            self.metrics.record_hit();
        }
    }

    pub(crate) fn record_miss(&mut self) {
        self.metrics.record_miss();
    }

    pub(crate) fn record_probe(&self, hit: bool) {
        (&self.metrics).record_probe();
        if hit {
            (&self.metrics).record_probe_hit();
        }
    }

    pub(crate) fn metrics_snapshot(&self) -> TreeMetricsSnapshot {
        self.metrics
            .snapshot(self.leaf_pool.leaves(), self.nodes.len())
    }
}

fn leaf_strategy<K>(policy: Policy, capacity: Capacity, track: bool) -> Strategy<K>
where
    K: Clone + Eq + Hash,
{
    if track {
        Strategy::new(policy, capacity)
    } else {
        Strategy::noop()
    }
}
