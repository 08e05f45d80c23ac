//! Global pool of leaf storages plus the budget on cached entries.
//!
//! Entries are physically grouped by the leaf storage that holds them, but
//! the entry budget is global. [`RootLeafStrategy`] keeps both numbers: the
//! leaf storages themselves (ordered by a strategy over storage ids) and the
//! running total of entries across them.
//!
//! ```text
//!   storages (victim first)        entries
//!   ┌──────┐   ┌──────┐   ┌──────┐
//!   │  L3  │──►│  L1  │──►│  L7  │    leaves = 3 + 1 + 2 = 6
//!   │ x y z│   │  p   │   │ q r  │
//!   └──────┘   └──────┘   └──────┘
//!
//!   take_leaf: evict L3's own victim (x); leaves = 5.
//!   If L3 had held one entry it would now be empty and dropped as well.
//! ```

use std::hash::Hash;

use crate::ds::SlotArena;
use crate::error::{InvariantError, MemoError};
use crate::policy::{Destroyable, Strategy};
use crate::store::node::{StorageId, StorageNode};
use crate::traits::{CacheStrategy, Capacity};

/// Entry evicted by the global budget, with the storage it came from.
pub(crate) struct EvictedLeaf<K, V> {
    pub storage: StorageId,
    pub key: K,
    pub value: V,
}

#[derive(Debug)]
pub(crate) struct RootLeafStrategy {
    storages: Destroyable<Strategy<StorageId>, StorageId>,
    leaves: usize,
    limit: Capacity,
}

impl RootLeafStrategy {
    pub(crate) fn new(storages: Strategy<StorageId>, limit: Capacity) -> Self {
        Self {
            storages: Destroyable::new(storages),
            leaves: 0,
            limit,
        }
    }

    /// Total cached entries across every leaf storage.
    pub(crate) fn leaves(&self) -> usize {
        self.leaves
    }

    pub(crate) fn storage_count(&self) -> usize {
        self.storages.len()
    }

    /// `true` if one more entry would exceed the entry budget.
    pub(crate) fn will_be_full(&self) -> bool {
        self.limit.will_be_full(self.leaves)
    }

    pub(crate) fn add_leaf(&mut self) {
        self.leaves += 1;
    }

    pub(crate) fn forget_leaves(&mut self, count: usize) {
        self.leaves = self.leaves.saturating_sub(count);
    }

    /// Records an access to a leaf storage, tracking it if it is new.
    ///
    /// A storage evicted to make room is queued for destruction.
    pub(crate) fn touch_storage(&mut self, id: StorageId) -> Result<(), MemoError> {
        if self.storages.has(&id) {
            self.storages.read(&id)?;
        } else {
            self.storages.write(id)?;
        }
        Ok(())
    }

    /// Stops tracking a storage that is already being destroyed.
    pub(crate) fn detach(&mut self, id: StorageId) -> Result<bool, MemoError> {
        self.storages.detach(&id)
    }

    pub(crate) fn drain_destroyed(&mut self) -> Vec<StorageId> {
        self.storages.drain_destroyed()
    }

    /// Evicts one entry under the global budget.
    ///
    /// The victim storage's own strategy picks the entry. A storage left
    /// empty is dropped, except `protect`, the storage about to receive a new
    /// entry: if it turns up empty at the front it is set aside for the scan
    /// and tracked again afterwards.
    pub(crate) fn take_leaf<K, V>(
        &mut self,
        nodes: &mut SlotArena<StorageNode<K, V>>,
        protect: StorageId,
    ) -> Result<Option<EvictedLeaf<K, V>>, MemoError>
    where
        K: Clone + Eq + Hash,
    {
        let mut set_aside = false;
        let evicted = loop {
            let Some(victim) = self.storages.peek().copied() else {
                break None;
            };
            let leaf = nodes
                .get_mut(victim)
                .and_then(StorageNode::leaf_mut)
                .ok_or_else(|| InvariantError::new("leaf pool tracks a missing leaf storage"))?;

            if leaf.is_empty() {
                if victim == protect {
                    self.storages.detach(&victim)?;
                    set_aside = true;
                } else {
                    self.storages.remove(&victim)?;
                }
                continue;
            }

            let Some((key, value)) = leaf.evict_one()? else {
                return Err(InvariantError::new("non-empty leaf storage yielded no victim").into());
            };
            let now_empty = leaf.is_empty();
            self.leaves = self.leaves.saturating_sub(1);
            if now_empty && victim != protect {
                self.storages.remove(&victim)?;
            }
            break Some(EvictedLeaf {
                storage: victim,
                key,
                value,
            });
        };

        if set_aside {
            self.storages.write(protect)?;
        }
        Ok(evicted)
    }
}
