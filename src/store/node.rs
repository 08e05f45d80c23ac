//! Storage nodes and the edges that own them.
//!
//! The storage tree is a DAG: a non-root storage is referenced by the table
//! entry of its literal parent *and* by one global pool. Each of those
//! references is recorded on the node as a [`ParentPath`]. Destroying a node
//! visits every path once so each owner can forget it; nothing relies on
//! reference counting.
//!
//! ```text
//!            root (Nested)
//!            ├── "a" ──► A (Nested)        A.parents = [Table{root,"a"}, StoragePool]
//!            │           └── 1 ──► L (Leaf) L.parents = [Table{A,1}, LeafPool]
//!            └── "b" ──► B (Nested)
//! ```

use crate::ds::SlotId;
use crate::observer::{StorageInfo, StorageKind};
use crate::store::leaf::LeafStorage;
use crate::store::table::Table;

/// Generational handle to a storage. Ids of destroyed storages never resolve.
pub type StorageId = SlotId;

/// One owner of a storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentPath<K> {
    /// Entry `key` of the nested storage `parent`.
    Table { parent: StorageId, key: K },
    /// The global pool of nested storages.
    StoragePool,
    /// The global pool of leaf storages.
    LeafPool,
}

#[derive(Debug)]
pub(crate) enum NodeKind<K, V> {
    Nested(Table<K, StorageId>),
    Leaf(LeafStorage<K, V>),
}

#[derive(Debug)]
pub(crate) struct StorageNode<K, V> {
    kind: NodeKind<K, V>,
    parents: Vec<ParentPath<K>>,
    depth: usize,
    destroyed: bool,
}

impl<K, V> StorageNode<K, V> {
    pub(crate) fn new(kind: NodeKind<K, V>, depth: usize, parents: Vec<ParentPath<K>>) -> Self {
        Self {
            kind,
            parents,
            depth,
            destroyed: false,
        }
    }

    pub(crate) fn kind(&self) -> StorageKind {
        match self.kind {
            NodeKind::Nested(_) => StorageKind::Nested,
            NodeKind::Leaf(_) => StorageKind::Leaf,
        }
    }

    pub(crate) fn info(&self, id: StorageId) -> StorageInfo {
        StorageInfo {
            id,
            depth: self.depth,
            kind: self.kind(),
        }
    }

    #[cfg(test)]
    pub(crate) fn parents(&self) -> &[ParentPath<K>] {
        &self.parents
    }

    pub(crate) fn nested(&self) -> Option<&Table<K, StorageId>> {
        match &self.kind {
            NodeKind::Nested(table) => Some(table),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn nested_mut(&mut self) -> Option<&mut Table<K, StorageId>> {
        match &mut self.kind {
            NodeKind::Nested(table) => Some(table),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn leaf(&self) -> Option<&LeafStorage<K, V>> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Nested(_) => None,
        }
    }

    pub(crate) fn leaf_mut(&mut self) -> Option<&mut LeafStorage<K, V>> {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Nested(_) => None,
        }
    }

    pub(crate) fn into_kind(self) -> NodeKind<K, V> {
        self.kind
    }

    /// Marks the node destroyed and hands out its parent paths.
    ///
    /// Returns `None` on every call after the first, so each path is
    /// notified exactly once.
    pub(crate) fn begin_destroy(&mut self) -> Option<Vec<ParentPath<K>>> {
        if self.destroyed {
            return None;
        }
        self.destroyed = true;
        Some(std::mem::take(&mut self.parents))
    }

    #[cfg(test)]
    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
