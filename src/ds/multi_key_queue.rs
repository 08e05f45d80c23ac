//! Indexed queue of buckets.
//!
//! A [`MultiKeyQueue`] is a [`LinkedList`] of buckets plus a hash index from
//! every key to the list node of the bucket that holds it. Looking up a key,
//! reordering its bucket, and dropping a key are all O(1).
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          list: LinkedList<B>
//!   ┌─────┬────────┐
//!   │ "a" │ id_1   │──────────┐         head ─► [id_1: {a, b}] ◄──► [id_2: {c}] ◄── tail
//!   │ "b" │ id_1   │──────────┤                      ▲                   ▲
//!   │ "c" │ id_2   │──────────┼──────────────────────┼───────────────────┘
//!   └─────┴────────┘          └──────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - every indexed key is held by exactly one live bucket, the one its index
//!   entry points at;
//! - every key held by a bucket in the list is indexed;
//! - no bucket in the list is empty: removing a bucket's last key removes the
//!   bucket's node.
//!
//! A mutation that finds the index and the buckets disagreeing returns
//! [`InvariantError`]. That is a bug in the caller or in this module, never a
//! user-facing condition.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::bucket::Bucket;
use crate::ds::linked_list::LinkedList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;

/// Linked list of buckets with a key → node index.
#[derive(Debug)]
pub struct MultiKeyQueue<K, B> {
    list: LinkedList<B>,
    index: FxHashMap<K, SlotId>,
}

impl<K, B> MultiKeyQueue<K, B>
where
    K: Clone + Eq + Hash,
    B: Bucket<K>,
{
    pub fn new() -> Self {
        Self {
            list: LinkedList::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            list: LinkedList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of buckets in the list.
    pub fn bucket_count(&self) -> usize {
        self.list.len()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the node of the bucket holding `key`.
    pub fn node_of(&self, key: &K) -> Option<SlotId> {
        self.index.get(key).copied()
    }

    pub fn contains_node(&self, node: SlotId) -> bool {
        self.list.contains(node)
    }

    pub fn bucket(&self, node: SlotId) -> Option<&B> {
        self.list.get(node)
    }

    /// Returns the bucket holding `key`.
    pub fn bucket_of(&self, key: &K) -> Option<&B> {
        self.node_of(key).and_then(|node| self.list.get(node))
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.list.front_id()
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.list.back_id()
    }

    pub fn next_id(&self, node: SlotId) -> Option<SlotId> {
        self.list.next_id(node)
    }

    pub fn prev_id(&self, node: SlotId) -> Option<SlotId> {
        self.list.prev_id(node)
    }

    pub fn front(&self) -> Option<&B> {
        self.list.front()
    }

    pub fn back(&self) -> Option<&B> {
        self.list.back()
    }

    /// Buckets from front to back.
    pub fn buckets(&self) -> impl Iterator<Item = &B> + '_ {
        self.list.iter()
    }

    /// Keys from the front bucket's front to the back bucket's back.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().flat_map(|bucket| bucket.keys())
    }

    /// Keys in reverse order.
    pub fn keys_rev(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter_rev().flat_map(|bucket| bucket.keys_rev())
    }

    /// Inserts `bucket` at the back and indexes all of its keys.
    ///
    /// Fails without modifying anything if one of the bucket's keys is
    /// already indexed or is reported twice.
    pub fn push_back(&mut self, bucket: B) -> Result<SlotId, InvariantError> {
        let keys = self.unindexed_keys(&bucket)?;
        let node = self.list.push_back(bucket);
        self.index_keys(keys, node);
        Ok(node)
    }

    /// Inserts `bucket` at the front and indexes all of its keys.
    pub fn push_front(&mut self, bucket: B) -> Result<SlotId, InvariantError> {
        let keys = self.unindexed_keys(&bucket)?;
        let node = self.list.push_front(bucket);
        self.index_keys(keys, node);
        Ok(node)
    }

    /// Inserts `bucket` directly before `anchor`.
    pub fn insert_before(&mut self, anchor: SlotId, bucket: B) -> Result<SlotId, InvariantError> {
        let keys = self.unindexed_keys(&bucket)?;
        let node = self
            .list
            .insert_before(anchor, bucket)
            .ok_or_else(|| InvariantError::new("anchor node is not in the queue"))?;
        self.index_keys(keys, node);
        Ok(node)
    }

    /// Inserts `bucket` directly after `anchor`.
    pub fn insert_after(&mut self, anchor: SlotId, bucket: B) -> Result<SlotId, InvariantError> {
        let keys = self.unindexed_keys(&bucket)?;
        let node = self
            .list
            .insert_after(anchor, bucket)
            .ok_or_else(|| InvariantError::new("anchor node is not in the queue"))?;
        self.index_keys(keys, node);
        Ok(node)
    }

    /// Adds `key` to the front of the existing bucket at `node`.
    pub fn add_key_front(&mut self, key: K, node: SlotId) -> Result<(), InvariantError> {
        self.add_key(key, node, true)
    }

    /// Adds `key` to the back of the existing bucket at `node`.
    pub fn add_key_back(&mut self, key: K, node: SlotId) -> Result<(), InvariantError> {
        self.add_key(key, node, false)
    }

    fn add_key(&mut self, key: K, node: SlotId, front: bool) -> Result<(), InvariantError> {
        if self.index.contains_key(&key) {
            return Err(InvariantError::new("key is already indexed"));
        }
        let bucket = self
            .list
            .get_mut(node)
            .ok_or_else(|| InvariantError::new("bucket node is not in the queue"))?;
        let added = if front {
            bucket.push_front(key.clone())?
        } else {
            bucket.push_back(key.clone())?
        };
        if !added {
            return Err(InvariantError::new("bucket refused a new key"));
        }
        self.index.insert(key, node);
        Ok(())
    }

    /// Removes `key` from its bucket, dropping the bucket once it is empty.
    ///
    /// Returns `Ok(false)` if the key is not indexed.
    pub fn drop_key(&mut self, key: &K) -> Result<bool, InvariantError> {
        let Some(node) = self.index.get(key).copied() else {
            return Ok(false);
        };
        let bucket = self
            .list
            .get_mut(node)
            .ok_or_else(|| InvariantError::new("indexed key points at a missing bucket"))?;
        if !bucket.remove(key)? {
            return Err(InvariantError::new("indexed key is not in its bucket"));
        }
        let now_empty = bucket.is_empty();
        self.index.remove(key);
        if now_empty {
            self.list.remove(node);
        }
        Ok(true)
    }

    /// Removes the whole bucket holding `key`, unindexing all of its keys.
    pub fn drop_bucket(&mut self, key: &K) -> Result<Option<B>, InvariantError> {
        match self.index.get(key).copied() {
            Some(node) => self
                .remove_bucket(node)
                .map(Some)
                .ok_or_else(|| InvariantError::new("indexed key points at a missing bucket")),
            None => Ok(None),
        }
    }

    /// Removes the bucket at `node`, unindexing all of its keys.
    pub fn remove_bucket(&mut self, node: SlotId) -> Option<B> {
        let bucket = self.list.remove(node)?;
        for key in bucket.keys() {
            self.index.remove(key);
        }
        Some(bucket)
    }

    pub fn move_to_front(&mut self, node: SlotId) -> bool {
        self.list.move_to_front(node)
    }

    pub fn move_to_back(&mut self, node: SlotId) -> bool {
        self.list.move_to_back(node)
    }

    /// Pops a key from the front bucket, dropping the bucket once it is empty.
    pub fn take_key_front(&mut self) -> Result<Option<K>, InvariantError> {
        self.take_key(true)
    }

    /// Pops a key from the back bucket, dropping the bucket once it is empty.
    pub fn take_key_back(&mut self) -> Result<Option<K>, InvariantError> {
        self.take_key(false)
    }

    fn take_key(&mut self, front: bool) -> Result<Option<K>, InvariantError> {
        loop {
            let node = if front {
                self.list.front_id()
            } else {
                self.list.back_id()
            };
            let Some(node) = node else {
                return Ok(None);
            };
            let bucket = self
                .list
                .get_mut(node)
                .ok_or_else(|| InvariantError::new("list end points at a missing bucket"))?;
            let taken = if front {
                bucket.take_front()?
            } else {
                bucket.take_back()?
            };
            let now_empty = bucket.is_empty();
            if now_empty {
                self.list.remove(node);
            }
            let Some(key) = taken else {
                continue;
            };
            if self.index.remove(&key) != Some(node) {
                return Err(InvariantError::new("taken key was indexed to another bucket"));
            }
            return Ok(Some(key));
        }
    }

    pub fn peek_key_front(&self) -> Option<&K> {
        self.list.iter().find_map(|bucket| bucket.peek_front())
    }

    pub fn peek_key_back(&self) -> Option<&K> {
        self.list.iter_rev().find_map(|bucket| bucket.peek_back())
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    fn unindexed_keys(&self, bucket: &B) -> Result<Vec<K>, InvariantError> {
        let keys: Vec<K> = bucket.keys().cloned().collect();
        for (i, key) in keys.iter().enumerate() {
            if self.index.contains_key(key) || keys[..i].contains(key) {
                return Err(InvariantError::new("key is already indexed"));
            }
        }
        Ok(keys)
    }

    fn index_keys(&mut self, keys: Vec<K>, node: SlotId) {
        for key in keys {
            self.index.insert(key, node);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        let mut held = 0usize;
        for node in self.list.iter_ids() {
            let bucket = self.list.get(node).expect("listed node missing");
            assert!(!bucket.is_empty(), "empty bucket left in queue");
            for key in bucket.keys() {
                assert_eq!(self.index.get(key), Some(&node));
                held += 1;
            }
        }
        assert_eq!(held, self.index.len());
    }
}

impl<K, B> Default for MultiKeyQueue<K, B>
where
    K: Clone + Eq + Hash,
    B: Bucket<K>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::bucket::Single;
    use crate::ds::single_key_queue::SingleKeyQueue;

    fn group(keys: &[u32]) -> SingleKeyQueue<u32> {
        let mut queue = SingleKeyQueue::new();
        for &key in keys {
            queue.push_back(key).unwrap();
        }
        queue
    }

    #[test]
    fn push_indexes_every_key() {
        let mut queue: MultiKeyQueue<u32, SingleKeyQueue<u32>> = MultiKeyQueue::new();
        let a = queue.push_back(group(&[1, 2])).unwrap();
        let b = queue.push_back(group(&[3])).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.bucket_count(), 2);
        assert_eq!(queue.node_of(&1), Some(a));
        assert_eq!(queue.node_of(&2), Some(a));
        assert_eq!(queue.node_of(&3), Some(b));
        assert_eq!(queue.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(queue.keys_rev().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn indexing_an_existing_key_faults() {
        let mut queue: MultiKeyQueue<u32, Single<u32>> = MultiKeyQueue::new();
        let node = queue.push_back(Single::new(1)).unwrap();

        assert!(queue.push_back(Single::new(1)).is_err());
        assert!(queue.push_front(Single::new(1)).is_err());
        assert!(queue.add_key_back(1, node).is_err());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.bucket_count(), 1);
        queue.debug_validate_invariants();
    }

    #[test]
    fn duplicate_keys_inside_one_bucket_fault() {
        struct Twice;
        impl Bucket<u8> for Twice {
            fn len(&self) -> usize {
                2
            }
            fn contains(&self, key: &u8) -> bool {
                *key == 0
            }
            fn push_front(&mut self, _: u8) -> Result<bool, InvariantError> {
                Ok(false)
            }
            fn push_back(&mut self, _: u8) -> Result<bool, InvariantError> {
                Ok(false)
            }
            fn take_front(&mut self) -> Result<Option<u8>, InvariantError> {
                Ok(None)
            }
            fn take_back(&mut self) -> Result<Option<u8>, InvariantError> {
                Ok(None)
            }
            fn peek_front(&self) -> Option<&u8> {
                None
            }
            fn peek_back(&self) -> Option<&u8> {
                None
            }
            fn remove(&mut self, _: &u8) -> Result<bool, InvariantError> {
                Ok(false)
            }
            fn keys<'a>(&'a self) -> impl Iterator<Item = &'a u8> + 'a
            where
                u8: 'a,
            {
                [&0u8, &0u8].into_iter()
            }
            fn keys_rev<'a>(&'a self) -> impl Iterator<Item = &'a u8> + 'a
            where
                u8: 'a,
            {
                [&0u8, &0u8].into_iter()
            }
        }

        let mut queue: MultiKeyQueue<u8, Twice> = MultiKeyQueue::new();
        assert!(queue.push_back(Twice).is_err());
        assert!(queue.is_empty());
        assert_eq!(queue.bucket_count(), 0);
    }

    #[test]
    fn drop_key_removes_bucket_only_when_empty() {
        let mut queue: MultiKeyQueue<u32, SingleKeyQueue<u32>> = MultiKeyQueue::new();
        let node = queue.push_back(group(&[1, 2])).unwrap();

        assert_eq!(queue.drop_key(&1), Ok(true));
        assert!(queue.contains_node(node));
        assert_eq!(queue.bucket_count(), 1);
        assert_eq!(queue.node_of(&2), Some(node));

        assert_eq!(queue.drop_key(&2), Ok(true));
        assert!(!queue.contains_node(node));
        assert_eq!(queue.bucket_count(), 0);
        assert_eq!(queue.drop_key(&2), Ok(false));
        queue.debug_validate_invariants();
    }

    #[test]
    fn drop_bucket_removes_all_keys() {
        let mut queue: MultiKeyQueue<u32, SingleKeyQueue<u32>> = MultiKeyQueue::new();
        queue.push_back(group(&[1, 2, 3])).unwrap();
        queue.push_back(group(&[4])).unwrap();

        let bucket = queue.drop_bucket(&2).unwrap().unwrap();
        assert_eq!(bucket.len(), 3);
        assert!(!queue.contains(&1));
        assert!(!queue.contains(&3));
        assert_eq!(queue.len(), 1);
        assert!(queue.drop_bucket(&9).unwrap().is_none());
        queue.debug_validate_invariants();
    }

    #[test]
    fn add_key_to_existing_bucket() {
        let mut queue: MultiKeyQueue<u32, SingleKeyQueue<u32>> = MultiKeyQueue::new();
        let node = queue.push_back(group(&[2])).unwrap();
        queue.add_key_back(3, node).unwrap();
        queue.add_key_front(1, node).unwrap();

        assert_eq!(queue.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(queue.node_of(&3), Some(node));
        queue.debug_validate_invariants();
    }

    #[test]
    fn take_key_walks_buckets_and_drops_empty_ones() {
        let mut queue: MultiKeyQueue<u32, SingleKeyQueue<u32>> = MultiKeyQueue::new();
        queue.push_back(group(&[1, 2])).unwrap();
        queue.push_back(group(&[3, 4])).unwrap();

        assert_eq!(queue.take_key_front(), Ok(Some(1)));
        assert_eq!(queue.take_key_back(), Ok(Some(4)));
        assert_eq!(queue.take_key_front(), Ok(Some(2)));
        assert_eq!(queue.bucket_count(), 1);
        assert_eq!(queue.peek_key_front(), Some(&3));
        assert_eq!(queue.take_key_front(), Ok(Some(3)));
        assert_eq!(queue.take_key_front(), Ok(None));
        assert!(queue.is_empty());
        queue.debug_validate_invariants();
    }

    #[test]
    fn insert_beside_anchor() {
        let mut queue: MultiKeyQueue<u32, Single<u32>> = MultiKeyQueue::new();
        let mid = queue.push_back(Single::new(2)).unwrap();
        queue.insert_before(mid, Single::new(1)).unwrap();
        queue.insert_after(mid, Single::new(3)).unwrap();

        assert_eq!(queue.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        queue.remove_bucket(mid);
        assert!(queue.insert_after(mid, Single::new(4)).is_err());
        assert!(!queue.contains(&4));
        queue.debug_validate_invariants();
    }

    #[test]
    fn moving_buckets_reorders_keys() {
        let mut queue: MultiKeyQueue<u32, Single<u32>> = MultiKeyQueue::new();
        let first = queue.push_back(Single::new(1)).unwrap();
        queue.push_back(Single::new(2)).unwrap();

        assert!(queue.move_to_back(first));
        assert_eq!(queue.peek_key_front(), Some(&2));
        assert_eq!(queue.peek_key_back(), Some(&1));
        assert!(queue.move_to_front(first));
        assert_eq!(queue.peek_key_front(), Some(&1));
    }
}
