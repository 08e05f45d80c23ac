//! Hash index plus doubly linked list, one key per node.
//!
//! [`SingleKeyQueue`] is [`MultiKeyQueue`] with [`Single`] buckets: the
//! classic O(1) structure behind recency and insertion-order policies.
//! It is also a [`Bucket`] itself, which is how LFU stores the keys sharing
//! one frequency level.

use std::hash::Hash;

use crate::ds::bucket::{Bucket, Single};
use crate::ds::multi_key_queue::MultiKeyQueue;
use crate::error::InvariantError;

#[derive(Debug)]
pub struct SingleKeyQueue<K> {
    inner: MultiKeyQueue<K, Single<K>>,
}

impl<K> SingleKeyQueue<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            inner: MultiKeyQueue::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: MultiKeyQueue::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// Appends `key`. Returns `false` if it is already queued.
    pub fn push_back(&mut self, key: K) -> Result<bool, InvariantError> {
        if self.inner.contains(&key) {
            return Ok(false);
        }
        self.inner.push_back(Single::new(key))?;
        Ok(true)
    }

    /// Prepends `key`. Returns `false` if it is already queued.
    pub fn push_front(&mut self, key: K) -> Result<bool, InvariantError> {
        if self.inner.contains(&key) {
            return Ok(false);
        }
        self.inner.push_front(Single::new(key))?;
        Ok(true)
    }

    pub fn remove(&mut self, key: &K) -> Result<bool, InvariantError> {
        self.inner.drop_key(key)
    }

    pub fn take_front(&mut self) -> Result<Option<K>, InvariantError> {
        self.inner.take_key_front()
    }

    pub fn take_back(&mut self) -> Result<Option<K>, InvariantError> {
        self.inner.take_key_back()
    }

    pub fn peek_front(&self) -> Option<&K> {
        self.inner.peek_key_front()
    }

    pub fn peek_back(&self) -> Option<&K> {
        self.inner.peek_key_back()
    }

    /// Moves `key` to the back. Returns `false` if it is not queued.
    pub fn move_to_back(&mut self, key: &K) -> bool {
        match self.inner.node_of(key) {
            Some(node) => self.inner.move_to_back(node),
            None => false,
        }
    }

    /// Moves `key` to the front. Returns `false` if it is not queued.
    pub fn move_to_front(&mut self, key: &K) -> bool {
        match self.inner.node_of(key) {
            Some(node) => self.inner.move_to_front(node),
            None => false,
        }
    }

    /// Keys from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.inner.keys()
    }

    pub fn iter_rev(&self) -> impl Iterator<Item = &K> + '_ {
        self.inner.keys_rev()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.inner.debug_validate_invariants();
        assert_eq!(self.inner.len(), self.inner.bucket_count());
    }
}

impl<K> Default for SingleKeyQueue<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Bucket<K> for SingleKeyQueue<K>
where
    K: Clone + Eq + Hash,
{
    fn len(&self) -> usize {
        SingleKeyQueue::len(self)
    }

    fn contains(&self, key: &K) -> bool {
        SingleKeyQueue::contains(self, key)
    }

    fn push_front(&mut self, key: K) -> Result<bool, InvariantError> {
        SingleKeyQueue::push_front(self, key)
    }

    fn push_back(&mut self, key: K) -> Result<bool, InvariantError> {
        SingleKeyQueue::push_back(self, key)
    }

    fn take_front(&mut self) -> Result<Option<K>, InvariantError> {
        SingleKeyQueue::take_front(self)
    }

    fn take_back(&mut self) -> Result<Option<K>, InvariantError> {
        SingleKeyQueue::take_back(self)
    }

    fn peek_front(&self) -> Option<&K> {
        SingleKeyQueue::peek_front(self)
    }

    fn peek_back(&self) -> Option<&K> {
        SingleKeyQueue::peek_back(self)
    }

    fn remove(&mut self, key: &K) -> Result<bool, InvariantError> {
        SingleKeyQueue::remove(self, key)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        self.iter()
    }

    fn keys_rev<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        self.iter_rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_duplicates() {
        let mut queue = SingleKeyQueue::new();
        assert_eq!(queue.push_back("a"), Ok(true));
        assert_eq!(queue.push_back("a"), Ok(false));
        assert_eq!(queue.push_front("a"), Ok(false));
        assert_eq!(queue.len(), 1);
        queue.debug_validate_invariants();
    }

    #[test]
    fn fifo_order_front_to_back() {
        let mut queue = SingleKeyQueue::new();
        for key in 1..=4 {
            queue.push_back(key).unwrap();
        }
        queue.push_front(0).unwrap();

        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.take_front(), Ok(Some(0)));
        assert_eq!(queue.take_back(), Ok(Some(4)));
        assert_eq!(queue.peek_front(), Some(&1));
        assert_eq!(queue.peek_back(), Some(&3));
        queue.debug_validate_invariants();
    }

    #[test]
    fn move_reorders_existing_keys_only() {
        let mut queue = SingleKeyQueue::new();
        for key in 1..=3 {
            queue.push_back(key).unwrap();
        }

        assert!(queue.move_to_back(&1));
        assert!(queue.move_to_front(&3));
        assert!(!queue.move_to_back(&9));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(queue.iter_rev().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn remove_and_clear() {
        let mut queue = SingleKeyQueue::new();
        queue.push_back(1).unwrap();
        queue.push_back(2).unwrap();

        assert_eq!(queue.remove(&1), Ok(true));
        assert_eq!(queue.remove(&1), Ok(false));
        assert!(!queue.contains(&1));

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.take_front(), Ok(None));
        assert_eq!(queue.peek_back(), None);
    }

    #[test]
    fn usable_as_bucket() {
        fn fill<B: Bucket<u8>>(bucket: &mut B) {
            bucket.push_back(1).unwrap();
            bucket.push_back(2).unwrap();
        }

        let mut queue = SingleKeyQueue::new();
        fill(&mut queue);
        assert_eq!(Bucket::len(&queue), 2);
        assert_eq!(Bucket::keys_rev(&queue).copied().collect::<Vec<_>>(), vec![2, 1]);
    }
}
