//! Bucket capability used by [`MultiKeyQueue`](crate::ds::MultiKeyQueue).
//!
//! A bucket is an ordered, key-indexed group of keys held as one node of the
//! queue's list. The queue indexes every key a bucket reports, so a bucket
//! must report exactly the keys it holds through [`Bucket::keys`].
//!
//! Two buckets ship with the crate:
//!
//! - [`Single`]: one key, the degenerate bucket for policies where each entry
//!   stands on its own (LRU, FIFO).
//! - [`SingleKeyQueue`](crate::ds::SingleKeyQueue): an ordered set of keys,
//!   used as an LFU frequency level.

use crate::error::InvariantError;

/// Ordered, key-indexed group of keys.
///
/// Mutators are fallible so that buckets built on other indexed collections
/// can surface their own inconsistencies instead of hiding them.
pub trait Bucket<K> {
    /// Number of keys in the bucket.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &K) -> bool;

    /// Adds `key` at the front. Returns `false` if the bucket cannot take it
    /// (already present, or no room).
    fn push_front(&mut self, key: K) -> Result<bool, InvariantError>;

    /// Adds `key` at the back. Returns `false` if the bucket cannot take it.
    fn push_back(&mut self, key: K) -> Result<bool, InvariantError>;

    fn take_front(&mut self) -> Result<Option<K>, InvariantError>;

    fn take_back(&mut self) -> Result<Option<K>, InvariantError>;

    fn peek_front(&self) -> Option<&K>;

    fn peek_back(&self) -> Option<&K>;

    /// Removes `key`; returns `false` if it was not in the bucket.
    fn remove(&mut self, key: &K) -> Result<bool, InvariantError>;

    /// Keys from front to back.
    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a;

    /// Keys from back to front.
    fn keys_rev<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a;
}

/// One-slot bucket: the key is the whole content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Single<K> {
    key: Option<K>,
}

impl<K> Single<K> {
    pub fn new(key: K) -> Self {
        Self { key: Some(key) }
    }

    pub fn empty() -> Self {
        Self { key: None }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn into_key(self) -> Option<K> {
        self.key
    }
}

impl<K: Eq> Bucket<K> for Single<K> {
    fn len(&self) -> usize {
        usize::from(self.key.is_some())
    }

    fn contains(&self, key: &K) -> bool {
        self.key.as_ref() == Some(key)
    }

    fn push_front(&mut self, key: K) -> Result<bool, InvariantError> {
        if self.key.is_some() {
            return Ok(false);
        }
        self.key = Some(key);
        Ok(true)
    }

    fn push_back(&mut self, key: K) -> Result<bool, InvariantError> {
        self.push_front(key)
    }

    fn take_front(&mut self) -> Result<Option<K>, InvariantError> {
        Ok(self.key.take())
    }

    fn take_back(&mut self) -> Result<Option<K>, InvariantError> {
        Ok(self.key.take())
    }

    fn peek_front(&self) -> Option<&K> {
        self.key.as_ref()
    }

    fn peek_back(&self) -> Option<&K> {
        self.key.as_ref()
    }

    fn remove(&mut self, key: &K) -> Result<bool, InvariantError> {
        if self.contains(key) {
            self.key = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        self.key.iter()
    }

    fn keys_rev<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        self.key.iter()
    }
}
