//! # Least Frequently Used (LFU) strategy
//!
//! O(1) frequency-list LFU. Values are grouped into *levels*, one bucket per
//! distinct access count, kept in ascending order in a [`MultiKeyQueue`].
//! Inside a level, keys are ordered by when they reached that level.
//!
//! ```text
//!   levels (front = lowest count)
//!
//!   ┌─────────┐     ┌─────────┐     ┌─────────┐
//!   │ level 1 │ ◄─► │ level 2 │ ◄─► │ level 5 │
//!   │  d  e   │     │  a      │     │  b  c   │
//!   └─────────┘     └─────────┘     └─────────┘
//!       ▲
//!       └── take() removes d: lowest count, oldest at that count
//!
//!   touch(a): level 2 → level 3. No level-3 bucket follows level 2, so one is
//!   inserted right after it; level 2 is then empty and gone.
//! ```
//!
//! Both `write` and `read` count as accesses.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::policy::LfuStrategy;
//! use memokit::traits::CacheStrategy;
//!
//! let mut lfu = LfuStrategy::new(2);
//! lfu.write("hot").unwrap();
//! lfu.write("cold").unwrap();
//! lfu.read(&"hot").unwrap();
//!
//! assert_eq!(lfu.frequency(&"hot"), Some(2));
//! assert_eq!(lfu.write("new").unwrap().removed(), &["cold"]);
//! ```

use std::hash::Hash;

use crate::ds::{Bucket, MultiKeyQueue, SingleKeyQueue, SlotId};
use crate::effect::Effect;
use crate::error::{ConfigError, InvariantError, MemoError};
use crate::traits::{CacheStrategy, Capacity};

/// Keys sharing one access count.
#[derive(Debug)]
struct FrequencyLevel<V> {
    level: u64,
    keys: SingleKeyQueue<V>,
}

impl<V> FrequencyLevel<V>
where
    V: Clone + Eq + Hash,
{
    fn with_key(level: u64, key: V) -> Result<Self, InvariantError> {
        let mut keys = SingleKeyQueue::new();
        keys.push_back(key)?;
        Ok(Self { level, keys })
    }
}

impl<V> Bucket<V> for FrequencyLevel<V>
where
    V: Clone + Eq + Hash,
{
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn contains(&self, key: &V) -> bool {
        self.keys.contains(key)
    }

    fn push_front(&mut self, key: V) -> Result<bool, InvariantError> {
        self.keys.push_front(key)
    }

    fn push_back(&mut self, key: V) -> Result<bool, InvariantError> {
        self.keys.push_back(key)
    }

    fn take_front(&mut self) -> Result<Option<V>, InvariantError> {
        self.keys.take_front()
    }

    fn take_back(&mut self) -> Result<Option<V>, InvariantError> {
        self.keys.take_back()
    }

    fn peek_front(&self) -> Option<&V> {
        self.keys.peek_front()
    }

    fn peek_back(&self) -> Option<&V> {
        self.keys.peek_back()
    }

    fn remove(&mut self, key: &V) -> Result<bool, InvariantError> {
        self.keys.remove(key)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a
    where
        V: 'a,
    {
        self.keys.iter()
    }

    fn keys_rev<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a
    where
        V: 'a,
    {
        self.keys.iter_rev()
    }
}

#[derive(Debug)]
pub struct LfuStrategy<V> {
    levels: MultiKeyQueue<V, FrequencyLevel<V>>,
    capacity: Capacity,
}

impl<V> LfuStrategy<V>
where
    V: Clone + Eq + Hash,
{
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(strategy) => strategy,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_bound(Capacity::try_new(capacity)?))
    }

    pub fn unbounded() -> Self {
        Self::with_bound(Capacity::Unbounded)
    }

    pub fn with_bound(capacity: Capacity) -> Self {
        Self {
            levels: MultiKeyQueue::new(),
            capacity,
        }
    }

    /// Number of recorded accesses, or `None` if `value` is not tracked.
    pub fn frequency(&self, value: &V) -> Option<u64> {
        self.levels.bucket_of(value).map(|bucket| bucket.level)
    }

    /// Values from next victim to most protected.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.levels.keys()
    }

    fn touch(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        match self.levels.node_of(&value) {
            Some(node) => {
                self.promote(value, node)?;
                Ok(Effect::empty())
            },
            None => {
                let reserved = self.reserve_place()?;
                match self.levels.front_id() {
                    Some(front) if self.level_at(front) == Some(1) => {
                        self.levels.add_key_back(value.clone(), front)?;
                    },
                    _ => {
                        self.levels
                            .push_front(FrequencyLevel::with_key(1, value.clone())?)?;
                    },
                }
                Ok(reserved.chain(Effect::with_added(value)))
            },
        }
    }

    fn promote(&mut self, value: V, node: SlotId) -> Result<(), MemoError> {
        let level = self
            .level_at(node)
            .ok_or_else(|| InvariantError::new("tracked value has no level"))?;
        let target = level.saturating_add(1);
        let next = self.levels.next_id(node);

        self.levels.drop_key(&value)?;

        if let Some(next) = next {
            if self.level_at(next) == Some(target) {
                self.levels.add_key_back(value, next)?;
                return Ok(());
            }
        }
        let bucket = FrequencyLevel::with_key(target, value)?;
        if self.levels.contains_node(node) {
            self.levels.insert_after(node, bucket)?;
        } else if let Some(next) = next {
            self.levels.insert_before(next, bucket)?;
        } else {
            self.levels.push_back(bucket)?;
        }
        Ok(())
    }

    fn level_at(&self, node: SlotId) -> Option<u64> {
        self.levels.bucket(node).map(|bucket| bucket.level)
    }

    #[cfg(test)]
    fn levels(&self) -> Vec<u64> {
        self.levels.buckets().map(|bucket| bucket.level).collect()
    }
}

impl<V> CacheStrategy<V> for LfuStrategy<V>
where
    V: Clone + Eq + Hash,
{
    fn len(&self) -> usize {
        self.levels.len()
    }

    fn capacity(&self) -> Capacity {
        self.capacity
    }

    fn has(&self, value: &V) -> bool {
        self.levels.contains(value)
    }

    fn peek(&self) -> Option<&V> {
        self.levels.peek_key_front()
    }

    fn write(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        self.touch(value)
    }

    fn read(&mut self, value: &V) -> Result<Effect<V>, MemoError> {
        if !self.levels.contains(value) {
            return Err(MemoError::NotTracked);
        }
        self.touch(value.clone())
    }

    fn remove(&mut self, value: &V) -> Result<bool, MemoError> {
        Ok(self.levels.drop_key(value)?)
    }

    fn take(&mut self) -> Result<Option<V>, MemoError> {
        Ok(self.levels.take_key_front()?)
    }
}
