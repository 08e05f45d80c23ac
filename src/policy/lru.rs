//! # Least Recently Used (LRU) strategy
//!
//! Values sit in a [`SingleKeyQueue`] ordered by last access. Both `write` and
//! `read` move a value to the back; victims come from the front.
//!
//! ```text
//!   write(D) at capacity 3:
//!
//!   front ──► [A] ◄──► [B] ◄──► [C] ◄── back       take() → A
//!   front ──► [B] ◄──► [C] ◄──► [D] ◄── back       effect: removed [A], added [D]
//!
//!   read(B):
//!   front ──► [C] ◄──► [D] ◄──► [B] ◄── back       effect: empty
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use memokit::policy::LruStrategy;
//! use memokit::traits::CacheStrategy;
//!
//! let mut lru = LruStrategy::new(2);
//! lru.write("a").unwrap();
//! lru.write("b").unwrap();
//! lru.read(&"a").unwrap();
//!
//! let effect = lru.write("c").unwrap();
//! assert_eq!(effect.removed(), &["b"]);
//! ```

use std::hash::Hash;

use crate::ds::SingleKeyQueue;
use crate::effect::Effect;
use crate::error::{ConfigError, InvariantError, MemoError};
use crate::traits::{CacheStrategy, Capacity};

#[derive(Debug)]
pub struct LruStrategy<V> {
    queue: SingleKeyQueue<V>,
    capacity: Capacity,
}

impl<V> LruStrategy<V>
where
    V: Clone + Eq + Hash,
{
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(strategy) => strategy,
            Err(e) => panic!("{}", e),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_bound(Capacity::try_new(capacity)?))
    }

    pub fn unbounded() -> Self {
        Self::with_bound(Capacity::Unbounded)
    }

    pub fn with_bound(capacity: Capacity) -> Self {
        let queue = match capacity.get() {
            Some(n) => SingleKeyQueue::with_capacity(n),
            None => SingleKeyQueue::new(),
        };
        Self { queue, capacity }
    }

    /// Values from least to most recently touched.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.queue.iter()
    }

    pub(crate) fn touch(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        if self.queue.move_to_back(&value) {
            return Ok(Effect::empty());
        }
        let reserved = self.reserve_place()?;
        if !self.queue.push_back(value.clone())? {
            return Err(InvariantError::new("untracked value already queued").into());
        }
        Ok(reserved.chain(Effect::with_added(value)))
    }
}

impl<V> CacheStrategy<V> for LruStrategy<V>
where
    V: Clone + Eq + Hash,
{
    fn len(&self) -> usize {
        self.queue.len()
    }

    fn capacity(&self) -> Capacity {
        self.capacity
    }

    fn has(&self, value: &V) -> bool {
        self.queue.contains(value)
    }

    fn peek(&self) -> Option<&V> {
        self.queue.peek_front()
    }

    fn write(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        self.touch(value)
    }

    fn read(&mut self, value: &V) -> Result<Effect<V>, MemoError> {
        if self.queue.move_to_back(value) {
            Ok(Effect::empty())
        } else {
            Err(MemoError::NotTracked)
        }
    }

    fn remove(&mut self, value: &V) -> Result<bool, MemoError> {
        Ok(self.queue.remove(value)?)
    }

    fn take(&mut self) -> Result<Option<V>, MemoError> {
        Ok(self.queue.take_front()?)
    }
}
