//! # Write-order (FIFO) strategy
//!
//! Victims leave in the order they were last *written*. Reads are free: they
//! never reorder anything. Rewriting a tracked value moves it to the back of
//! the queue exactly as an LRU touch would, so this is write-recency rather
//! than strict insertion order.
//!
//! ```text
//!   write 0..=2, capacity 3     front ──► [0] [1] [2] ◄── back
//!   read(0)                     front ──► [0] [1] [2] ◄── back   (no change)
//!   write(0)                    front ──► [1] [2] [0] ◄── back
//!   write(3)                    evicts 1
//! ```

use std::hash::Hash;

use crate::effect::Effect;
use crate::error::{ConfigError, MemoError};
use crate::policy::lru::LruStrategy;
use crate::traits::{CacheStrategy, Capacity};

/// LRU bookkeeping with reads that do not count as accesses.
#[derive(Debug)]
pub struct FifoStrategy<V> {
    order: LruStrategy<V>,
}

impl<V> FifoStrategy<V>
where
    V: Clone + Eq + Hash,
{
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: LruStrategy::new(capacity),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            order: LruStrategy::try_new(capacity)?,
        })
    }

    pub fn unbounded() -> Self {
        Self::with_bound(Capacity::Unbounded)
    }

    pub fn with_bound(capacity: Capacity) -> Self {
        Self {
            order: LruStrategy::with_bound(capacity),
        }
    }

    /// Values from oldest to newest write.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.order.iter()
    }
}

impl<V> CacheStrategy<V> for FifoStrategy<V>
where
    V: Clone + Eq + Hash,
{
    fn len(&self) -> usize {
        self.order.len()
    }

    fn capacity(&self) -> Capacity {
        self.order.capacity()
    }

    fn has(&self, value: &V) -> bool {
        self.order.has(value)
    }

    fn peek(&self) -> Option<&V> {
        self.order.peek()
    }

    fn write(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        self.order.touch(value)
    }

    fn read(&mut self, value: &V) -> Result<Effect<V>, MemoError> {
        if self.order.has(value) {
            Ok(Effect::empty())
        } else {
            Err(MemoError::NotTracked)
        }
    }

    fn remove(&mut self, value: &V) -> Result<bool, MemoError> {
        self.order.remove(value)
    }

    fn take(&mut self) -> Result<Option<V>, MemoError> {
        self.order.take()
    }
}
