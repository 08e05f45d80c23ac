//! Replacement policies.
//!
//! | Policy | Victim                                    | Reads count? |
//! |--------|-------------------------------------------|--------------|
//! | LRU    | least recently written or read            | yes          |
//! | FIFO   | least recently written                    | no           |
//! | LFU    | fewest accesses, oldest among ties        | yes          |
//! | no-op  | none; tracks nothing                      | n/a          |
//!
//! [`Strategy`] is the closed variant set the storage tree stores in its
//! pools, chosen from a [`Policy`] tag at construction.

pub mod destroyable;
pub mod fifo;
pub mod lfu;
pub mod lru;
pub mod noop;

pub use destroyable::Destroyable;
pub use fifo::FifoStrategy;
pub use lfu::LfuStrategy;
pub use lru::LruStrategy;
pub use noop::NoopStrategy;

use std::hash::Hash;

use crate::effect::Effect;
use crate::error::MemoError;
use crate::traits::{CacheStrategy, Capacity};

/// Replacement policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    #[default]
    Lru,
    Lfu,
    Fifo,
}

/// A strategy from the built-in set.
#[derive(Debug)]
pub enum Strategy<V> {
    Lru(LruStrategy<V>),
    Lfu(LfuStrategy<V>),
    Fifo(FifoStrategy<V>),
    Noop(NoopStrategy<V>),
}

impl<V> Strategy<V>
where
    V: Clone + Eq + Hash,
{
    pub fn new(policy: Policy, capacity: Capacity) -> Self {
        match policy {
            Policy::Lru => Strategy::Lru(LruStrategy::with_bound(capacity)),
            Policy::Lfu => Strategy::Lfu(LfuStrategy::with_bound(capacity)),
            Policy::Fifo => Strategy::Fifo(FifoStrategy::with_bound(capacity)),
        }
    }

    pub fn noop() -> Self {
        Strategy::Noop(NoopStrategy::new())
    }

    /// The policy tag, or `None` for the no-op strategy.
    pub fn policy(&self) -> Option<Policy> {
        match self {
            Strategy::Lru(_) => Some(Policy::Lru),
            Strategy::Lfu(_) => Some(Policy::Lfu),
            Strategy::Fifo(_) => Some(Policy::Fifo),
            Strategy::Noop(_) => None,
        }
    }
}

impl<V> CacheStrategy<V> for Strategy<V>
where
    V: Clone + Eq + Hash,
{
    fn len(&self) -> usize {
        match self {
            Strategy::Lru(s) => s.len(),
            Strategy::Lfu(s) => s.len(),
            Strategy::Fifo(s) => s.len(),
            Strategy::Noop(s) => s.len(),
        }
    }

    fn capacity(&self) -> Capacity {
        match self {
            Strategy::Lru(s) => s.capacity(),
            Strategy::Lfu(s) => s.capacity(),
            Strategy::Fifo(s) => s.capacity(),
            Strategy::Noop(s) => s.capacity(),
        }
    }

    fn has(&self, value: &V) -> bool {
        match self {
            Strategy::Lru(s) => s.has(value),
            Strategy::Lfu(s) => s.has(value),
            Strategy::Fifo(s) => s.has(value),
            Strategy::Noop(s) => s.has(value),
        }
    }

    fn peek(&self) -> Option<&V> {
        match self {
            Strategy::Lru(s) => s.peek(),
            Strategy::Lfu(s) => s.peek(),
            Strategy::Fifo(s) => s.peek(),
            Strategy::Noop(s) => s.peek(),
        }
    }

    fn write(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        match self {
            Strategy::Lru(s) => s.write(value),
            Strategy::Lfu(s) => s.write(value),
            Strategy::Fifo(s) => s.write(value),
            Strategy::Noop(s) => s.write(value),
        }
    }

    fn read(&mut self, value: &V) -> Result<Effect<V>, MemoError> {
        match self {
            Strategy::Lru(s) => s.read(value),
            Strategy::Lfu(s) => s.read(value),
            Strategy::Fifo(s) => s.read(value),
            Strategy::Noop(s) => s.read(value),
        }
    }

    fn remove(&mut self, value: &V) -> Result<bool, MemoError> {
        match self {
            Strategy::Lru(s) => s.remove(value),
            Strategy::Lfu(s) => s.remove(value),
            Strategy::Fifo(s) => s.remove(value),
            Strategy::Noop(s) => s.remove(value),
        }
    }

    fn take(&mut self) -> Result<Option<V>, MemoError> {
        match self {
            Strategy::Lru(s) => s.take(),
            Strategy::Lfu(s) => s.take(),
            Strategy::Fifo(s) => s.take(),
            Strategy::Noop(s) => s.take(),
        }
    }
}
