//! Strategy wrapper that remembers what it let go.
//!
//! A storage pool needs to tear down every storage its strategy drops,
//! whether the drop was an explicit `remove`, a `take`, or an eviction hidden
//! inside a `write`. [`Destroyable`] records each of those values in a pending
//! list; the owner drains it after the call and destroys each value.
//!
//! ```
//! use memokit::policy::{Destroyable, LruStrategy};
//! use memokit::traits::CacheStrategy;
//!
//! let mut pool = Destroyable::new(LruStrategy::new(1));
//! pool.write(1).unwrap();
//! pool.write(2).unwrap();
//!
//! assert_eq!(pool.drain_destroyed(), vec![1]);
//! assert!(pool.drain_destroyed().is_empty());
//! ```

use crate::effect::Effect;
use crate::error::MemoError;
use crate::traits::{CacheStrategy, Capacity};

#[derive(Debug)]
pub struct Destroyable<S, V> {
    inner: S,
    pending: Vec<V>,
}

impl<S, V> Destroyable<S, V>
where
    S: CacheStrategy<V>,
    V: Clone,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Values dropped since the last drain, in drop order.
    pub fn drain_destroyed(&mut self) -> Vec<V> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Removes `value` without recording it for destruction.
    pub fn detach(&mut self, value: &V) -> Result<bool, MemoError> {
        self.inner.remove(value)
    }

    fn record(&mut self, effect: &Effect<V>) {
        self.pending.extend(effect.removed().iter().cloned());
    }
}

impl<S, V> CacheStrategy<V> for Destroyable<S, V>
where
    S: CacheStrategy<V>,
    V: Clone,
{
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn capacity(&self) -> Capacity {
        self.inner.capacity()
    }

    fn has(&self, value: &V) -> bool {
        self.inner.has(value)
    }

    fn peek(&self) -> Option<&V> {
        self.inner.peek()
    }

    fn write(&mut self, value: V) -> Result<Effect<V>, MemoError> {
        let effect = self.inner.write(value)?;
        self.record(&effect);
        Ok(effect)
    }

    fn read(&mut self, value: &V) -> Result<Effect<V>, MemoError> {
        let effect = self.inner.read(value)?;
        self.record(&effect);
        Ok(effect)
    }

    fn remove(&mut self, value: &V) -> Result<bool, MemoError> {
        let removed = self.inner.remove(value)?;
        if removed {
            self.pending.push(value.clone());
        }
        Ok(removed)
    }

    fn take(&mut self) -> Result<Option<V>, MemoError> {
        let taken = self.inner.take()?;
        if let Some(value) = &taken {
            self.pending.push(value.clone());
        }
        Ok(taken)
    }
}
