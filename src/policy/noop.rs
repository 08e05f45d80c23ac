//! Strategy that tracks nothing.
//!
//! Stands in for a pool whose limit is unbounded: nothing is ever evicted, so
//! there is no order worth maintaining.

use std::fmt;
use std::marker::PhantomData;

use crate::effect::Effect;
use crate::error::MemoError;
use crate::traits::{CacheStrategy, Capacity};

pub struct NoopStrategy<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> NoopStrategy<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for NoopStrategy<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for NoopStrategy<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoopStrategy")
    }
}

impl<V> CacheStrategy<V> for NoopStrategy<V> {
    fn len(&self) -> usize {
        0
    }

    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn has(&self, _value: &V) -> bool {
        false
    }

    fn peek(&self) -> Option<&V> {
        None
    }

    fn write(&mut self, _value: V) -> Result<Effect<V>, MemoError> {
        Ok(Effect::empty())
    }

    fn read(&mut self, _value: &V) -> Result<Effect<V>, MemoError> {
        Ok(Effect::empty())
    }

    fn remove(&mut self, _value: &V) -> Result<bool, MemoError> {
        Ok(false)
    }

    fn take(&mut self) -> Result<Option<V>, MemoError> {
        Ok(None)
    }
}
