//! # Strategy contract
//!
//! Every replacement policy in [`policy`](crate::policy) implements
//! [`CacheStrategy`]: it tracks up to [`Capacity`] distinct values and decides
//! which one leaves next. Strategies hold values only; the storage that owns
//! the matching data reacts to the [`Effect`] each call returns.
//!
//! ## Operation summary
//!
//! ```text
//!   write(v)   track v or touch it; may evict one victim first
//!   read(&v)   touch an already tracked v (policy decides if reads count)
//!   remove(&v) stop tracking v
//!   take()     remove and return the next victim
//!   peek()     the next victim, untouched
//!   clear()    take until empty
//! ```
//!
//! ## Capacity semantics
//!
//! A bounded strategy of capacity `N` holds up to `N` values. The write that
//! would hold `N + 1` first evicts exactly one victim through
//! [`CacheStrategy::reserve_place`]; no write ever evicts more than one.
//!
//! ```
//! use memokit::policy::LruStrategy;
//! use memokit::traits::CacheStrategy;
//!
//! let mut lru = LruStrategy::new(2);
//! lru.write(1).unwrap();
//! lru.write(2).unwrap();
//! assert!(lru.is_full());
//!
//! let effect = lru.write(3).unwrap();
//! assert_eq!(effect.removed(), &[1]);
//! assert_eq!(effect.added(), &[3]);
//! ```

use std::num::NonZeroUsize;

use crate::effect::Effect;
use crate::error::{ConfigError, MemoError};

/// Upper bound on how many values a strategy tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    Bounded(NonZeroUsize),
    Unbounded,
}

impl Capacity {
    /// Bounded capacity; zero is rejected.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Capacity::Bounded)
            .ok_or_else(|| ConfigError::new("cache capacity must be greater than zero"))
    }

    /// Returns the bound, or `None` when unbounded.
    #[inline]
    pub fn get(self) -> Option<usize> {
        match self {
            Capacity::Bounded(n) => Some(n.get()),
            Capacity::Unbounded => None,
        }
    }

    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Capacity::Unbounded)
    }

    /// `true` once `len` values fill the bound.
    #[inline]
    pub fn is_full(self, len: usize) -> bool {
        match self {
            Capacity::Bounded(n) => len >= n.get(),
            Capacity::Unbounded => false,
        }
    }

    /// `true` if one more value would exceed the bound.
    #[inline]
    pub fn will_be_full(self, len: usize) -> bool {
        match self {
            Capacity::Bounded(n) => len.saturating_add(1) > n.get(),
            Capacity::Unbounded => false,
        }
    }
}

impl From<NonZeroUsize> for Capacity {
    fn from(value: NonZeroUsize) -> Self {
        Capacity::Bounded(value)
    }
}

/// Replacement policy over a bounded set of distinct values.
///
/// Mutators return [`MemoError::Invariant`] if the backing collections turn
/// out inconsistent; that never happens in correct use and the operation is
/// abandoned when it does.
pub trait CacheStrategy<V> {
    /// Number of tracked values.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> Capacity;

    fn is_full(&self) -> bool {
        self.capacity().is_full(self.len())
    }

    fn will_be_full(&self) -> bool {
        self.capacity().will_be_full(self.len())
    }

    fn has(&self, value: &V) -> bool;

    /// The value [`take`](Self::take) would return.
    fn peek(&self) -> Option<&V>;

    /// Tracks `value`, or touches it if already tracked.
    ///
    /// Writing a tracked value never changes [`len`](Self::len).
    fn write(&mut self, value: V) -> Result<Effect<V>, MemoError>;

    /// Records an access to a tracked value.
    ///
    /// # Errors
    ///
    /// [`MemoError::NotTracked`] if `value` is not tracked.
    fn read(&mut self, value: &V) -> Result<Effect<V>, MemoError>;

    /// Stops tracking `value`. Returns `false` if it was not tracked.
    fn remove(&mut self, value: &V) -> Result<bool, MemoError>;

    /// Removes and returns the next victim.
    fn take(&mut self) -> Result<Option<V>, MemoError>;

    /// Takes every value in eviction order.
    fn clear(&mut self) -> Result<Vec<V>, MemoError> {
        let mut taken = Vec::with_capacity(self.len());
        while let Some(value) = self.take()? {
            taken.push(value);
        }
        Ok(taken)
    }

    /// Evicts one victim if the next new value would not fit.
    fn reserve_place(&mut self) -> Result<Effect<V>, MemoError> {
        if !self.will_be_full() {
            return Ok(Effect::empty());
        }
        Ok(match self.take()? {
            Some(victim) => Effect::with_removed(victim),
            None => Effect::empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_rejected() {
        assert!(Capacity::try_new(0).is_err());
        assert_eq!(Capacity::try_new(3).unwrap().get(), Some(3));
    }

    #[test]
    fn bounded_fullness() {
        let cap = Capacity::try_new(2).unwrap();
        assert!(!cap.is_full(1));
        assert!(cap.will_be_full(2));
        assert!(!cap.will_be_full(1));
        assert!(cap.is_full(2));
    }

    #[test]
    fn unbounded_never_full() {
        assert!(!Capacity::Unbounded.is_full(usize::MAX));
        assert!(!Capacity::Unbounded.will_be_full(usize::MAX));
        assert!(Capacity::Unbounded.is_unbounded());
        assert_eq!(Capacity::Unbounded.get(), None);
    }
}
