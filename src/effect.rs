//! Side effects of a strategy operation.
//!
//! Every mutating strategy call returns an [`Effect`]: the values it removed
//! (evictions) and the values it started tracking. Nested operations compose
//! their effects with [`Effect::chain`], which never allocates when one side
//! is empty.
//!
//! ```
//! use memokit::effect::Effect;
//!
//! let eviction = Effect::with_removed(1);
//! let insertion = Effect::with_added(7);
//! let total = eviction.chain(insertion);
//!
//! assert_eq!(total.removed(), &[1]);
//! assert_eq!(total.added(), &[7]);
//! ```

/// Values removed and added by one operation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect<V> {
    removed: Vec<V>,
    added: Vec<V>,
}

impl<V> Effect<V> {
    /// An effect with nothing removed and nothing added.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            removed: Vec::new(),
            added: Vec::new(),
        }
    }

    #[inline]
    pub fn with_added(value: V) -> Self {
        Self {
            removed: Vec::new(),
            added: vec![value],
        }
    }

    #[inline]
    pub fn with_removed(value: V) -> Self {
        Self {
            removed: vec![value],
            added: Vec::new(),
        }
    }

    /// Concatenates `self` then `other`.
    pub fn chain(mut self, mut other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        self.removed.append(&mut other.removed);
        self.added.append(&mut other.added);
        self
    }

    #[inline]
    pub fn removed(&self) -> &[V] {
        &self.removed
    }

    #[inline]
    pub fn added(&self) -> &[V] {
        &self.added
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Splits into `(removed, added)`.
    #[inline]
    pub fn into_parts(self) -> (Vec<V>, Vec<V>) {
        (self.removed, self.added)
    }
}

impl<V> Default for Effect<V> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_nothing() {
        let effect: Effect<u8> = Effect::empty();
        assert!(effect.is_empty());
        assert!(effect.removed().is_empty());
        assert!(effect.added().is_empty());
        assert_eq!(effect, Effect::default());
    }

    #[test]
    fn chain_keeps_order_per_side() {
        let a = Effect::with_removed(1).chain(Effect::with_added(2));
        let b = Effect::with_removed(3).chain(Effect::with_added(4));
        let (removed, added) = a.chain(b).into_parts();
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(added, vec![2, 4]);
    }

    #[test]
    fn chain_with_empty_is_identity() {
        let effect = Effect::with_added("x");
        assert_eq!(effect.clone().chain(Effect::empty()), effect);
        assert_eq!(Effect::empty().chain(effect.clone()), effect);
    }
}
