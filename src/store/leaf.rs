//! Leaf storage: cached values for one argument prefix.
//!
//! Pairs a [`Table`] of last-argument → value with a strategy over the keys.
//! The strategy decides which entry leaves when the storage is over its own
//! limit, or when the global entry budget picks this storage as the victim.

use std::hash::Hash;

use crate::error::{InvariantError, MemoError};
use crate::policy::Strategy;
use crate::store::table::Table;
use crate::traits::CacheStrategy;

#[derive(Debug)]
pub struct LeafStorage<K, V> {
    table: Table<K, V>,
    strategy: Strategy<K>,
}

impl<K, V> LeafStorage<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(strategy: Strategy<K>) -> Self {
        Self {
            table: Table::new(),
            strategy,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Records an access to a stored entry.
    pub fn touch(&mut self, key: &K) -> Result<(), MemoError> {
        if self.strategy.has(key) {
            self.strategy.read(key)?;
        }
        Ok(())
    }

    /// `true` if one more entry would exceed this storage's own limit.
    pub fn will_be_full(&self) -> bool {
        self.strategy.will_be_full()
    }

    /// Makes room for one entry under this storage's own limit.
    pub fn reserve(&mut self) -> Result<Vec<(K, V)>, MemoError> {
        let effect = self.strategy.reserve_place()?;
        self.collect_removed(effect.removed())
    }

    /// Stores a new entry and returns any entries its strategy evicted.
    pub fn insert(&mut self, key: K, value: V) -> Result<Vec<(K, V)>, MemoError> {
        let effect = self.strategy.write(key.clone())?;
        let evicted = self.collect_removed(effect.removed())?;
        self.table.insert(key, value);
        Ok(evicted)
    }

    /// Evicts this storage's next victim.
    pub fn evict_one(&mut self) -> Result<Option<(K, V)>, MemoError> {
        let Some(key) = self.strategy.take()? else {
            return Ok(None);
        };
        let value = self
            .table
            .remove(&key)
            .ok_or_else(|| InvariantError::new("evicted key has no stored value"))?;
        Ok(Some((key, value)))
    }

    pub fn remove(&mut self, key: &K) -> Result<Option<V>, MemoError> {
        self.strategy.remove(key)?;
        Ok(self.table.remove(key))
    }

    /// Empties the storage, returning every entry.
    pub fn drain(&mut self) -> Result<Vec<(K, V)>, MemoError> {
        self.strategy.clear()?;
        Ok(self.table.drain())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|(key, _)| key)
    }

    fn collect_removed(&mut self, keys: &[K]) -> Result<Vec<(K, V)>, MemoError> {
        keys.iter()
            .map(|key| {
                self.table
                    .remove(key)
                    .map(|value| (key.clone(), value))
                    .ok_or_else(|| {
                        MemoError::from(InvariantError::new("evicted key has no stored value"))
                    })
            })
            .collect()
    }
}
