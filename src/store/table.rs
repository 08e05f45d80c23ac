//! Hash-map table backend.
//!
//! The key → value container inside every storage. Nested storages map an
//! argument to a child [`StorageId`](crate::store::StorageId); leaf storages
//! map the last argument to the cached value. Eviction order lives elsewhere
//! (in the storage's strategy), so the table is a plain associative map.
//!
//! ## Example Usage
//! ```
//! use memokit::store::table::Table;
//!
//! let mut table: Table<&str, u32> = Table::new();
//! assert_eq!(table.insert("a", 1), None);
//! assert_eq!(table.get(&"a"), Some(&1));
//! assert_eq!(table.remove(&"a"), Some(1));
//! assert!(table.is_empty());
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Table<K, V> {
    map: FxHashMap<K, V>,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts and returns the previous value for `key`.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.map.iter()
    }

    /// Removes and returns every entry.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        self.map.drain().collect()
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
