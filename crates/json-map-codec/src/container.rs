//! Map abstraction and map construction.

use std::collections::{btree_map, hash_map, BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

/// An associative container the map codec can fill and iterate.
pub trait MutableMap {
    type Key;
    type Value;
    type Entries<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    /// Inserts a pair, returning the value previously stored under an equal
    /// key.
    fn insert_entry(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    fn contains_key(&self, key: &Self::Key) -> bool;

    fn entries(&self) -> Self::Entries<'_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> MutableMap for HashMap<K, V, S> {
    type Key = K;
    type Value = V;
    type Entries<'a>
        = hash_map::Iter<'a, K, V>
    where
        Self: 'a;

    fn insert_entry(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K: Ord, V> MutableMap for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Entries<'a>
        = btree_map::Iter<'a, K, V>
    where
        Self: 'a;

    fn insert_entry(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> MutableMap for IndexMap<K, V, S> {
    type Key = K;
    type Value = V;
    type Entries<'a>
        = indexmap::map::Iter<'a, K, V>
    where
        Self: 'a;

    fn insert_entry(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        IndexMap::contains_key(self, key)
    }

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }
}

/// Supplies fresh, empty containers for decoding.
pub trait ObjectConstructor<T> {
    fn construct(&self) -> T;
}

/// Constructs containers with [`Default::default`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConstructor;

impl<T: Default> ObjectConstructor<T> for DefaultConstructor {
    fn construct(&self) -> T {
        T::default()
    }
}

impl<T, F: Fn() -> T> ObjectConstructor<T> for F {
    fn construct(&self) -> T {
        self()
    }
}
