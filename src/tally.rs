// src/tally.rs
use std::collections::HashMap;
use std::hash::Hash;

/// Values that combine with an associative, commutative operation.
///
/// Partial results from independent chunks are folded with this, so the
/// final value does not depend on how the input was split or on the order
/// workers finish in.
pub trait Merge: Sized {
    fn merge(self, other: Self) -> Self;
}

impl Merge for u64 {
    fn merge(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

/// A map of keys to mergeable values. `Tally<K, u64>` is a plain counter;
/// `Tally<K, Tally<L, u64>>` is a counter of counters. Both merge with the
/// same rule: union of keys, values present on both sides merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<K: Eq + Hash, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash, V> Default for Tally<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Tally<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K: Eq + Hash, V: Merge + Default> Tally<K, V> {
    /// Merge `value` into the entry for `key`.
    pub fn add(&mut self, key: K, value: V) {
        let slot = self.entries.entry(key).or_default();
        *slot = std::mem::take(slot).merge(value);
    }
}

impl<K: Eq + Hash> Tally<K, u64> {
    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.values().copied().fold(0, u64::merge)
    }
}

impl<K: Eq + Hash, V: Merge + Default> Merge for Tally<K, V> {
    fn merge(self, other: Self) -> Self {
        let (mut into, from) = if self.entries.len() >= other.entries.len() {
            (self, other)
        } else {
            (other, self)
        };
        for (key, value) in from.entries {
            into.add(key, value);
        }
        into
    }
}

impl<K: Eq + Hash, V: Merge + Default> FromIterator<(K, V)> for Tally<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (key, value) in iter {
            tally.add(key, value);
        }
        tally
    }
}
