//! Per-domain accumulators fed by the aggregation pass.
//!
//! Each accumulator owns its state, is updated one record fragment at a time
//! and is finalised exactly once into sorted, rounded report rows.

pub mod chat;
pub mod data_quality;
pub mod engagement;
pub mod feature_adoption;
pub mod ide;
pub mod impact;
pub mod language;
pub mod model_usage;
pub mod stats;
pub mod users;

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

// ── InsertionMap ──────────────────────────────────────────────────────────────

/// Hash map that remembers the order keys were first inserted in.
///
/// Iteration follows first-insertion order, which is what every "ties go to
/// the first one seen" rule downstream relies on.
#[derive(Debug, Clone)]
pub struct InsertionMap<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for InsertionMap<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> InsertionMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the value under `key`, creating it with `init` on
    /// first sight.
    pub fn get_or_insert_with<Q>(&mut self, key: &Q, init: impl FnOnce() -> V) -> &mut V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                let owned = key.to_owned();
                self.index.insert(owned.clone(), idx);
                self.entries.push((owned, init()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First entry holding the strictly greatest score, in iteration order.
pub(crate) fn first_max<'a, T: 'a, S: PartialOrd + Copy>(
    items: impl IntoIterator<Item = &'a T>,
    score: impl Fn(&T) -> S,
) -> Option<&'a T> {
    let mut best: Option<(&T, S)> = None;
    for item in items {
        let s = score(item);
        let replace = match best {
            Some((_, current)) => s > current,
            None => true,
        };
        if replace {
            best = Some((item, s));
        }
    }
    best.map(|(item, _)| item)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
