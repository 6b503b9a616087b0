//! A thin wrapper around `BTreeMap` standing in for the "ordered index" component the
//! original spec treats as an external collaborator (a black-box ordered multi-set with
//! a pluggable comparator, predecessor/successor, insert, remove and find). `BTreeMap`
//! already provides every one of those operations natively through `range`, so no
//! separate predecessor/successor plumbing is needed (contrast with the C source's
//! `skiplist_pred`/`skiplist_node_next` dance in `facts_cursor_init`).

use std::collections::BTreeMap;
use std::ops::Bound;
use std::rc::Rc;

use crate::fact::Fact;

/// One sorted index over `Fact`s, keyed by `K` (one of `SpoKey`/`PosKey`/`OspKey`).
///
/// `K`'s `Ord` implementation *is* the comparator; see `fact.rs`.
pub struct Index<K: Ord> {
    map: BTreeMap<K, Rc<Fact>>,
}

impl<K: Ord> Index<K> {
    pub fn new() -> Index<K> {
        Index { map: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert `fact` under `key`. The original spec's indices never hold two Facts under
    /// an equal key (the Store checks for an existing Fact before inserting), so any
    /// prior value at `key` is simply replaced.
    pub fn insert(&mut self, key: K, fact: Rc<Fact>) {
        self.map.insert(key, fact);
    }

    /// Remove and return the Fact stored at `key`, if any.
    pub fn remove(&mut self, key: &K) -> Option<Rc<Fact>> {
        self.map.remove(key)
    }

    /// Look up the Fact stored at `key` without removing it.
    pub fn get(&self, key: &K) -> Option<&Rc<Fact>> {
        self.map.get(key)
    }

    /// Iterate, in index order, over every Fact whose key falls in `[lo, hi]`.
    pub fn range<'a>(&'a self, lo: Bound<K>, hi: Bound<K>) -> impl Iterator<Item = Rc<Fact>> + 'a
    where
        K: 'a,
    {
        self.map.range((lo, hi)).map(|(_, fact)| fact.clone())
    }
}
