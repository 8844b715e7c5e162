use crate::ordered_map::{EntryId, OrderedHashMap};
use anyhow::{anyhow, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fractional position key of a [`Sequence`] element.
///
/// The first element of a sequence sits at key 0.0 and the logical end at
/// [`SeqKey::END`]. Inserting between two adjacent elements takes the
/// midpoint of their keys, so a mid-sequence insert is O(log n) and never
/// renumbers the rest of the sequence.
#[derive(Debug, Clone, Copy)]
pub struct SeqKey(pub f64);

impl SeqKey {
    pub const START: SeqKey = SeqKey(0.0);

    /// Reserved sentinel marking the logical end of a sequence. Elements
    /// appended past the end take keys between this and `f64::MAX`.
    pub const END: SeqKey = SeqKey(f64::MAX / 2.0);

    /// Key strictly between `a` and `b`. Fails once repeated bisection has
    /// exhausted the precision between the two, instead of silently
    /// collapsing onto an endpoint; at delivery-route lengths (tens of
    /// elements) this is unreachable.
    pub fn between(a: SeqKey, b: SeqKey) -> Result<SeqKey> {
        let mid = a.0 / 2.0 + b.0 / 2.0;
        if !(a.0 < mid && mid < b.0) {
            return Err(anyhow!(
                "fractional key space exhausted between {} and {}",
                a.0,
                b.0
            ));
        }
        Ok(SeqKey(mid))
    }
}

impl PartialEq for SeqKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SeqKey {}

impl PartialOrd for SeqKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeqKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for SeqKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for SeqKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered sequence built on [`OrderedHashMap`] with fractional keys.
///
/// During construction elements can be inserted at any position in O(log n).
/// [`into_ordered`](Self::into_ordered) re-keys the result to dense integer
/// positions (vector indices 0..n-1), after which it is immutable.
pub struct Sequence<V> {
    map: OrderedHashMap<SeqKey, V>,
}

impl<V> Default for Sequence<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Sequence<V> {
    pub fn new() -> Self {
        Self {
            map: OrderedHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Places `value` at key 0.0, the permanent head of the sequence.
    pub fn set_start(&mut self, value: V) -> EntryId {
        self.map.insert(SeqKey::START, value)
    }

    /// Places `value` at the end sentinel key.
    pub fn set_end(&mut self, value: V) -> EntryId {
        self.map.insert(SeqKey::END, value)
    }

    pub fn first(&self) -> Option<EntryId> {
        self.map.first()
    }

    pub fn last(&self) -> Option<EntryId> {
        self.map.last()
    }

    pub fn prev(&self, id: EntryId) -> Option<EntryId> {
        self.map.predecessor(id)
    }

    pub fn next(&self, id: EntryId) -> Option<EntryId> {
        self.map.successor(id)
    }

    pub fn key(&self, id: EntryId) -> SeqKey {
        *self.map.key(id)
    }

    pub fn value(&self, id: EntryId) -> &V {
        self.map.value(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }

    /// Inserts `value` between two elements, at the midpoint of their keys.
    pub fn insert_between(&mut self, prev: EntryId, next: EntryId, value: V) -> Result<EntryId> {
        let key = SeqKey::between(self.key(prev), self.key(next))?;
        Ok(self.map.insert(key, value))
    }

    /// Appends `value` after the current tail, at a key between the tail's
    /// key and `f64::MAX`. Used when the logical end of the sequence is
    /// itself open for insertion after it.
    pub fn append(&mut self, value: V) -> Result<EntryId> {
        let last = self
            .last()
            .ok_or_else(|| anyhow!("cannot append to an empty sequence"))?;
        let key = SeqKey::between(self.key(last), SeqKey(f64::MAX))?;
        Ok(self.map.insert(key, value))
    }

    /// Finalizes the sequence into dense positions 0..n-1, ascending by
    /// fractional key.
    pub fn into_ordered(self) -> Vec<V> {
        let mut map = self.map;
        let mut out = Vec::with_capacity(map.len());
        while let Some(id) = map.first() {
            let key = *map.key(id);
            let (_, value) = map.remove(&key).unwrap();
            out.push(value);
        }
        out
    }
}
