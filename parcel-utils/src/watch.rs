use crate::ordered_map::{EntryId, OrderBy, OrderedHashMap};
use std::hash::Hash;

/// Compile-time opt-in to reorder notification.
///
/// A value type that participates declares an owning-entry slot as part of
/// its type. The container maintains the slot through
/// [`insert_watched`](OrderedHashMap::insert_watched) and
/// [`remove_watched`](OrderedHashMap::remove_watched); code that only holds
/// the value can then hand the owner back to
/// [`reorder`](OrderedHashMap::reorder) after mutating an ordering-relevant
/// field. There is no interception of field writes and the container never
/// rescans entries to detect staleness.
pub trait Watch {
    fn owner(&self) -> Option<EntryId>;
    fn set_owner(&mut self, owner: Option<EntryId>);
}

impl<K: Eq + Hash, V: Watch, S: OrderBy<K, V>> OrderedHashMap<K, V, S> {
    /// [`insert`](Self::insert), plus stamping the new entry's handle into
    /// the value. A pre-existing entry is returned unchanged, owner included.
    pub fn insert_watched(&mut self, key: K, value: V) -> EntryId {
        let before = self.len();
        let id = self.insert(key, value);
        if self.len() > before {
            self.value_mut(id).set_owner(Some(id));
        }
        id
    }

    /// [`remove`](Self::remove), plus clearing the removed value's owner.
    pub fn remove_watched<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (key, mut value) = self.remove(key)?;
        value.set_owner(None);
        Some((key, value))
    }
}
