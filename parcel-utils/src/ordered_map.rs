use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

/// Stable handle to an entry of an [`OrderedHashMap`].
///
/// Handles stay valid for as long as the entry remains in the map, across
/// rotations, rehashes and reorders. A handle of a removed entry must not be
/// used again; slots are recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u32);

impl EntryId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Selects the comparison key of an [`OrderedHashMap`] instantiation: either
/// the insertion key itself ([`ByKey`]) or the stored value ([`ByValue`]).
pub trait OrderBy<K, V> {
    fn cmp(a_key: &K, a_value: &V, b_key: &K, b_value: &V) -> Ordering;
}

/// Order entries by their insertion key (the default).
pub enum ByKey {}

impl<K: Ord, V> OrderBy<K, V> for ByKey {
    fn cmp(a_key: &K, _: &V, b_key: &K, _: &V) -> Ordering {
        a_key.cmp(b_key)
    }
}

/// Order entries by their value while keeping O(1) lookup by key.
pub enum ByValue {}

impl<K, V: Ord> OrderBy<K, V> for ByValue {
    fn cmp(_: &K, a_value: &V, _: &K, b_value: &V) -> Ordering {
        a_value.cmp(b_value)
    }
}

struct Slot<K, V> {
    key: K,
    value: V,
    bucket_next: Option<EntryId>,
    parent: Option<EntryId>,
    left: Option<EntryId>,
    right: Option<EntryId>,
    pred: Option<EntryId>,
    succ: Option<EntryId>,
    height: i32,
}

const INITIAL_BUCKETS: usize = 8;

/// A hash table fused with an AVL tree over the same entries.
///
/// Every entry is reachable both from a hash bucket (O(1) average lookup by
/// key) and from one position in a height-balanced search tree ordered by the
/// comparison key chosen via the `S` type parameter. The tree additionally
/// threads every entry into a predecessor/successor chain, so ordered
/// iteration and min/max peeks never descend the tree.
///
/// Entries live in an index-addressed arena; rotations and thread splicing
/// are plain index reassignments. Bucket count doubles whenever the load
/// factor reaches 0.75, immediately after the insertion that crossed it.
///
/// Keys are immutable once inserted. Values may be mutated in place; a
/// mutation that can change the entry's position under the comparison key
/// must go through [`update`](Self::update) or be followed by a
/// [`reorder`](Self::reorder) call.
pub struct OrderedHashMap<K, V, S = ByKey> {
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<u32>,
    buckets: Vec<Option<EntryId>>,
    len: usize,
    root: Option<EntryId>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    hasher: RandomState,
    _order: PhantomData<S>,
}

impl<K, V, S> Default for OrderedHashMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OrderedHashMap<K, V, S> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            buckets: vec![None; INITIAL_BUCKETS],
            len: 0,
            root: None,
            head: None,
            tail: None,
            hasher: RandomState::new(),
            _order: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.buckets = vec![None; INITIAL_BUCKETS];
        self.len = 0;
        self.root = None;
        self.head = None;
        self.tail = None;
    }

    fn slot(&self, id: EntryId) -> &Slot<K, V> {
        self.slots[id.idx()].as_ref().unwrap()
    }

    fn slot_mut(&mut self, id: EntryId) -> &mut Slot<K, V> {
        self.slots[id.idx()].as_mut().unwrap()
    }

    pub fn key(&self, id: EntryId) -> &K {
        &self.slot(id).key
    }

    pub fn value(&self, id: EntryId) -> &V {
        &self.slot(id).value
    }

    /// Mutable access to a value by handle. If the mutation can change the
    /// entry's position under the comparison key, follow it with
    /// [`reorder`](Self::reorder).
    pub fn value_mut(&mut self, id: EntryId) -> &mut V {
        &mut self.slot_mut(id).value
    }

    /// Entry holding the minimum comparison key, in O(1).
    pub fn first(&self) -> Option<EntryId> {
        self.head
    }

    /// Entry holding the maximum comparison key, in O(1).
    pub fn last(&self) -> Option<EntryId> {
        self.tail
    }

    pub fn predecessor(&self, id: EntryId) -> Option<EntryId> {
        self.slot(id).pred
    }

    pub fn successor(&self, id: EntryId) -> Option<EntryId> {
        self.slot(id).succ
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        self.head.map(|id| {
            let s = self.slot(id);
            (&s.key, &s.value)
        })
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        self.tail.map(|id| {
            let s = self.slot(id);
            (&s.key, &s.value)
        })
    }

    /// Walks the successor chain from the minimum to the maximum entry. The
    /// iterator is lazy and can be restarted by calling `iter` again.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            map: self,
            next: self.head,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Height of the internal tree (-1 when empty). Bounded by
    /// 1.44 * log2(n + 2) per the AVL balance property.
    pub fn tree_height(&self) -> i32 {
        self.height(self.root)
    }

    fn height(&self, id: Option<EntryId>) -> i32 {
        id.map_or(-1, |id| self.slot(id).height)
    }

    fn balance(&self, id: EntryId) -> i32 {
        let s = self.slot(id);
        self.height(s.left) - self.height(s.right)
    }

    fn update_height(&mut self, id: EntryId) {
        let (left, right) = {
            let s = self.slot(id);
            (s.left, s.right)
        };
        let h = self.height(left).max(self.height(right)) + 1;
        self.slot_mut(id).height = h;
    }

    fn set_left(&mut self, id: EntryId, child: Option<EntryId>) {
        self.slot_mut(id).left = child;
        if let Some(c) = child {
            self.slot_mut(c).parent = Some(id);
        }
        self.update_height(id);
    }

    fn set_right(&mut self, id: EntryId, child: Option<EntryId>) {
        self.slot_mut(id).right = child;
        if let Some(c) = child {
            self.slot_mut(c).parent = Some(id);
        }
        self.update_height(id);
    }

    fn replace_child(&mut self, parent: EntryId, current: EntryId, new: Option<EntryId>) {
        if self.slot(parent).left == Some(current) {
            self.set_left(parent, new);
        } else if self.slot(parent).right == Some(current) {
            self.set_right(parent, new);
        }
    }

    fn rotate_left(&mut self, id: EntryId) {
        let right = self.slot(id).right.unwrap();
        let right_left = self.slot(right).left;
        match self.slot(id).parent {
            Some(p) => self.replace_child(p, id, Some(right)),
            None => {
                self.root = Some(right);
                self.slot_mut(right).parent = None;
            }
        }
        self.set_left(right, Some(id));
        self.set_right(id, right_left);
    }

    fn rotate_right(&mut self, id: EntryId) {
        let left = self.slot(id).left.unwrap();
        let left_right = self.slot(left).right;
        match self.slot(id).parent {
            Some(p) => self.replace_child(p, id, Some(left)),
            None => {
                self.root = Some(left);
                self.slot_mut(left).parent = None;
            }
        }
        self.set_right(left, Some(id));
        self.set_left(id, left_right);
    }

    fn rebalance(&mut self, id: EntryId) {
        self.update_height(id);
        let balance = self.balance(id);
        if balance == -2 {
            let right = self.slot(id).right.unwrap();
            if self.balance(right) == 1 {
                self.rotate_right(right);
            }
            self.rotate_left(id);
        } else if balance == 2 {
            let left = self.slot(id).left.unwrap();
            if self.balance(left) == -1 {
                self.rotate_left(left);
            }
            self.rotate_right(id);
        }
    }

    fn rebalance_to_root(&mut self, from: Option<EntryId>) {
        let mut cur = from;
        while let Some(id) = cur {
            self.rebalance(id);
            cur = self.slot(id).parent;
        }
    }

    fn tree_predecessor(&self, id: EntryId) -> Option<EntryId> {
        if let Some(mut cur) = self.slot(id).left {
            while let Some(r) = self.slot(cur).right {
                cur = r;
            }
            Some(cur)
        } else {
            let mut cur = id;
            while let Some(p) = self.slot(cur).parent {
                if self.slot(p).left == Some(cur) {
                    cur = p;
                } else {
                    return Some(p);
                }
            }
            None
        }
    }

    fn tree_successor(&self, id: EntryId) -> Option<EntryId> {
        if let Some(mut cur) = self.slot(id).right {
            while let Some(l) = self.slot(cur).left {
                cur = l;
            }
            Some(cur)
        } else {
            let mut cur = id;
            while let Some(p) = self.slot(cur).parent {
                if self.slot(p).right == Some(cur) {
                    cur = p;
                } else {
                    return Some(p);
                }
            }
            None
        }
    }

    /// Splices a freshly placed tree node into the predecessor/successor
    /// chain, locating its in-order neighbors through the tree.
    fn thread_link(&mut self, id: EntryId) {
        let pred = self.tree_predecessor(id);
        let succ = self.tree_successor(id);
        {
            let s = self.slot_mut(id);
            s.pred = pred;
            s.succ = succ;
        }
        match pred {
            Some(p) => self.slot_mut(p).succ = Some(id),
            None => self.head = Some(id),
        }
        match succ {
            Some(n) => self.slot_mut(n).pred = Some(id),
            None => self.tail = Some(id),
        }
    }

    fn thread_unlink(&mut self, id: EntryId) {
        let (pred, succ) = {
            let s = self.slot(id);
            (s.pred, s.succ)
        };
        match pred {
            Some(p) => self.slot_mut(p).succ = succ,
            None => self.head = succ,
        }
        match succ {
            Some(n) => self.slot_mut(n).pred = pred,
            None => self.tail = pred,
        }
        let s = self.slot_mut(id);
        s.pred = None;
        s.succ = None;
    }

    /// Removes `id` from the tree and the chain only; bucket linkage and the
    /// arena slot are untouched, so the entry can be reinserted.
    fn tree_remove(&mut self, id: EntryId) {
        let succ = self.slot(id).succ;
        self.thread_unlink(id);

        let (parent, left, right) = {
            let s = self.slot(id);
            (s.parent, s.left, s.right)
        };

        if left.is_some() && right.is_some() {
            // Two children: splice the in-order successor in structurally.
            let s = succ.unwrap();
            let s_parent = self.slot(s).parent;
            let rebalance_from = if s_parent == Some(id) {
                // Successor is the right child itself.
                self.set_left(s, left);
                Some(s)
            } else {
                let sp = s_parent.unwrap();
                let s_right = self.slot(s).right;
                self.replace_child(sp, s, s_right);
                self.set_right(s, right);
                self.set_left(s, left);
                Some(sp)
            };
            match parent {
                Some(p) => self.replace_child(p, id, Some(s)),
                None => {
                    self.root = Some(s);
                    self.slot_mut(s).parent = None;
                }
            }
            self.rebalance_to_root(rebalance_from);
        } else {
            let child = left.or(right);
            match parent {
                Some(p) => self.replace_child(p, id, child),
                None => {
                    self.root = child;
                    if let Some(c) = child {
                        self.slot_mut(c).parent = None;
                    }
                }
            }
            self.rebalance_to_root(parent);
        }

        let s = self.slot_mut(id);
        s.parent = None;
        s.left = None;
        s.right = None;
        s.height = 0;
    }

    fn bucket_index<Q: Hash + ?Sized>(&self, key: &Q, capacity: usize) -> usize {
        (self.hasher.hash_one(key) as usize) & (capacity - 1)
    }
}

impl<K: Eq + Hash, V, S: OrderBy<K, V>> OrderedHashMap<K, V, S> {
    fn less(&self, a: EntryId, b: EntryId) -> bool {
        let sa = self.slot(a);
        let sb = self.slot(b);
        S::cmp(&sa.key, &sa.value, &sb.key, &sb.value) == Ordering::Less
    }

    fn find<Q>(&self, key: &Q) -> Option<EntryId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut cur = self.buckets[self.bucket_index(key, self.buckets.len())];
        while let Some(id) = cur {
            let s = self.slot(id);
            if s.key.borrow() == key {
                return Some(id);
            }
            cur = s.bucket_next;
        }
        None
    }

    /// Handle of the entry holding `key`, if any.
    pub fn entry<Q>(&self, key: &Q) -> Option<EntryId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key)
    }

    /// O(1) average lookup through the hash buckets; the tree is not touched.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|id| &self.slot(id).value)
    }

    /// See [`value_mut`](Self::value_mut) for the reorder contract.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.slot_mut(id).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a new entry and returns its handle. If the key is already
    /// present the existing entry is returned unchanged; overwriting is the
    /// caller's explicit decision via [`value_mut`](Self::value_mut).
    pub fn insert(&mut self, key: K, value: V) -> EntryId {
        if let Some(id) = self.find(&key) {
            return id;
        }
        let bucket = self.bucket_index(&key, self.buckets.len());
        let id = self.alloc(key, value);
        let head = self.buckets[bucket];
        self.slot_mut(id).bucket_next = head;
        self.buckets[bucket] = Some(id);
        self.len += 1;
        self.grow_check();
        self.tree_insert(id);
        id
    }

    /// Removes the entry holding `key`. Absent keys are not an error; `None`
    /// keeps the map usable in probing code.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.find(key)?;
        let bucket = self.bucket_index(key, self.buckets.len());
        let mut cur = self.buckets[bucket];
        let mut prev: Option<EntryId> = None;
        while let Some(c) = cur {
            if c == id {
                break;
            }
            prev = Some(c);
            cur = self.slot(c).bucket_next;
        }
        let next = self.slot(id).bucket_next;
        match prev {
            Some(p) => self.slot_mut(p).bucket_next = next,
            None => self.buckets[bucket] = next,
        }
        self.tree_remove(id);
        self.len -= 1;
        let slot = self.slots[id.idx()].take().unwrap();
        self.free.push(id.0);
        Some((slot.key, slot.value))
    }

    /// Restores the ordering invariant after the value of `id` mutated in an
    /// order-relevant way. Checks only the two chain neighbors; the entry is
    /// structurally reinserted only when it is actually out of order, so a
    /// no-op mutation costs O(1) and a real move costs O(log n).
    pub fn reorder(&mut self, id: EntryId) {
        let (pred, succ) = {
            let s = self.slot(id);
            (s.pred, s.succ)
        };
        let out_of_order = pred.is_some_and(|p| self.less(id, p))
            || succ.is_some_and(|n| self.less(n, id));
        if out_of_order {
            self.tree_remove(id);
            self.tree_insert(id);
        }
    }

    /// Applies `f` to the value of `id` and then reorders the entry. This is
    /// the mutation-notification contract: any change to an ordering-relevant
    /// field goes through here (or through an explicit `reorder` call).
    pub fn update<R>(&mut self, id: EntryId, f: impl FnOnce(&mut V) -> R) -> R {
        let out = f(&mut self.slot_mut(id).value);
        self.reorder(id);
        out
    }

    fn alloc(&mut self, key: K, value: V) -> EntryId {
        let slot = Slot {
            key,
            value,
            bucket_next: None,
            parent: None,
            left: None,
            right: None,
            pred: None,
            succ: None,
            height: 0,
        };
        match self.free.pop() {
            Some(i) => {
                self.slots[i as usize] = Some(slot);
                EntryId(i)
            }
            None => {
                self.slots.push(Some(slot));
                EntryId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Doubles the bucket count once size / capacity reaches 0.75. One O(n)
    /// redistribution; key-to-entry mapping is preserved exactly.
    fn grow_check(&mut self) {
        if self.len * 4 < self.buckets.len() * 3 {
            return;
        }
        let new_capacity = self.buckets.len() * 2;
        let mut new_buckets: Vec<Option<EntryId>> = vec![None; new_capacity];
        for bucket in 0..self.buckets.len() {
            let mut cur = self.buckets[bucket];
            while let Some(id) = cur {
                let next = self.slot(id).bucket_next;
                let b = self.bucket_index(&self.slot(id).key, new_capacity);
                self.slot_mut(id).bucket_next = new_buckets[b];
                new_buckets[b] = Some(id);
                cur = next;
            }
        }
        self.buckets = new_buckets;
    }

    /// Standard BST descent (equal comparison keys descend right), then AVL
    /// rebalancing of every ancestor up to the root, then thread splicing.
    fn tree_insert(&mut self, id: EntryId) {
        {
            let s = self.slot_mut(id);
            s.parent = None;
            s.left = None;
            s.right = None;
            s.pred = None;
            s.succ = None;
            s.height = 0;
        }
        match self.root {
            None => self.root = Some(id),
            Some(mut cur) => loop {
                if self.less(id, cur) {
                    match self.slot(cur).left {
                        Some(l) => cur = l,
                        None => {
                            self.set_left(cur, Some(id));
                            break;
                        }
                    }
                } else {
                    match self.slot(cur).right {
                        Some(r) => cur = r,
                        None => {
                            self.set_right(cur, Some(id));
                            break;
                        }
                    }
                }
            },
        }
        let parent = self.slot(id).parent;
        self.rebalance_to_root(parent);
        self.thread_link(id);
    }
}

pub struct Iter<'a, K, V, S> {
    map: &'a OrderedHashMap<K, V, S>,
    next: Option<EntryId>,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let s = self.map.slot(id);
        self.next = s.succ;
        Some((&s.key, &s.value))
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
