use parcel_utils::{ByValue, EntryId, OrderedHashMap, Watch};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::BTreeMap;

#[test]
fn test_insert_lookup_remove() {
    let mut map: OrderedHashMap<u32, &str> = OrderedHashMap::new();
    assert!(map.is_empty());
    map.insert(3, "three");
    map.insert(1, "one");
    map.insert(2, "two");
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.get(&4), None);
    assert!(map.contains_key(&2));

    assert_eq!(map.remove(&2), Some((2, "two")));
    assert_eq!(map.get(&2), None);
    assert_eq!(map.remove(&2), None);
    assert_eq!(map.len(), 2);
}

#[test]
fn test_duplicate_insert_keeps_existing_value() {
    let mut map: OrderedHashMap<u32, u32> = OrderedHashMap::new();
    let first = map.insert(7, 100);
    let second = map.insert(7, 200);
    assert_eq!(first, second);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&7), Some(&100));

    // overwriting is the caller's explicit decision
    *map.value_mut(first) = 200;
    assert_eq!(map.get(&7), Some(&200));
}

#[test]
fn test_ordered_iteration() {
    let mut map: OrderedHashMap<i32, i32> = OrderedHashMap::new();
    for key in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
        map.insert(key, key * 10);
    }
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, (0..10).collect::<Vec<i32>>());

    // the iterator is restartable
    let again: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, again);
}

#[test]
fn test_min_max_track_removals() {
    let mut map: OrderedHashMap<u32, ()> = OrderedHashMap::new();
    for key in [10, 30, 20, 50, 40] {
        map.insert(key, ());
    }
    assert_eq!(map.min().map(|(k, _)| *k), Some(10));
    assert_eq!(map.max().map(|(k, _)| *k), Some(50));

    map.remove(&10);
    map.remove(&50);
    assert_eq!(map.min().map(|(k, _)| *k), Some(20));
    assert_eq!(map.max().map(|(k, _)| *k), Some(40));

    map.remove(&20);
    map.remove(&30);
    map.remove(&40);
    assert_eq!(map.min(), None);
    assert_eq!(map.max(), None);
}

#[test]
fn test_rehash_preserves_mapping() {
    // 1000 entries crosses the 0.75 load factor many times over
    let mut map: OrderedHashMap<u32, u32> = OrderedHashMap::new();
    for key in 0..1000 {
        map.insert(key, key + 1);
    }
    assert_eq!(map.len(), 1000);
    for key in 0..1000 {
        assert_eq!(map.get(&key), Some(&(key + 1)));
    }
}

fn avl_height_bound(n: usize) -> i32 {
    ((n as f64 + 2.0).log2() * 1.44).ceil() as i32
}

#[test]
fn test_height_stays_within_avl_bound() {
    let mut map: OrderedHashMap<u32, ()> = OrderedHashMap::new();
    for n in 0..2048u32 {
        // ascending insertion is the classic worst case for an unbalanced tree
        map.insert(n, ());
        assert!(map.tree_height() <= avl_height_bound(map.len()));
    }
}

#[test]
fn test_random_ops_match_reference() {
    let mut rng = SmallRng::seed_from_u64(0xC950);
    let mut map: OrderedHashMap<u32, u32> = OrderedHashMap::new();
    let mut reference: BTreeMap<u32, u32> = BTreeMap::new();

    for step in 0..4000 {
        let key = rng.gen_range(0..300);
        if rng.gen_bool(0.6) {
            let value = rng.gen();
            map.insert(key, value);
            reference.entry(key).or_insert(value);
        } else {
            assert_eq!(map.remove(&key).map(|(_, v)| v), reference.remove(&key));
        }

        if step % 200 == 0 {
            check_against_reference(&map, &reference);
        }
    }
    check_against_reference(&map, &reference);
}

fn check_against_reference(map: &OrderedHashMap<u32, u32>, reference: &BTreeMap<u32, u32>) {
    assert_eq!(map.len(), reference.len());
    let entries: Vec<(u32, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<(u32, u32)> = reference.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, expected);

    // in-order traversal is strictly ascending
    for pair in entries.windows(2) {
        assert!(pair[0].0 < pair[1].0);
    }

    assert_eq!(
        map.min().map(|(k, _)| *k),
        reference.keys().next().copied()
    );
    assert_eq!(
        map.max().map(|(k, _)| *k),
        reference.keys().next_back().copied()
    );
    assert!(map.tree_height() <= avl_height_bound(map.len()));
}

#[test]
fn test_ordered_by_value() {
    let mut map: OrderedHashMap<&str, u32, ByValue> = OrderedHashMap::new();
    map.insert("c", 30);
    map.insert("a", 10);
    map.insert("b", 20);

    let values: Vec<u32> = map.values().copied().collect();
    assert_eq!(values, vec![10, 20, 30]);
    // lookup stays keyed by the insertion key
    assert_eq!(map.get("c"), Some(&30));
}

#[test]
fn test_update_restores_order() {
    let mut map: OrderedHashMap<&str, u32, ByValue> = OrderedHashMap::new();
    let a = map.insert("a", 10);
    map.insert("b", 20);
    map.insert("c", 30);

    map.update(a, |v| *v = 25);
    let values: Vec<u32> = map.values().copied().collect();
    assert_eq!(values, vec![20, 25, 30]);
    assert_eq!(map.get("a"), Some(&25));

    // a mutation that does not cross a neighbor is a no-op reorder
    map.update(a, |v| *v = 24);
    let values: Vec<u32> = map.values().copied().collect();
    assert_eq!(values, vec![20, 24, 30]);
}

#[derive(Debug)]
struct Job {
    priority: u32,
    owner: Option<EntryId>,
}

impl Job {
    fn new(priority: u32) -> Self {
        Self {
            priority,
            owner: None,
        }
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority)
    }
}

impl Watch for Job {
    fn owner(&self) -> Option<EntryId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<EntryId>) {
        self.owner = owner;
    }
}

#[test]
fn test_watched_values_know_their_entry() {
    let mut map: OrderedHashMap<&str, Job, ByValue> = OrderedHashMap::new();
    let a = map.insert_watched("a", Job::new(3));
    let b = map.insert_watched("b", Job::new(1));
    assert_eq!(map.value(a).owner(), Some(a));
    assert_eq!(map.value(b).owner(), Some(b));

    // duplicate key: existing entry untouched, owner included
    let again = map.insert_watched("a", Job::new(99));
    assert_eq!(again, a);
    assert_eq!(map.value(a).priority, 3);

    // mutate through the owner handle, then notify
    let owner = map.value(b).owner().unwrap();
    map.value_mut(owner).priority = 10;
    map.reorder(owner);
    let order: Vec<u32> = map.values().map(|j| j.priority).collect();
    assert_eq!(order, vec![3, 10]);

    let (_, removed) = map.remove_watched("b").unwrap();
    assert_eq!(removed.owner(), None);
}

#[test]
fn test_reorder_restores_neighbor_invariant() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut map: OrderedHashMap<u32, u32, ByValue> = OrderedHashMap::new();
    let mut ids = Vec::new();
    for key in 0..50u32 {
        ids.push(map.insert(key, rng.gen_range(0..1000)));
    }
    for _ in 0..500 {
        let id = ids[rng.gen_range(0..ids.len())];
        map.update(id, |v| *v = rng.gen_range(0..1000));
        let values: Vec<u32> = map.values().copied().collect();
        for pair in values.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }
}
