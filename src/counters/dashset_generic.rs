use super::KeySetCore;
use dashmap::DashSet;
use std::hash::BuildHasher;

// Generic DashSet-based key set that accepts any hasher.
// Locking is per shard, so contention grows slower than the worker count.
pub struct GenericDashSet<H: BuildHasher + Clone> {
    keys: DashSet<u32, H>,
}

impl<H: BuildHasher + Clone + Default + Send + Sync> KeySetCore for GenericDashSet<H> {
    fn new() -> Self {
        GenericDashSet {
            keys: DashSet::with_hasher(H::default()),
        }
    }

    fn insert(&self, key: u32) {
        self.keys.insert(key);
    }

    fn contains(&self, key: u32) -> bool {
        self.keys.contains(&key)
    }

    fn cardinality(&self) -> usize {
        self.keys.len()
    }
}
