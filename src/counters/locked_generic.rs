use super::KeySetCore;
use std::collections::HashSet;
use std::hash::BuildHasher;
use std::sync::{Mutex, MutexGuard, PoisonError};

// Generic HashSet behind one coarse lock. Every insert serializes on the
// same mutex; kept as the baseline the sharded set is measured against.
pub struct GenericLockedSet<H: BuildHasher + Default> {
    keys: Mutex<HashSet<u32, H>>,
}

impl<H: BuildHasher + Default> GenericLockedSet<H> {
    fn keys(&self) -> MutexGuard<'_, HashSet<u32, H>> {
        // A panicking inserter cannot leave the set half-written.
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the approximate heap memory used by the HashSet in bytes.
    pub fn heap_size_bytes(&self) -> usize {
        self.keys().capacity() * std::mem::size_of::<u32>()
    }
}

impl<H: BuildHasher + Default + Send + Sync> KeySetCore for GenericLockedSet<H> {
    fn new() -> Self {
        GenericLockedSet {
            keys: Mutex::new(HashSet::with_hasher(H::default())),
        }
    }

    fn insert(&self, key: u32) {
        self.keys().insert(key);
    }

    fn contains(&self, key: u32) -> bool {
        self.keys().contains(&key)
    }

    fn cardinality(&self) -> usize {
        self.keys().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxBuildHasher;

    #[test]
    fn grows_with_distinct_keys_only() {
        let set = GenericLockedSet::<FxBuildHasher>::new();
        assert_eq!(set.heap_size_bytes(), 0);
        for key in [7u32, 7, 7, 9] {
            set.insert(key);
        }
        assert_eq!(set.cardinality(), 2);
        assert!(set.heap_size_bytes() >= 2 * std::mem::size_of::<u32>());
    }
}
