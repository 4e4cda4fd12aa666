use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod bitset;
pub mod dashset_generic;
pub mod locked_generic;

pub use bitset::DenseBitSet;
pub use dashset_generic::GenericDashSet;
pub use locked_generic::GenericLockedSet;

// Re-export hashers for convenience
pub use ahash::RandomState as AHashBuilder;
pub use rustc_hash::FxBuildHasher;
pub use std::collections::hash_map::RandomState as DefaultHasher;

use crate::memory::get_memory_usage_bytes;

// Core trait for distinct-key set implementations (without memory tracking).
// Inserts may race from every worker; cardinality is only meaningful once
// all inserts have finished.
pub trait KeySetCore: Send + Sync {
    fn new() -> Self
    where
        Self: Sized;

    fn insert(&self, key: u32);
    fn contains(&self, key: u32) -> bool;
    fn cardinality(&self) -> usize;
}

// Unified wrapper that adds memory tracking to any set implementation
pub struct MemoryTrackedSet<S: KeySetCore> {
    inner: S,
    peak_memory: Arc<AtomicU64>,
}

impl<S: KeySetCore> MemoryTrackedSet<S> {
    pub fn new() -> Self {
        let set = MemoryTrackedSet {
            inner: S::new(),
            peak_memory: Arc::new(AtomicU64::new(0)),
        };
        set.update_peak_memory();
        set
    }

    fn update_peak_memory(&self) {
        if let Some(current_mem) = get_memory_usage_bytes() {
            self.peak_memory.fetch_max(current_mem, Ordering::Relaxed);
        }
    }

    /// Get reference to the inner set for accessing type-specific methods
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn peak_memory_bytes(&self) -> Option<u64> {
        let peak = self.peak_memory.load(Ordering::Relaxed);
        if peak > 0 {
            Some(peak)
        } else {
            None
        }
    }
}

impl<S: KeySetCore> Default for MemoryTrackedSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

// Unified public trait the scan pipeline works against
pub trait KeySet: Send + Sync {
    fn insert(&self, key: u32);
    fn contains(&self, key: u32) -> bool;
    fn cardinality(&self) -> usize;
    fn update_peak_memory(&self);
    fn peak_memory_bytes(&self) -> Option<u64>;
}

impl<S: KeySetCore> KeySet for MemoryTrackedSet<S> {
    #[inline]
    fn insert(&self, key: u32) {
        self.inner.insert(key);
    }

    fn contains(&self, key: u32) -> bool {
        self.inner.contains(key)
    }

    fn cardinality(&self) -> usize {
        self.inner.cardinality()
    }

    fn update_peak_memory(&self) {
        self.update_peak_memory();
    }

    fn peak_memory_bytes(&self) -> Option<u64> {
        self.peak_memory_bytes()
    }
}

pub type DashFxSet = GenericDashSet<FxBuildHasher>;
pub type DashAHashSet = GenericDashSet<AHashBuilder>;
pub type DashSipSet = GenericDashSet<DefaultHasher>;
pub type LockedFxSet = GenericLockedSet<FxBuildHasher>;
pub type LockedAHashSet = GenericLockedSet<AHashBuilder>;
pub type LockedSipSet = GenericLockedSet<DefaultHasher>;
