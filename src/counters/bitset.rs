use super::KeySetCore;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Bits in the full IPv4 key space.
pub const KEY_SPACE_BITS: u64 = 1 << 32;
const WORD_BITS: u64 = u32::BITS as u64;
const WORDS: usize = (KEY_SPACE_BITS / WORD_BITS) as usize;

// Dense bitset over the whole u32 key space: 2^27 words, 512 MiB.
// Each insert is a single lock-free fetch_or on the word holding the key,
// so concurrent inserts never lose updates and only contend per word.
pub struct DenseBitSet {
    words: Box<[AtomicU32]>,
}

impl DenseBitSet {
    #[inline]
    fn locate(key: u32) -> (usize, u32) {
        ((key >> 5) as usize, 1u32 << (key & 31))
    }

    pub fn heap_size_bytes(&self) -> usize {
        std::mem::size_of_val(&*self.words)
    }
}

impl KeySetCore for DenseBitSet {
    fn new() -> Self {
        // Zeroed allocation lets the OS hand out pages lazily, so untouched
        // regions of the key space cost no resident memory.
        let words = vec![0u32; WORDS].into_boxed_slice();
        // SAFETY: AtomicU32 has the same size, alignment and bit validity as u32.
        let words = unsafe { Box::from_raw(Box::into_raw(words) as *mut [AtomicU32]) };
        DenseBitSet { words }
    }

    #[inline]
    fn insert(&self, key: u32) {
        let (index, bit) = Self::locate(key);
        // Skip the read-modify-write when the bit is already present.
        if self.words[index].load(Ordering::Relaxed) & bit == 0 {
            self.words[index].fetch_or(bit, Ordering::Relaxed);
        }
    }

    fn contains(&self, key: u32) -> bool {
        let (index, bit) = Self::locate(key);
        self.words[index].load(Ordering::Relaxed) & bit != 0
    }

    fn cardinality(&self) -> usize {
        self.words
            .par_iter()
            .map(|word| word.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }
}
