use serde::Serialize;

use crate::scanner::DEFAULT_BUFFER_SIZE;

pub const DEFAULT_WORKERS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    /// 2^32-bit bitset, constant 512 MiB.
    Dense,
    /// Sharded concurrent hash set.
    DashSet,
    /// Hash set behind a single mutex.
    Locked,
}

impl std::str::FromStr for SetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dense" | "bitset" => Ok(SetKind::Dense),
            "sparse" | "dashset" => Ok(SetKind::DashSet),
            "locked" | "hashset" => Ok(SetKind::Locked),
            _ => Err(format!("Unknown set type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    Default, // SipHash (secure but slow)
    FxHash,  // Fast non-cryptographic hash
    AHash,   // Very fast, high-quality hash
}

impl std::str::FromStr for HashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "siphash" => Ok(HashKind::Default),
            "fxhash" | "fx" => Ok(HashKind::FxHash),
            "ahash" => Ok(HashKind::AHash),
            _ => Err(format!("Unknown hash type: {}", s)),
        }
    }
}

/// Knobs for one scan. The hasher only matters for the hash-set strategies.
#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    pub workers: usize,
    pub set: SetKind,
    pub hasher: HashKind,
    pub buffer_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            workers: DEFAULT_WORKERS,
            set: SetKind::Dense,
            hasher: HashKind::FxHash,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_aliases() {
        assert_eq!("bitset".parse::<SetKind>(), Ok(SetKind::Dense));
        assert_eq!("Sparse".parse::<SetKind>(), Ok(SetKind::DashSet));
        assert_eq!("hashset".parse::<SetKind>(), Ok(SetKind::Locked));
        assert!("roaring".parse::<SetKind>().is_err());
    }

    #[test]
    fn parses_hash_aliases() {
        assert_eq!("siphash".parse::<HashKind>(), Ok(HashKind::Default));
        assert_eq!("FX".parse::<HashKind>(), Ok(HashKind::FxHash));
        assert_eq!("ahash".parse::<HashKind>(), Ok(HashKind::AHash));
        assert!("nthash".parse::<HashKind>().is_err());
    }

    #[test]
    fn defaults_match_reference_run() {
        let config = ScanConfig::default();
        assert_eq!(config.workers, 20);
        assert_eq!(config.set, SetKind::Dense);
        assert_eq!(config.buffer_size, 2 * 1024 * 1024);
    }
}
