//! Parallel distinct-IPv4 counting over large line-delimited files.
//!
//! The file is cut into line-aligned chunks, each chunk is scanned on its own
//! file handle by a pool worker, and every valid address is inserted into one
//! shared concurrent set whose cardinality is read after all workers join.

pub mod address;
pub mod chunk;
pub mod config;
pub mod counters;
pub mod error;
pub mod memory;
pub mod process;
pub mod scanner;

pub use address::{decode, encode, InvalidAddress};
pub use chunk::{adjust_to_next_newline, plan_chunks, ChunkRange};
pub use config::{HashKind, ScanConfig, SetKind, DEFAULT_WORKERS};
pub use counters::{KeySet, KeySetCore, MemoryTrackedSet};
pub use error::{Result, ScanError};
pub use memory::{report_memory_usage, MemoryMonitor};
pub use process::{plan_file, process_chunk, run, scan_chunks, ChunkStats, ScanReport, WorkerOutcome};
pub use scanner::{LineScanner, DEFAULT_BUFFER_SIZE};
