//! Scan orchestration: plan the file, fan chunks out to a worker pool, join,
//! and read the distinct count.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::address::encode;
use crate::chunk::{plan_chunks, ChunkRange};
use crate::config::{HashKind, ScanConfig, SetKind};
use crate::counters::{
    DashAHashSet, DashFxSet, DashSipSet, DenseBitSet, KeySet, LockedAHashSet, LockedFxSet,
    LockedSipSet, MemoryTrackedSet,
};
use crate::error::{Result, ScanError};
use crate::memory::report_memory_usage;
use crate::scanner::LineScanner;

/// Per-worker line accounting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub lines: u64,
    pub valid: u64,
    pub invalid: u64,
    pub bytes: u64,
}

/// What one worker did with its chunk. `stats` covers whatever was read
/// before `error`, if any, stopped the worker.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub worker: usize,
    pub chunk: ChunkRange,
    pub stats: ChunkStats,
    pub error: Option<ScanError>,
}

impl WorkerOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct ScanReport {
    pub distinct: usize,
    pub file_size: u64,
    pub outcomes: Vec<WorkerOutcome>,
    pub elapsed: Duration,
    pub peak_memory_bytes: Option<u64>,
}

impl ScanReport {
    pub fn total_lines(&self) -> u64 {
        self.outcomes.iter().map(|o| o.stats.lines).sum()
    }

    pub fn valid_lines(&self) -> u64 {
        self.outcomes.iter().map(|o| o.stats.valid).sum()
    }

    pub fn invalid_lines(&self) -> u64 {
        self.outcomes.iter().map(|o| o.stats.invalid).sum()
    }

    pub fn failed_workers(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }
}

/// Open `path`, read its size and plan `workers` line-aligned chunks.
pub fn plan_file(path: &Path, workers: usize) -> Result<(u64, Vec<ChunkRange>)> {
    let mut file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let file_size = file
        .metadata()
        .map_err(|source| ScanError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let chunks = plan_chunks(&mut file, file_size, workers)?;
    Ok((file_size, chunks))
}

/// Scan one chunk on its own file handle and insert every valid address.
///
/// Failures stop this worker only; they are logged and returned in the
/// outcome rather than propagated.
pub fn process_chunk<S: KeySet + ?Sized>(
    worker: usize,
    path: &Path,
    chunk: ChunkRange,
    set: &S,
    buffer_size: usize,
) -> WorkerOutcome {
    let mut stats = ChunkStats::default();
    let error = scan_range(path, chunk, set, buffer_size, &mut stats).err();

    match &error {
        Some(e) => error!(
            worker,
            start = chunk.start,
            end = chunk.end,
            lines = stats.lines,
            error = %e,
            "chunk scan failed"
        ),
        None => debug!(
            worker,
            start = chunk.start,
            end = chunk.end,
            lines = stats.lines,
            invalid = stats.invalid,
            "chunk done"
        ),
    }

    WorkerOutcome {
        worker,
        chunk,
        stats,
        error,
    }
}

fn scan_range<S: KeySet + ?Sized>(
    path: &Path,
    chunk: ChunkRange,
    set: &S,
    buffer_size: usize,
    stats: &mut ChunkStats,
) -> Result<()> {
    if chunk.is_empty() {
        return Ok(());
    }

    let mut file = File::open(path).map_err(|source| ScanError::Reopen {
        path: path.to_path_buf(),
        source,
    })?;
    file.seek(SeekFrom::Start(chunk.start))
        .map_err(|source| ScanError::Seek {
            offset: chunk.start,
            source,
        })?;

    let mut scanner = LineScanner::with_capacity(file, buffer_size);
    let budget = chunk.len();

    // The chunk start is always a line start, so the last line read may run
    // past `chunk.end` but the next worker never sees a partial line.
    while let Some(line) = scanner.next_line()? {
        stats.lines += 1;
        match encode(line) {
            Ok(key) => {
                set.insert(key);
                stats.valid += 1;
            }
            Err(_) => stats.invalid += 1,
        }
        stats.bytes = scanner.consumed();
        if stats.bytes >= budget {
            break;
        }
    }

    Ok(())
}

/// Run one worker per chunk on a dedicated pool of `workers` threads and
/// wait for all of them. Outcomes come back ordered by worker id.
pub fn scan_chunks<S: KeySet + ?Sized>(
    path: &Path,
    chunks: &[ChunkRange],
    set: &S,
    workers: usize,
    buffer_size: usize,
) -> Result<Vec<WorkerOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("ipuniq-worker-{}", i))
        .build()?;

    let outcomes = pool.install(|| {
        chunks
            .par_iter()
            .enumerate()
            .map(|(worker, chunk)| {
                let outcome = process_chunk(worker, path, *chunk, set, buffer_size);
                set.update_peak_memory();
                outcome
            })
            .collect::<Vec<_>>()
    });

    Ok(outcomes)
}

/// Count distinct IPv4 addresses in `path`.
///
/// Setup failures (open, stat, chunk planning, pool creation) are returned
/// as errors. Worker failures are not: they show up in
/// [`ScanReport::outcomes`] and the count covers what was read.
pub fn run(path: impl AsRef<Path>, config: &ScanConfig) -> Result<ScanReport> {
    let path = path.as_ref();
    let start = Instant::now();

    if config.workers == 0 {
        return Err(ScanError::NoWorkers);
    }

    let (file_size, chunks) = plan_file(path, config.workers)?;
    info!(
        path = %path.display(),
        file_size,
        workers = config.workers,
        set = ?config.set,
        "planned chunks"
    );

    report_memory_usage("before scan");

    let report = match (config.set, config.hasher) {
        (SetKind::Dense, _) => {
            let set = MemoryTrackedSet::<DenseBitSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
        (SetKind::DashSet, HashKind::Default) => {
            let set = MemoryTrackedSet::<DashSipSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
        (SetKind::DashSet, HashKind::FxHash) => {
            let set = MemoryTrackedSet::<DashFxSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
        (SetKind::DashSet, HashKind::AHash) => {
            let set = MemoryTrackedSet::<DashAHashSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
        (SetKind::Locked, HashKind::Default) => {
            let set = MemoryTrackedSet::<LockedSipSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
        (SetKind::Locked, HashKind::FxHash) => {
            let set = MemoryTrackedSet::<LockedFxSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
        (SetKind::Locked, HashKind::AHash) => {
            let set = MemoryTrackedSet::<LockedAHashSet>::new();
            run_with_set(path, config, file_size, &chunks, set, start)?
        }
    };

    report_memory_usage("after scan");
    info!(
        distinct = report.distinct,
        lines = report.total_lines(),
        invalid = report.invalid_lines(),
        failed_workers = report.failed_workers(),
        elapsed = ?report.elapsed,
        "scan finished"
    );

    Ok(report)
}

fn run_with_set<S: KeySet>(
    path: &Path,
    config: &ScanConfig,
    file_size: u64,
    chunks: &[ChunkRange],
    set: S,
    start: Instant,
) -> Result<ScanReport> {
    set.update_peak_memory();
    let outcomes = scan_chunks(path, chunks, &set, config.workers, config.buffer_size)?;
    set.update_peak_memory();

    Ok(ScanReport {
        distinct: set.cardinality(),
        file_size,
        outcomes,
        elapsed: start.elapsed(),
        peak_memory_bytes: set.peak_memory_bytes(),
    })
}
