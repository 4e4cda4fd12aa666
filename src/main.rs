use std::time::Duration;

use clap::Parser;
use ipuniq::memory::format_bytes;
use ipuniq::{HashKind, MemoryMonitor, ScanConfig, SetKind, DEFAULT_BUFFER_SIZE, DEFAULT_WORKERS};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ipuniq")]
#[command(about = "Count distinct IPv4 addresses in a line-delimited file", long_about = None)]
struct Args {
    /// Path to the file to be processed
    #[arg(short = 'f', long)]
    file: String,

    /// Number of parallel workers (one chunk each)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Set implementation to use (dense/bitset, sparse/dashset, locked/hashset)
    #[arg(short = 's', long, default_value = "dense")]
    set: SetKind,

    /// Hash function for the hash-set strategies (default/siphash, fxhash/fx, ahash)
    #[arg(short = 'H', long, default_value = "fxhash")]
    hash: HashKind,

    /// Per-worker read buffer in bytes; also the longest accepted line
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Seconds between periodic memory log lines (0 disables)
    #[arg(long, default_value_t = 0)]
    memory_interval: u64,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Results {
    distinct_ips: usize,
    total_lines: u64,
    invalid_lines: u64,
    failed_workers: usize,
    file_size: u64,
    total_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    peak_memory_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peak_memory_human: Option<String>,
}

#[derive(Serialize)]
struct OutputData<'a> {
    file: &'a str,
    config: &'a ScanConfig,
    results: Results,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ScanConfig {
        workers: args.workers,
        set: args.set,
        hasher: args.hash,
        buffer_size: args.buffer_size,
    };

    let _monitor = (args.memory_interval > 0)
        .then(|| MemoryMonitor::start(Duration::from_secs(args.memory_interval)));

    let report = ipuniq::run(&args.file, &config)?;

    for outcome in report.outcomes.iter().filter(|o| !o.is_ok()) {
        warn!(
            worker = outcome.worker,
            start = outcome.chunk.start,
            end = outcome.chunk.end,
            "chunk was not fully scanned; count may be low"
        );
    }

    if args.json {
        let output = OutputData {
            file: &args.file,
            config: &config,
            results: Results {
                distinct_ips: report.distinct,
                total_lines: report.total_lines(),
                invalid_lines: report.invalid_lines(),
                failed_workers: report.failed_workers(),
                file_size: report.file_size,
                total_time_ms: report.elapsed.as_secs_f64() * 1000.0,
                peak_memory_bytes: report.peak_memory_bytes,
                peak_memory_human: report.peak_memory_bytes.map(format_bytes),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        info!("Finished execution: {:.2?}", report.elapsed);
        println!("Results:");
        println!("  Distinct IPs: {}", report.distinct);
        println!("  Total lines: {}", report.total_lines());
        println!("  Invalid lines: {}", report.invalid_lines());
        println!("  Failed workers: {}", report.failed_workers());
        if let Some(peak_mem) = report.peak_memory_bytes {
            println!("  Peak memory: {}", format_bytes(peak_mem));
        }
        println!("  Total time: {:.2?}", report.elapsed);
    }

    Ok(())
}
