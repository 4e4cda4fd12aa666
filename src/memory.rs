//! Process memory diagnostics.
//!
//! Pure observability: nothing here feeds back into the scan.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};
use tracing::{info, warn};

#[cfg(target_os = "linux")]
use procfs::process::Process;

/// Resident set size of this process, if the platform exposes it.
pub fn get_memory_usage_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        Process::myself()
            .ok()
            .and_then(|p| p.status().ok())
            .map(|s| s.vmrss.unwrap_or(0) * 1024) // VmRSS is in KB
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Number of OS threads in this process, if the platform exposes it.
pub fn thread_count() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        Process::myself()
            .ok()
            .and_then(|p| p.status().ok())
            .map(|s| s.threads)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let exp = (bytes as f64).log(base).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes as f64 / base.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.2} {}", value, UNITS[exp])
    }
}

/// Log one line of memory and thread diagnostics tagged with `phase`.
pub fn report_memory_usage(phase: &str) {
    let rss = get_memory_usage_bytes();
    info!(
        phase,
        rss_bytes = rss,
        rss = %rss.map(format_bytes).unwrap_or_else(|| "n/a".to_string()),
        threads = thread_count(),
        "memory usage"
    );
}

/// Background thread that calls [`report_memory_usage`] on a fixed interval
/// until dropped.
pub struct MemoryMonitor {
    done: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MemoryMonitor {
    pub fn start(interval: Duration) -> Self {
        let (done_tx, done_rx) = bounded::<()>(0);
        let spawned = thread::Builder::new()
            .name("memory-monitor".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(done_rx) -> _ => return,
                        recv(ticker) -> _ => report_memory_usage("periodic"),
                    }
                }
            });

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "failed to start memory monitor");
                None
            }
        };

        MemoryMonitor {
            done: Some(done_tx),
            handle,
        }
    }
}

impl Drop for MemoryMonitor {
    fn drop(&mut self) {
        // Disconnecting the channel wakes the monitor thread.
        self.done.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
