use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to align chunk boundary at offset {offset}: {source}")]
    Boundary {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to reopen {} for chunk scan: {source}", .path.display())]
    Reopen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to seek to offset {offset}: {source}")]
    Seek {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("read error: {0}")]
    Io(#[from] io::Error),

    #[error("line exceeds the {limit} byte read buffer")]
    LineTooLong { limit: usize },
}

impl ScanError {
    /// Setup failures abort the whole run; everything else is contained
    /// inside the worker that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::Open { .. }
                | ScanError::Stat { .. }
                | ScanError::Boundary { .. }
                | ScanError::NoWorkers
                | ScanError::ThreadPool(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_errors_are_fatal() {
        assert!(ScanError::NoWorkers.is_fatal());
        let err = ScanError::Boundary {
            offset: 7,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("offset 7"));
    }

    #[test]
    fn worker_errors_are_contained() {
        assert!(!ScanError::LineTooLong { limit: 16 }.is_fatal());
        let err = ScanError::Reopen {
            path: PathBuf::from("ips.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_fatal());
        let err = ScanError::Seek {
            offset: 3,
            source: io::Error::new(io::ErrorKind::Other, "bad seek"),
        };
        assert!(!err.is_fatal());
    }
}
