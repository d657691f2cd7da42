//! Disk manager errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for disk manager operations.
pub type DiskResult<T> = Result<T, DiskError>;

/// Errors that can occur while setting up a disk manager.
///
/// Steady-state page I/O does not surface these: the buffer pool treats
/// reads and writes as infallible and implementations log faults instead.
#[derive(Debug, Error)]
pub enum DiskError {
    /// The data file could not be opened or created.
    #[error("failed to open data file {path}: {source}")]
    Open {
        /// Path of the data file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The data file's length is not a whole number of pages.
    #[error("data file {path} is not page-aligned: {len} bytes")]
    Misaligned {
        /// Path of the data file.
        path: PathBuf,
        /// Observed file length.
        len: u64,
    },

    /// I/O error during page read/write.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}
