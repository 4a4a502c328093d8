//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Deciding which directories are skipped ([`filter`])
//! - Parallel directory walking using jwalk ([`walker`])
//! - A cheap bounded-depth file count used to scale progress ([`estimate`])
//! - Prefix and full-content BLAKE3 hashing ([`hasher`])
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{PathFilter, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), PathFilter::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod estimate;
pub mod filter;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

pub use estimate::estimate_file_count;
pub use filter::{is_skipped_dir, PathFilter};
pub use hasher::{hash_to_hex, Hash, Hasher, PrefixDigest, PREHASH_SIZE};
pub use walker::Walker;

/// A regular file discovered during traversal.
///
/// Immutable once created. `modified` is carried for display and for
/// retention policies only; it never participates in duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
}

impl FileRef {
    /// Create a new FileRef.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }
}

/// Per-item errors that can occur during directory traversal.
///
/// None of these abort a walk; the walker yields them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while hashing or comparing a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The read was abandoned because the scan was cancelled.
    #[error("Hashing cancelled: {0}")]
    Cancelled(PathBuf),
}

impl HashError {
    /// Classify an I/O error for the given path.
    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file whose read failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Cancelled(p)
            | Self::Io { path: p, .. } => p,
        }
    }

    /// Whether this error came from cancellation rather than I/O.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
