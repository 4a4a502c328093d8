//! Tolerant bulk deletion.
//!
//! # Overview
//!
//! - [`delete_files`] is the minimal primitive: delete every path, treat
//!   missing files as already gone, keep going after failures, and return
//!   the bytes actually freed.
//! - [`delete_batch`] does the same walk but reports every outcome in a
//!   [`BatchDeleteResult`], and can move files to the system trash instead
//!   of unlinking them.
//! - [`deletion_plan`] turns scan results plus a [`RetentionPolicy`] into
//!   the list of paths to remove, never including a group's keeper.
//!
//! The size of each file is read before it is removed; it cannot be
//! observed afterwards.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::delete_files;
//! use std::path::PathBuf;
//!
//! let freed = delete_files(&[PathBuf::from("/tmp/copy-1.bin"), PathBuf::from("/tmp/copy-2.bin")]);
//! println!("freed {freed} bytes");
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::{DuplicateGroup, RetentionPolicy};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (already deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Path names a directory; only files are deleted.
    #[error("not a file: {0}")]
    NotAFile(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    /// Whether the file was simply absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A file that was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size in bytes, read before deletion.
    pub size: u64,
    /// Whether the file went to the trash rather than being unlinked.
    pub trashed: bool,
}

/// Outcome of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Files removed.
    pub deleted: Vec<DeleteResult>,
    /// Paths that were already absent.
    pub missing: Vec<PathBuf>,
    /// Paths that could not be removed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Sum of the sizes of removed files.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of files removed.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Whether no path failed. Missing paths are not failures.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Deleted {} file(s), freed {}",
            self.deleted_count(),
            bytesize::ByteSize::b(self.bytes_freed)
        );
        if !self.missing.is_empty() {
            text.push_str(&format!(", {} already missing", self.missing.len()));
        }
        if !self.failures.is_empty() {
            text.push_str(&format!(", {} failed", self.failures.len()));
        }
        text
    }
}

/// How files are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Move to the system trash instead of unlinking.
    pub trash: bool,
}

impl DeleteConfig {
    /// Unlink files permanently.
    #[must_use]
    pub fn permanent() -> Self {
        Self { trash: false }
    }

    /// Move files to the system trash.
    #[must_use]
    pub fn trash() -> Self {
        Self { trash: true }
    }
}

/// Delete one file, returning its size.
///
/// # Errors
///
/// Returns [`DeleteError::NotFound`] if the file is absent,
/// [`DeleteError::NotAFile`] for a directory, or another [`DeleteError`] if
/// it cannot be removed.
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    if metadata.is_dir() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    let size = metadata.len();

    if config.trash {
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {}", path.display(), e);
            DeleteError::TrashFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    } else {
        fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
        log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        trashed: config.trash,
    })
}

/// Delete every path, recording each outcome.
///
/// A missing file is recorded in [`BatchDeleteResult::missing`] and frees
/// nothing. Any other failure is recorded and the remaining paths are still
/// attempted.
pub fn delete_batch(paths: &[PathBuf], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        match delete_file(path, config) {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.deleted.push(deleted);
            }
            Err(e) if e.is_not_found() => {
                log::debug!("Already absent: {}", path.display());
                result.missing.push(path.clone());
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path.display(), e);
                result.failures.push((path.clone(), e.to_string()));
            }
        }
    }

    log::info!("{}", result.summary());
    result
}

/// Permanently delete every path and return the bytes freed.
#[must_use]
pub fn delete_files(paths: &[PathBuf]) -> u64 {
    delete_batch(paths, &DeleteConfig::permanent()).bytes_freed
}

/// Paths to delete so that exactly one member of each group survives.
#[must_use]
pub fn deletion_plan(groups: &[DuplicateGroup], policy: RetentionPolicy) -> Vec<PathBuf> {
    groups
        .iter()
        .flat_map(|group| group.deletion_candidates(policy))
        .collect()
}
