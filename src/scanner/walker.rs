//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root and
//! yielding a [`FileRef`] for every regular file below it. It uses
//! [`jwalk`] so that directory reads fan out over rayon, while the iterator
//! itself stays lazy and yields entries in sorted, deterministic order.
//!
//! # Rules
//!
//! - Directories rejected by [`PathFilter`] are pruned with their subtree.
//! - Symbolic links are never followed and never reported.
//! - Files of zero or one byte are dropped at enumeration time.
//! - Unreadable entries are yielded as [`ScanError`] values and never stop
//!   the walk.
//! - Once the [`CancelToken`] is set, no further directories are read and
//!   the iterator ends without an error.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::cancel::CancelToken;
//! use dupsweep::scanner::{PathFilter, Walker};
//! use std::path::Path;
//!
//! let token = CancelToken::new();
//! let walker = Walker::new(Path::new("/home/user/Downloads"), PathFilter::default())
//!     .with_cancel_token(token);
//!
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} candidate files", files.len());
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::filter::PathFilter;
use super::{FileRef, ScanError};
use crate::cancel::CancelToken;

/// Files smaller than this are never reported.
pub const MIN_FILE_SIZE: u64 = 2;

/// Directory walker for one root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Directory exclusion rules
    filter: PathFilter,
    /// Optional cancellation token
    cancel: Option<CancelToken>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(path: &Path, filter: PathFilter) -> Self {
        Self {
            root: path.to_path_buf(),
            filter,
            cancel: None,
        }
    }

    /// Stop the walk as soon as the token is cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Cancellation ends the iterator early; whatever was
    /// already yielded stays valid.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRef, ScanError>> + '_ {
        let filter = self.filter.clone();
        let cancel = self.cancel.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                if cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                    children.clear();
                    return;
                }

                children.retain(|child| match child {
                    Ok(entry) => {
                        let prune =
                            entry.file_type().is_dir() && filter.should_skip(entry.file_name());
                        if prune {
                            log::debug!("Skipping directory: {}", entry.path().display());
                        }
                        !prune
                    }
                    Err(_) => true,
                });

                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let cancelled = self.is_cancelled();
                if cancelled {
                    log::debug!("Walker: cancellation requested, stopping iteration");
                }
                !cancelled
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    let path = entry.path();
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    match std::fs::symlink_metadata(&path) {
                        Ok(metadata) => self.process_file_entry(path, &metadata),
                        Err(e) => Some(Err(self.handle_io_error(&path, e))),
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            })
    }

    /// Turn a regular file's metadata into a FileRef, or drop it.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
    ) -> Option<Result<FileRef, ScanError>> {
        if !metadata.is_file() {
            return None;
        }

        let size = metadata.len();
        if size < MIN_FILE_SIZE {
            log::trace!("Skipping {}-byte file: {}", size, path.display());
            return None;
        }

        Some(Ok(FileRef::new(path, size, metadata.modified().ok())))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle jwalk errors (typically an unreadable directory).
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        }
    }
}
