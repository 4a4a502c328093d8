//! File actions module.
//!
//! The engine never deletes anything on its own. This module provides the
//! bulk-delete primitive callers apply to scan results:
//! - Permanent deletion (default) or move to the system trash
//! - Missing files are tolerated and free zero bytes
//! - One failure never stops the remaining deletions
//!
//! ```no_run
//! use dupsweep::actions::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let result = delete_batch(&[PathBuf::from("/path/to/duplicate.txt")], &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

pub mod delete;

pub use delete::{
    delete_batch, delete_file, delete_files, deletion_plan, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteResult,
};
