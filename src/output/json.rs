//! JSON output formatter for scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "status": "completed",
//!   "groups": [
//!     {
//!       "fingerprint": "af1349b9...",
//!       "size": 1024,
//!       "wasted_size": 1024,
//!       "files": [
//!         { "path": "/data/a.bin", "modified": "2024-05-01T10:00:00Z" },
//!         { "path": "/data/b.bin", "modified": null }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "files_scanned": 100,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 1024,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```
//!
//! A cancelled scan is rendered with `"status": "cancelled"`, no groups and
//! no summary.

use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanOutcome, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::FileRef;

/// One member of a duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path, lossily converted to UTF-8
    pub path: String,
    /// Last modification time in RFC 3339, if known
    pub modified: Option<DateTime<Utc>>,
}

impl From<&FileRef> for JsonFile {
    fn from(file: &FileRef) -> Self {
        Self {
            path: path_string(&file.path),
            modified: file.modified.map(to_utc),
        }
    }
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 fingerprint as hexadecimal (64 characters)
    pub fingerprint: String,
    /// Size of each member in bytes
    pub size: u64,
    /// Bytes reclaimable by keeping one member
    pub wasted_size: u64,
    /// Members in discovery order
    pub files: Vec<JsonFile>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            fingerprint: group.fingerprint_hex(),
            size: group.size,
            wasted_size: group.wasted_size(),
            files: group.files.iter().map(JsonFile::from).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Roots that were walked
    pub roots_scanned: Vec<String>,
    /// Roots skipped as missing or not directories
    pub skipped_roots: Vec<String>,
    /// Files enumerated
    pub files_scanned: usize,
    /// Total size of enumerated files in bytes
    pub total_size: u64,
    /// Files sharing their size with at least one other file
    pub candidate_files: usize,
    /// Entries the walker could not read
    pub walk_errors: usize,
    /// Candidates dropped after a read error while hashing
    pub hash_failures: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files removable while keeping one copy per group
    pub duplicate_files: usize,
    /// Bytes reclaimable
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Build from a scan summary and the exit code of this run.
    #[must_use]
    pub fn new(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots_scanned: summary.roots_scanned.iter().map(|p| path_string(p)).collect(),
            skipped_roots: summary.skipped_roots.iter().map(|p| path_string(p)).collect(),
            files_scanned: summary.files_scanned,
            total_size: summary.total_size,
            candidate_files: summary.candidate_files,
            walk_errors: summary.walk_errors,
            hash_failures: summary.hash_failures,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Terminal status of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStatus {
    /// All roots processed
    Completed,
    /// Cancelled before completion
    Cancelled,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Terminal status
    pub status: JsonStatus,
    /// Duplicate groups in result order
    pub groups: Vec<JsonDuplicateGroup>,
    /// Scan statistics, absent when cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<JsonSummary>,
}

impl JsonOutput {
    /// Build the JSON document for a scan outcome.
    #[must_use]
    pub fn new(outcome: &ScanOutcome) -> Self {
        let exit_code = ExitCode::from_outcome(outcome);
        match outcome {
            ScanOutcome::Completed(report) => Self {
                status: JsonStatus::Completed,
                groups: report.groups.iter().map(JsonDuplicateGroup::from).collect(),
                summary: Some(JsonSummary::new(&report.summary, exit_code)),
            },
            ScanOutcome::Cancelled => Self {
                status: JsonStatus::Cancelled,
                groups: Vec::new(),
                summary: None,
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON plus a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// JSON strings must be UTF-8; invalid sequences become U+FFFD.
fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
