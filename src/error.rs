//! Exit codes and machine-readable error reports.

use serde::Serialize;

use crate::duplicates::ScanOutcome;

/// Process exit codes.
///
/// - 0: Scan completed and duplicates were found
/// - 1: General error
/// - 2: Scan completed, no duplicates
/// - 3: Scan completed, but some files or directories could not be read
/// - 130: Interrupted (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates were found.
    NoDuplicates = 2,
    /// Completed with per-item read errors.
    PartialSuccess = 3,
    /// Cancelled by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for the terminal outcome of a scan.
    ///
    /// Per-item errors take precedence over the duplicate count so that
    /// scripts notice an incomplete result.
    #[must_use]
    pub fn from_outcome(outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Cancelled => Self::Interrupted,
            ScanOutcome::Completed(report) if report.summary.has_errors() => Self::PartialSuccess,
            ScanOutcome::Completed(report) if report.groups.is_empty() => Self::NoDuplicates,
            ScanOutcome::Completed(_) => Self::Success,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Every variant fits in a u8.
        Self::from(code.as_i32() as u8)
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }

    /// Render as a single JSON line.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"{}","exit_code":{}}}"#, self.code, self.exit_code)
        })
    }
}
