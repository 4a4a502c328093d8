//! Human-readable report for the terminal.
//!
//! ```text
//! [1] 3 copies of 200 B, 400 B reclaimable (fingerprint 1f0e3dad9990)
//!     /data/a.bin
//!     /data/b.bin
//!     /data/c.bin
//!
//! Found 1 duplicate groups: 2 redundant files, 400 B reclaimable
//! Scanned 3 files (600 B) in 12ms
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use crate::actions::BatchDeleteResult;
use crate::duplicates::{DuplicateGroup, ScanOutcome, ScanReport};

/// Length of the fingerprint prefix shown per group.
const FINGERPRINT_PREFIX: usize = 12;

/// Plain-text formatter.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput {
    color: bool,
}

impl TextOutput {
    /// Create a formatter; `color` enables ANSI styling.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn condition(&self) -> Condition {
        if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        }
    }

    /// Write the report for a scan outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_outcome<W: Write>(&self, writer: &mut W, outcome: &ScanOutcome) -> io::Result<()> {
        match outcome {
            ScanOutcome::Completed(report) => self.write_report(writer, report),
            ScanOutcome::Cancelled => writeln!(
                writer,
                "{}",
                "Scan cancelled; no results were kept.".yellow().whenever(self.condition())
            ),
        }
    }

    /// Write every group followed by the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_report<W: Write>(&self, writer: &mut W, report: &ScanReport) -> io::Result<()> {
        for (index, group) in report.groups.iter().enumerate() {
            self.write_group(writer, index + 1, group)?;
        }

        let summary = &report.summary;
        for root in &summary.skipped_roots {
            writeln!(
                writer,
                "{} {}",
                "Skipped:".yellow().whenever(self.condition()),
                root.display()
            )?;
        }

        let headline = format!(
            "Found {} duplicate groups: {} redundant files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            ByteSize::b(summary.reclaimable_space)
        );
        writeln!(writer, "{}", headline.bold().whenever(self.condition()))?;

        write!(
            writer,
            "Scanned {} files ({}) in {:.2?}",
            summary.files_scanned,
            ByteSize::b(summary.total_size),
            summary.scan_duration
        )?;
        if summary.has_errors() {
            let errors = format!(
                "; {} unreadable entries, {} files could not be hashed",
                summary.walk_errors, summary.hash_failures
            );
            write!(writer, "{}", errors.red().whenever(self.condition()))?;
        }
        writeln!(writer)
    }

    fn write_group<W: Write>(
        &self,
        writer: &mut W,
        number: usize,
        group: &DuplicateGroup,
    ) -> io::Result<()> {
        let fingerprint = group.fingerprint_hex();
        writeln!(
            writer,
            "{} {} copies of {}, {} reclaimable {}",
            format!("[{number}]").cyan().bold().whenever(self.condition()),
            group.len(),
            ByteSize::b(group.size),
            ByteSize::b(group.wasted_size()),
            format!("(fingerprint {})", &fingerprint[..FINGERPRINT_PREFIX])
                .dim()
                .whenever(self.condition())
        )?;
        for file in &group.files {
            writeln!(writer, "    {}", file.path.display())?;
        }
        writeln!(writer)
    }

    /// Write the outcome of a batch deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_delete_result<W: Write>(
        &self,
        writer: &mut W,
        result: &BatchDeleteResult,
    ) -> io::Result<()> {
        for (path, reason) in &result.failures {
            writeln!(
                writer,
                "{} {}: {}",
                "Failed:".red().whenever(self.condition()),
                path.display(),
                reason
            )?;
        }
        let summary = result.summary();
        if result.all_succeeded() {
            writeln!(writer, "{}", summary.green().whenever(self.condition()))
        } else {
            writeln!(writer, "{}", summary.yellow().whenever(self.condition()))
        }
    }
}
