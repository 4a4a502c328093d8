//! Scan orchestration: the single public entry point of the engine.
//!
//! # Phases
//!
//! A scan moves through `Idle → Scanning(Sizing) → Scanning(Hashing) →
//! Completed | Cancelled | Failed`:
//!
//! 1. **Initialization (0-10%)**: normalize and deduplicate roots, skip the
//!    invalid ones with a notice, build the hashing pool, estimate the file
//!    count.
//! 2. **Sizing (10-50%)**: walk each root and partition files by exact
//!    size. Progress is scaled against the estimate.
//! 3. **Hashing (50-90%)**: fan candidate size buckets out over a rayon
//!    pool. Progress is scaled against buckets finished.
//! 4. **Finalization (90-100%)**: sort the groups once every task joined.
//!
//! A coordinator runs one scan at a time; a second concurrent
//! [`ScanCoordinator::run_scan`] fails with [`FinderError::Busy`].
//! Cancelled scans discard partial results.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::cancel::CancelToken;
//! use dupsweep::duplicates::{FinderConfig, ScanCoordinator, ScanOutcome};
//! use dupsweep::progress::NoProgress;
//! use std::path::PathBuf;
//!
//! let coordinator = ScanCoordinator::new(FinderConfig::default().with_threads(4));
//! let roots = vec![PathBuf::from("/home/user/Pictures")];
//!
//! match coordinator.run_scan(&roots, &NoProgress, &CancelToken::new())? {
//!     ScanOutcome::Completed(report) => {
//!         for group in &report.groups {
//!             println!("{} copies of {} bytes", group.len(), group.size);
//!         }
//!     }
//!     ScanOutcome::Cancelled => println!("cancelled"),
//! }
//! # Ok::<(), dupsweep::duplicates::FinderError>(())
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::finder::{process_size_bucket, BucketOptions, BucketOutcome};
use super::groups::{sort_groups, DuplicateGroup, SizePartitioner};
use crate::cancel::CancelToken;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::scanner::{estimate_file_count, FileRef, Hasher, PathFilter, ScanError, Walker};

/// Default number of enumerated files between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

const SIZING_START: f64 = 10.0;
const HASHING_START: f64 = 50.0;
const FINALIZING_START: f64 = 90.0;

/// Errors that fail a scan as a whole.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Another scan is already running on this coordinator.
    #[error("A scan is already in progress")]
    Busy,

    /// The hashing worker pool could not be created.
    #[error("Failed to create hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for a [`ScanCoordinator`].
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Hashing threads; 0 means one per CPU.
    pub threads: usize,
    /// Verify full-hash matches byte for byte.
    pub paranoid: bool,
    /// Directory names skipped in addition to the built-in denylist.
    pub extra_skip_dirs: Vec<String>,
    /// Files enumerated between two progress reports.
    pub progress_interval: u64,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            paranoid: false,
            extra_skip_dirs: Vec::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (0 = one per CPU).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable byte-for-byte verification.
    #[must_use]
    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }

    /// Add directory names to skip during traversal.
    #[must_use]
    pub fn with_extra_skip_dirs(mut self, names: Vec<String>) -> Self {
        self.extra_skip_dirs = names;
        self
    }

    /// Set the number of files between enumeration progress reports.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }
}

/// Phase of a running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Walking roots and partitioning by size.
    Sizing,
    /// Hashing candidate buckets.
    Hashing,
}

/// Lifecycle state of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No scan has run yet.
    #[default]
    Idle,
    /// A scan is in flight.
    Scanning(ScanPhase),
    /// The last scan completed.
    Completed,
    /// The last scan was cancelled.
    Cancelled,
    /// The last scan failed.
    Failed,
}

impl ScanState {
    /// Whether a scan is in flight.
    #[must_use]
    pub fn is_scanning(self) -> bool {
        matches!(self, Self::Scanning(_))
    }
}

/// Statistics collected during a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Roots that were walked
    pub roots_scanned: Vec<PathBuf>,
    /// Roots skipped because they were missing or not directories
    pub skipped_roots: Vec<PathBuf>,
    /// Files enumerated (two bytes or larger)
    pub files_scanned: usize,
    /// Total size of enumerated files
    pub total_size: u64,
    /// File count estimate used to scale progress
    pub estimated_files: u64,
    /// Size buckets with at least two members
    pub candidate_buckets: usize,
    /// Files in those buckets
    pub candidate_files: usize,
    /// Entries the walker could not read
    pub walk_errors: usize,
    /// Candidates dropped after a hashing error
    pub hash_failures: usize,
    /// Bytes streamed by the full-hash tier
    pub bytes_hashed: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files that could be removed (every member but one per group)
    pub duplicate_files: usize,
    /// Bytes reclaimable by removing them
    pub reclaimable_space: u64,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
    /// Last progress message of the scan
    pub final_message: String,
}

impl ScanSummary {
    /// Whether any per-item error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.walk_errors > 0 || self.hash_failures > 0
    }
}

/// Result of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Duplicate groups, sorted by wasted size descending
    pub groups: Vec<DuplicateGroup>,
    /// Scan statistics
    pub summary: ScanSummary,
}

/// Terminal outcome of a scan that did not fail.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// All roots were processed.
    Completed(ScanReport),
    /// The scan was cancelled; no partial groups are returned.
    Cancelled,
}

impl ScanOutcome {
    /// Whether the scan was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The report of a completed scan.
    #[must_use]
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled => None,
        }
    }
}

#[derive(Debug, Default)]
struct CoordinatorState {
    state: ScanState,
    active: Option<CancelToken>,
    last_message: String,
}

/// Orchestrates walking, partitioning, hashing and grouping.
#[derive(Debug, Default)]
pub struct ScanCoordinator {
    config: FinderConfig,
    inner: Mutex<CoordinatorState>,
}

impl ScanCoordinator {
    /// Create a coordinator with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CoordinatorState::default()),
        }
    }

    /// The configuration this coordinator scans with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.lock().state
    }

    /// Last phase message of the current or most recent scan.
    #[must_use]
    pub fn last_message(&self) -> String {
        self.lock().last_message.clone()
    }

    /// Cancel the scan in flight. Returns `false` if none was running.
    pub fn cancel(&self) -> bool {
        match &self.lock().active {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, cancel: &CancelToken) -> Result<(), FinderError> {
        let mut inner = self.lock();
        if inner.state.is_scanning() {
            return Err(FinderError::Busy);
        }
        inner.state = ScanState::Scanning(ScanPhase::Sizing);
        inner.active = Some(cancel.clone());
        inner.last_message.clear();
        Ok(())
    }

    fn enter_phase(&self, phase: ScanPhase, message: &str) {
        let mut inner = self.lock();
        inner.state = ScanState::Scanning(phase);
        inner.last_message = message.to_string();
    }

    fn finish(&self, state: ScanState, message: String) {
        let mut inner = self.lock();
        inner.state = state;
        inner.active = None;
        inner.last_message = message;
    }

    /// Scan `roots` for duplicate files.
    ///
    /// Blocks until the scan completes or is cancelled. Progress is
    /// reported to `sink` as a non-decreasing percentage plus a phase
    /// message; `cancel` stops the scan cooperatively.
    ///
    /// Missing or non-directory roots are skipped with a notice. Per-item
    /// I/O errors are counted in the summary and never fail the scan.
    ///
    /// # Errors
    ///
    /// - [`FinderError::Busy`] if a scan is already running on this
    ///   coordinator.
    /// - [`FinderError::ThreadPool`] if the hashing pool cannot be built.
    pub fn run_scan(
        &self,
        roots: &[PathBuf],
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, FinderError> {
        self.begin(cancel)?;

        let tracker = ProgressTracker::new(sink);
        let result = self.execute(roots, &tracker, cancel);

        let state = match &result {
            Ok(ScanOutcome::Completed(_)) => ScanState::Completed,
            Ok(ScanOutcome::Cancelled) => ScanState::Cancelled,
            Err(e) => {
                log::error!("Scan failed: {}", e);
                tracker.message(&format!("Scan failed: {e}"));
                ScanState::Failed
            }
        };
        self.finish(state, tracker.last_message());

        result
    }

    fn execute(
        &self,
        roots: &[PathBuf],
        tracker: &ProgressTracker<'_>,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, FinderError> {
        let start = Instant::now();
        let mut summary = ScanSummary::default();

        tracker.report(0.0, "Initializing...");

        for root in normalize_roots(roots) {
            match validate_root(&root) {
                Ok(()) => summary.roots_scanned.push(root),
                Err(e) => {
                    log::warn!("Skipping root: {}", e);
                    tracker.message(&format!("Skipping root: {e}"));
                    summary.skipped_roots.push(root);
                }
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("dupsweep-hash-{i}"))
            .build()?;

        summary.estimated_files = estimate_file_count(&summary.roots_scanned);

        // Phase 1: sizing
        let message = "Scanning files by size...";
        self.enter_phase(ScanPhase::Sizing, message);
        tracker.report(SIZING_START, message);
        log::info!(
            "Phase 1: Scanning {} root(s) by size",
            summary.roots_scanned.len()
        );

        let Some(partition) = self.partition_roots(&mut summary, tracker, cancel) else {
            return Ok(cancelled(tracker));
        };

        let stats = partition.stats();
        summary.files_scanned = stats.total_files;
        summary.total_size = stats.total_size;
        summary.candidate_buckets = stats.candidate_buckets;
        summary.candidate_files = stats.candidate_files;
        log::info!(
            "Phase 1 complete: {} files, {} candidates in {} size groups ({:.1}% eliminated)",
            stats.total_files,
            stats.candidate_files,
            stats.candidate_buckets,
            stats.elimination_rate()
        );

        if cancel.is_cancelled() {
            return Ok(cancelled(tracker));
        }

        // Phase 2: hashing
        let message = "Checking for actual duplicates...";
        self.enter_phase(ScanPhase::Hashing, message);
        tracker.report(HASHING_START, message);
        log::info!("Phase 2: Hashing {} size groups", stats.candidate_buckets);

        let outcomes = self.hash_buckets(&pool, partition.into_candidates(), tracker, cancel);
        if cancel.is_cancelled() || outcomes.iter().any(|o| o.cancelled) {
            return Ok(cancelled(tracker));
        }

        let mut groups = Vec::new();
        for outcome in outcomes {
            summary.hash_failures += outcome.failed_files;
            summary.bytes_hashed += outcome.bytes_hashed;
            groups.extend(outcome.groups);
        }

        // Phase 3: finalization
        tracker.report(FINALIZING_START, "Sorting results...");
        sort_groups(&mut groups);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_size).sum();
        summary.scan_duration = start.elapsed();

        tracker.report(100.0, &format!("Found {} duplicate groups", groups.len()));
        summary.final_message = tracker.last_message();

        log::info!(
            "Scan complete: {} duplicate groups, {} reclaimable bytes in {:.2?}",
            summary.duplicate_groups,
            summary.reclaimable_space,
            summary.scan_duration
        );

        Ok(ScanOutcome::Completed(ScanReport { groups, summary }))
    }

    /// Walk every valid root and bucket files by size.
    ///
    /// Returns `None` if cancelled.
    fn partition_roots(
        &self,
        summary: &mut ScanSummary,
        tracker: &ProgressTracker<'_>,
        cancel: &CancelToken,
    ) -> Option<SizePartitioner> {
        let filter = PathFilter::with_extra_names(&self.config.extra_skip_dirs);
        let interval = self.config.progress_interval.max(1);
        let estimate = summary.estimated_files.max(1) as f64;

        let mut partition = SizePartitioner::new();
        let mut seen_paths: HashSet<PathBuf> = HashSet::new();
        let mut enumerated: u64 = 0;

        for root in &summary.roots_scanned {
            let mut root_partition = SizePartitioner::new();
            let walker = Walker::new(root, filter.clone()).with_cancel_token(cancel.clone());

            for entry in walker.walk() {
                match entry {
                    Ok(file) => {
                        // Overlapping roots would otherwise pair a file with itself.
                        if !seen_paths.insert(file.path.clone()) {
                            continue;
                        }
                        root_partition.insert(file);
                        enumerated += 1;

                        if enumerated % interval == 0 {
                            let fraction = (enumerated as f64 / estimate).min(1.0);
                            tracker.report(
                                SIZING_START + (HASHING_START - SIZING_START) * fraction,
                                &format!("Scanning files by size... ({enumerated} files)"),
                            );
                        }
                    }
                    Err(e) => {
                        log::debug!("Walk error: {}", e);
                        summary.walk_errors += 1;
                    }
                }
            }

            partition.merge(root_partition);
            if cancel.is_cancelled() {
                return None;
            }
        }

        Some(partition)
    }

    /// Hash candidate buckets in parallel on `pool`.
    fn hash_buckets(
        &self,
        pool: &rayon::ThreadPool,
        candidates: Vec<(u64, Vec<FileRef>)>,
        tracker: &ProgressTracker<'_>,
        cancel: &CancelToken,
    ) -> Vec<BucketOutcome> {
        let total = candidates.len();
        let step = (total / 100).max(1);
        let finished = AtomicUsize::new(0);
        let hasher = Hasher::new().with_cancel_token(cancel.clone());
        let options = BucketOptions {
            paranoid: self.config.paranoid,
        };

        pool.install(|| {
            candidates
                .into_par_iter()
                .map(|(size, files)| {
                    if cancel.is_cancelled() {
                        return BucketOutcome {
                            cancelled: true,
                            ..BucketOutcome::default()
                        };
                    }

                    let outcome = process_size_bucket(size, files, &hasher, &options);

                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % step == 0 || done == total {
                        let fraction = done as f64 / total as f64;
                        tracker.report(
                            HASHING_START + (FINALIZING_START - HASHING_START) * fraction,
                            &format!("Checking for actual duplicates... ({done}/{total} size groups)"),
                        );
                    }

                    outcome
                })
                .collect()
        })
    }
}

fn cancelled(tracker: &ProgressTracker<'_>) -> ScanOutcome {
    log::info!("Scan cancelled");
    tracker.message("Scan cancelled");
    ScanOutcome::Cancelled
}

/// Make roots absolute and drop repeats, keeping first occurrence order.
fn normalize_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    roots
        .iter()
        .map(|root| absolute_root(root))
        .filter(|root| seen.insert(root.clone()))
        .collect()
}

fn absolute_root(root: &Path) -> PathBuf {
    if let Ok(canonical) = root.canonicalize() {
        return canonical;
    }
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

fn validate_root(root: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ScanError::PermissionDenied(root.to_path_buf()))
        }
        Err(_) => Err(ScanError::NotFound(root.to_path_buf())),
    }
}
