//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping ([`groups::SizePartitioner`])
//! - Prefix and full-content hashing per size bucket ([`finder`])
//! - Duplicate group management and ordering ([`groups`])
//! - Scan orchestration, progress and cancellation ([`coordinator`])

pub mod coordinator;
pub mod finder;
pub mod groups;

pub use coordinator::{
    FinderConfig, FinderError, ScanCoordinator, ScanOutcome, ScanPhase, ScanReport, ScanState,
    ScanSummary, DEFAULT_PROGRESS_INTERVAL,
};
pub use finder::{process_size_bucket, BucketOptions, BucketOutcome};
pub use groups::{
    compare_groups, sort_groups, DuplicateGroup, GroupingStats, RetentionPolicy, SizePartitioner,
};
