//! Size partitioning, duplicate groups and result ordering.
//!
//! # Overview
//!
//! - [`SizePartitioner`] buckets every enumerated file by its exact byte
//!   length in a single pass. Partial partitions (one per root) merge
//!   without losing entries.
//! - [`DuplicateGroup`] is the only record that outlives a scan.
//! - [`sort_groups`] orders the final list by reclaimable space.
//! - [`RetentionPolicy`] makes "which copy do we keep" an explicit choice.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileRef;
//! use dupsweep::duplicates::SizePartitioner;
//! use std::path::PathBuf;
//!
//! let mut partition = SizePartitioner::new();
//! partition.insert(FileRef::new(PathBuf::from("/a.bin"), 100, None));
//! partition.insert(FileRef::new(PathBuf::from("/b.bin"), 100, None));
//! partition.insert(FileRef::new(PathBuf::from("/c.bin"), 200, None));
//!
//! let stats = partition.stats();
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.candidate_files, 2);
//!
//! let candidates = partition.into_candidates();
//! assert_eq!(candidates.len(), 1);
//! assert_eq!(candidates[0].0, 100);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileRef, Hash};

/// Exact-size buckets built from the file enumeration.
#[derive(Debug, Default)]
pub struct SizePartitioner {
    buckets: HashMap<u64, Vec<FileRef>>,
    total_files: usize,
    total_size: u64,
}

impl SizePartitioner {
    /// Create an empty partition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file to the bucket for its exact size.
    pub fn insert(&mut self, file: FileRef) {
        self.total_files += 1;
        self.total_size += file.size;
        self.buckets.entry(file.size).or_default().push(file);
    }

    /// Move every entry of `other` into this partition.
    ///
    /// Entries of `other` are appended after existing entries of the same
    /// size, so merging per-root partitions in root order keeps discovery
    /// order.
    pub fn merge(&mut self, other: SizePartitioner) {
        self.total_files += other.total_files;
        self.total_size += other.total_size;
        for (size, files) in other.buckets {
            self.buckets.entry(size).or_default().extend(files);
        }
    }

    /// Number of files inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_files
    }

    /// Whether no file has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// Files currently held for one exact size.
    #[must_use]
    pub fn bucket(&self, size: u64) -> Option<&[FileRef]> {
        self.buckets.get(&size).map(Vec::as_slice)
    }

    /// Summary of the partition.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            total_size: self.total_size,
            unique_sizes: self.buckets.len(),
            ..Default::default()
        };
        for files in self.buckets.values() {
            if files.len() > 1 {
                stats.candidate_files += files.len();
                stats.candidate_buckets += 1;
            } else {
                stats.eliminated_unique += files.len();
            }
        }
        stats
    }

    /// Consume the partition, keeping only buckets with two or more members.
    ///
    /// Buckets are ordered by size, largest first, so the slowest hashing
    /// work is scheduled early.
    #[must_use]
    pub fn into_candidates(self) -> Vec<(u64, Vec<FileRef>)> {
        let mut candidates: Vec<(u64, Vec<FileRef>)> = self
            .buckets
            .into_iter()
            .filter(|(size, files)| {
                let keep = files.len() > 1;
                if !keep {
                    log::trace!("Eliminated unique size {}", size);
                }
                keep
            })
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates
    }
}

/// Statistics from size partitioning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files partitioned
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct sizes
    pub unique_sizes: usize,
    /// Files in buckets with 2+ members
    pub candidate_files: usize,
    /// Buckets with 2+ members
    pub candidate_buckets: usize,
    /// Files alone in their size bucket
    pub eliminated_unique: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Confirmed set of byte-identical files.
///
/// Members are listed in discovery order. No member is privileged; use a
/// [`RetentionPolicy`] to decide which one to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Size in bytes shared by every member
    pub size: u64,
    /// Full-content BLAKE3 fingerprint shared by every member
    pub fingerprint: Hash,
    /// Members, at least two
    pub files: Vec<FileRef>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, fingerprint: Hash, files: Vec<FileRef>) -> Self {
        debug_assert!(files.len() >= 2, "a duplicate group needs two members");
        debug_assert!(files.iter().all(|f| f.size == size));
        Self {
            size,
            fingerprint,
            files,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `size × member count`.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Bytes reclaimable by keeping exactly one member: `size × (count − 1)`.
    #[must_use]
    pub fn wasted_size(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Fingerprint as hexadecimal string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        hash_to_hex(&self.fingerprint)
    }

    /// Paths of all members.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Index of the member kept under `policy`.
    #[must_use]
    pub fn keeper_index(&self, policy: RetentionPolicy) -> usize {
        let indexed = self.files.iter().enumerate();
        let picked = match policy {
            RetentionPolicy::First => None,
            // Ties resolve to the earliest discovered member.
            RetentionPolicy::Newest => indexed
                .max_by(|(ia, a), (ib, b)| a.modified.cmp(&b.modified).then(ib.cmp(ia)))
                .map(|(i, _)| i),
            RetentionPolicy::Oldest => indexed
                .min_by(|(ia, a), (ib, b)| {
                    // Unknown times sort last.
                    let key_a = (a.modified.is_none(), a.modified);
                    let key_b = (b.modified.is_none(), b.modified);
                    key_a.cmp(&key_b).then(ia.cmp(ib))
                })
                .map(|(i, _)| i),
            RetentionPolicy::ShortestPath => indexed
                .min_by(|(ia, a), (ib, b)| {
                    let len_a = a.path.as_os_str().len();
                    let len_b = b.path.as_os_str().len();
                    len_a.cmp(&len_b).then(ia.cmp(ib))
                })
                .map(|(i, _)| i),
        };
        picked.unwrap_or(0)
    }

    /// The member kept under `policy`.
    #[must_use]
    pub fn keeper(&self, policy: RetentionPolicy) -> &FileRef {
        &self.files[self.keeper_index(policy)]
    }

    /// Paths of every member except the one kept under `policy`, in
    /// discovery order.
    #[must_use]
    pub fn deletion_candidates(&self, policy: RetentionPolicy) -> Vec<PathBuf> {
        let keep = self.keeper_index(policy);
        self.files
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != keep)
            .map(|(_, f)| f.path.clone())
            .collect()
    }
}

/// Which member of a duplicate group survives a cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionPolicy {
    /// The first member in discovery order.
    #[default]
    First,
    /// The most recently modified member.
    Newest,
    /// The least recently modified member.
    Oldest,
    /// The member with the shortest path.
    ShortestPath,
}

/// Total order used for the final result list.
///
/// Wasted size descending, then fingerprint, then size, then first member
/// path. Parallel completion order never leaks into the result.
#[must_use]
pub fn compare_groups(a: &DuplicateGroup, b: &DuplicateGroup) -> Ordering {
    b.wasted_size()
        .cmp(&a.wasted_size())
        .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        .then_with(|| a.size.cmp(&b.size))
        .then_with(|| {
            let first_a = a.files.first().map(|f| &f.path);
            let first_b = b.files.first().map(|f| &f.path);
            first_a.cmp(&first_b)
        })
}

/// Sort groups into their final, deterministic order.
pub fn sort_groups(groups: &mut [DuplicateGroup]) {
    groups.sort_by(compare_groups);
}
