//! Two-tier content hashing for one size bucket.
//!
//! # Overview
//!
//! [`process_size_bucket`] turns one bucket of same-size files into the
//! duplicate groups it contains:
//! 1. **Prefix tier**: digest the first 4 KiB of every member and split the
//!    bucket by that digest. Members whose prefix is unique are dropped
//!    without ever being read in full.
//! 2. **Full tier**: stream the whole content of every member of a prefix
//!    bucket with two or more entries and split again by the full digest.
//! 3. **Verification** (paranoid mode only): split each full-digest bucket
//!    into classes of byte-identical files.
//!
//! A read failure drops only the affected member. Cancellation stops the
//! bucket at the next chunk boundary and is reported in the outcome.
//!
//! Buckets are independent of each other, which is what lets the
//! coordinator fan them out over a rayon pool.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::{process_size_bucket, BucketOptions};
//! use dupsweep::scanner::{FileRef, Hasher};
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRef::new(PathBuf::from("/data/a.bin"), 100, None),
//!     FileRef::new(PathBuf::from("/data/b.bin"), 100, None),
//! ];
//! let outcome = process_size_bucket(100, files, &Hasher::new(), &BucketOptions::default());
//! println!("{} group(s)", outcome.groups.len());
//! ```

use std::collections::HashMap;

use super::groups::DuplicateGroup;
use crate::scanner::{hash_to_hex, FileRef, Hash, Hasher, PrefixDigest, PREHASH_SIZE};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Knobs for hashing a bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketOptions {
    /// Confirm full-digest matches byte for byte before grouping.
    pub paranoid: bool,
}

/// What hashing one size bucket produced.
#[derive(Debug, Default)]
pub struct BucketOutcome {
    /// Confirmed duplicate groups, members in discovery order
    pub groups: Vec<DuplicateGroup>,
    /// Members dropped after an I/O error
    pub failed_files: usize,
    /// Members dropped because their prefix digest was unique
    pub unique_prefixes: usize,
    /// Members whose full content was hashed
    pub fully_hashed: usize,
    /// Bytes streamed by the full tier
    pub bytes_hashed: u64,
    /// Whether work stopped early because of cancellation
    pub cancelled: bool,
}

/// Hash one bucket of same-size files and return its duplicate groups.
///
/// Buckets with fewer than two members are returned untouched as an empty
/// outcome.
#[must_use]
pub fn process_size_bucket(
    size: u64,
    files: Vec<FileRef>,
    hasher: &Hasher,
    options: &BucketOptions,
) -> BucketOutcome {
    let mut outcome = BucketOutcome::default();
    if files.len() < 2 {
        return outcome;
    }

    // Prefix tier
    let mut prefix_buckets: HashMap<PrefixDigest, Vec<FileRef>> = HashMap::new();
    for file in files {
        match hasher.prehash(&file.path) {
            Ok(digest) => prefix_buckets.entry(digest).or_default().push(file),
            Err(e) if e.is_cancelled() => {
                outcome.cancelled = true;
                return outcome;
            }
            Err(e) => {
                log::warn!("Failed to prehash {}: {}", file.path.display(), e);
                outcome.failed_files += 1;
            }
        }
    }

    for (prefix, candidates) in prefix_buckets {
        if candidates.len() < 2 {
            outcome.unique_prefixes += candidates.len();
            continue;
        }

        // Full tier
        let full_buckets = match full_tier(size, prefix, candidates, hasher, &mut outcome) {
            Some(buckets) => buckets,
            None => return outcome,
        };

        for (fingerprint, members) in full_buckets {
            if members.len() < 2 {
                continue;
            }

            let classes = if options.paranoid {
                match verify_identical(members, hasher, &mut outcome) {
                    Some(classes) => classes,
                    None => return outcome,
                }
            } else {
                vec![members]
            };

            for class in classes.into_iter().filter(|c| c.len() > 1) {
                log::debug!(
                    "Duplicate group {}: {} files, {} bytes each",
                    hash_to_hex(&fingerprint),
                    class.len(),
                    size
                );
                outcome
                    .groups
                    .push(DuplicateGroup::new(size, fingerprint, class));
            }
        }
    }

    outcome
}

/// Split prefix-colliding candidates by full-content digest.
///
/// Returns `None` when cancelled; `outcome.cancelled` is set in that case.
fn full_tier(
    size: u64,
    prefix: PrefixDigest,
    candidates: Vec<FileRef>,
    hasher: &Hasher,
    outcome: &mut BucketOutcome,
) -> Option<Vec<(Hash, Vec<FileRef>)>> {
    // The prefix already covers every byte of files this small.
    if let PrefixDigest::Digest(digest) = prefix {
        if size <= PREHASH_SIZE as u64 {
            return Some(vec![(digest, candidates)]);
        }
    }

    let mut order: Vec<Hash> = Vec::new();
    let mut buckets: HashMap<Hash, Vec<FileRef>> = HashMap::new();

    for file in candidates {
        if file.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({} MB): {}",
                file.size / (1024 * 1024),
                file.path.display()
            );
        }

        match hasher.full_hash(&file.path) {
            Ok(hash) => {
                outcome.fully_hashed += 1;
                outcome.bytes_hashed += file.size;
                buckets
                    .entry(hash)
                    .or_insert_with(|| {
                        order.push(hash);
                        Vec::new()
                    })
                    .push(file);
            }
            Err(e) if e.is_cancelled() => {
                log::debug!("Full hash abandoned: {}", file.path.display());
                outcome.cancelled = true;
                return None;
            }
            Err(e) => {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                outcome.failed_files += 1;
            }
        }
    }

    Some(
        order
            .into_iter()
            .filter_map(|hash| buckets.remove(&hash).map(|files| (hash, files)))
            .collect(),
    )
}

/// Partition digest-equal files into classes of byte-identical files.
///
/// Each member is compared against the first member of every existing
/// class. A read failure drops whichever side failed: a failing class
/// representative is replaced by the next member of its class and the
/// comparison is retried. Returns `None` when cancelled.
fn verify_identical(
    members: Vec<FileRef>,
    hasher: &Hasher,
    outcome: &mut BucketOutcome,
) -> Option<Vec<Vec<FileRef>>> {
    let mut classes: Vec<Vec<FileRef>> = Vec::new();

    'members: for file in members {
        let mut index = 0;
        while index < classes.len() {
            let representative = &classes[index][0].path;
            match hasher.contents_equal(representative, &file.path) {
                Ok(true) => {
                    classes[index].push(file);
                    continue 'members;
                }
                Ok(false) => index += 1,
                Err(e) if e.is_cancelled() => {
                    outcome.cancelled = true;
                    return None;
                }
                Err(e) if e.path() == representative.as_path() => {
                    log::warn!("Failed to verify {}: {}", e.path().display(), e);
                    outcome.failed_files += 1;
                    classes[index].remove(0);
                    if classes[index].is_empty() {
                        classes.remove(index);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to verify {}: {}", file.path.display(), e);
                    outcome.failed_files += 1;
                    continue 'members;
                }
            }
        }
        classes.push(vec![file]);
    }

    if classes.len() > 1 {
        log::warn!(
            "Digest collision resolved by byte comparison: {} distinct contents",
            classes.len()
        );
    }
    Some(classes)
}
