//! Rough file-count estimate used only to scale enumeration progress.
//!
//! Each root is sampled with a shallow walkdir pass (at most
//! [`SAMPLE_DEPTH`] levels, at most [`SAMPLE_LIMIT`] files) and the count is
//! multiplied by [`EXTRAPOLATION_FACTOR`]. The total is floored at
//! [`MIN_ESTIMATE`] so progress math never divides by zero. The estimate
//! never influences which files are grouped.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Maximum directory depth sampled below each root.
pub const SAMPLE_DEPTH: usize = 2;

/// Maximum number of files counted per root.
pub const SAMPLE_LIMIT: u64 = 1000;

/// Multiplier applied to the sampled count of each root.
pub const EXTRAPOLATION_FACTOR: u64 = 100;

/// Floor for the aggregate estimate.
pub const MIN_ESTIMATE: u64 = 10_000;

/// Estimate the number of files below all roots.
///
/// Never fails: a root whose sample hits an error contributes zero.
#[must_use]
pub fn estimate_file_count(roots: &[PathBuf]) -> u64 {
    let total: u64 = roots.iter().map(|root| sample_root(root)).sum();
    log::debug!("Estimated {} files across {} root(s)", total, roots.len());
    total.max(MIN_ESTIMATE)
}

fn sample_root(root: &Path) -> u64 {
    let mut count = 0u64;

    for entry in WalkDir::new(root).max_depth(SAMPLE_DEPTH) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    count += 1;
                    if count >= SAMPLE_LIMIT {
                        break;
                    }
                }
            }
            Err(e) => {
                log::debug!("Estimate for {} abandoned: {}", root.display(), e);
                return 0;
            }
        }
    }

    count.saturating_mul(EXTRAPOLATION_FACTOR)
}
