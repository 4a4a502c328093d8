//! Directory exclusion rules.
//!
//! A directory is skipped, together with its whole subtree, when its base
//! name starts with `.` or `$`, or matches the fixed denylist of build
//! output and platform system directories. The rules apply to directories
//! found *below* a root; a root itself is always walked.

use std::collections::HashSet;
use std::ffi::OsStr;

/// Build output and platform system directories that are never descended into.
pub const SKIPPED_DIR_NAMES: &[&str] = &[
    "node_modules",
    "target",
    "bin",
    "obj",
    "System Volume Information",
    "lost+found",
];

/// Whether a directory with this base name should be skipped.
///
/// Pure and total: no I/O, no error cases.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::is_skipped_dir;
///
/// assert!(is_skipped_dir(".git"));
/// assert!(is_skipped_dir("$RECYCLE.BIN"));
/// assert!(is_skipped_dir("node_modules"));
/// assert!(!is_skipped_dir("photos"));
/// ```
#[must_use]
pub fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('$') || SKIPPED_DIR_NAMES.contains(&name)
}

/// Directory filter with the built-in rules plus user-configured names.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    extra: HashSet<String>,
}

impl PathFilter {
    /// Create a filter that also skips the given directory names.
    #[must_use]
    pub fn with_extra_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the directory with this base name should be skipped.
    ///
    /// Names that are not valid UTF-8 are matched lossily.
    #[must_use]
    pub fn should_skip(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        is_skipped_dir(&name) || self.extra.contains(name.as_ref())
    }
}
