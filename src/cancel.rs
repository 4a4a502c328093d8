//! Cooperative cancellation for a single scan.
//!
//! A [`CancelToken`] wraps an `Arc<AtomicBool>`. Clones share the same flag,
//! so the token handed to a scan can be cancelled from any thread: a Ctrl+C
//! handler, a UI thread, or a progress sink. Nothing is ever forcibly
//! interrupted; the walker checks the token per directory entry and the
//! hasher checks it per read chunk.
//!
//! # Example
//!
//! ```
//! use dupsweep::cancel::CancelToken;
//!
//! let token = CancelToken::new();
//! let worker_view = token.clone();
//!
//! assert!(!worker_view.is_cancelled());
//! token.cancel();
//! assert!(worker_view.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag, e.g. one shared with a signal handler.
    #[must_use]
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// The underlying flag, for APIs that take a raw `Arc<AtomicBool>`.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
