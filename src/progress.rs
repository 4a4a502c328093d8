//! Progress reporting for a scan.
//!
//! A scan reports `(percent, message)` pairs to a [`ProgressSink`]. The
//! coordinator routes every report through a [`ProgressTracker`], which
//! guarantees the percentage seen by the sink is clamped to `0..=100` and
//! never decreases during one scan, even though reports come from many
//! worker threads.
//!
//! [`TerminalProgress`] draws an indicatif bar on stderr for the CLI;
//! [`NoProgress`] discards everything.
//!
//! # Example
//!
//! ```
//! use dupsweep::progress::{ProgressSink, ProgressTracker};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<f64>>);
//!
//! impl ProgressSink for Recorder {
//!     fn on_progress(&self, percent: f64, _message: &str) {
//!         self.0.lock().unwrap().push(percent);
//!     }
//! }
//!
//! let recorder = Recorder::default();
//! let tracker = ProgressTracker::new(&recorder);
//! tracker.report(40.0, "Scanning files by size...");
//! tracker.report(30.0, "late report from a worker");
//! assert_eq!(*recorder.0.lock().unwrap(), vec![40.0, 40.0]);
//! ```

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receiver of progress updates.
///
/// Implementations are called from worker threads and must not block for
/// long; file I/O never waits on a sink.
pub trait ProgressSink: Send + Sync {
    /// Called with the overall percentage (0 to 100) and a phase message.
    fn on_progress(&self, percent: f64, message: &str);
}

/// Sink that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _percent: f64, _message: &str) {}
}

#[derive(Debug)]
struct TrackerState {
    percent: f64,
    message: String,
}

/// Monotonic front end for a [`ProgressSink`].
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    state: Mutex<TrackerState>,
}

impl<'a> ProgressTracker<'a> {
    /// Start tracking at 0%.
    #[must_use]
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            state: Mutex::new(TrackerState {
                percent: 0.0,
                message: String::new(),
            }),
        }
    }

    /// Forward a report, raising the percentage only.
    ///
    /// The sink is called while the tracker lock is held so reports from
    /// concurrent workers reach it in non-decreasing order.
    pub fn report(&self, percent: f64, message: &str) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let clamped = if percent.is_nan() {
            state.percent
        } else {
            percent.clamp(0.0, 100.0)
        };
        state.percent = state.percent.max(clamped);
        state.message.clear();
        state.message.push_str(message);

        self.sink.on_progress(state.percent, &state.message);
    }

    /// Re-send the current percentage with a new message.
    pub fn message(&self, message: &str) {
        let percent = self.percent();
        self.report(percent, message);
    }

    /// Highest percentage reported so far.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .percent
    }

    /// Most recent message.
    #[must_use]
    pub fn last_message(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .message
            .clone()
    }
}

/// Terminal progress bar on stderr using indicatif.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// Create a bar, hidden when `quiet` is set.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let target = if quiet {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let bar = ProgressBar::with_draw_target(Some(100), target);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Finish the bar, leaving the last message visible.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Remove the bar from the terminal.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&self, percent: f64, message: &str) {
        // Percent is already clamped to 0..=100 by the tracker.
        self.bar.set_position(percent.round() as u64);
        self.bar.set_message(message.to_string());
    }
}
