use dupsweep::cancel::CancelToken;
use dupsweep::duplicates::{FinderConfig, FinderError, ScanCoordinator, ScanOutcome, ScanState};
use dupsweep::progress::{NoProgress, ProgressSink};
use dupsweep::scanner::hasher::CHUNK_SIZE;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn populate(dir: &Path, count: usize) {
    for i in 0..count {
        fs::write(dir.join(format!("{i:04}.bin")), format!("payload {}", i % 7)).unwrap();
    }
}

/// Cancels the token the first time the sizing phase reports.
struct CancelOnSizing {
    token: CancelToken,
    messages: Mutex<Vec<String>>,
}

impl ProgressSink for CancelOnSizing {
    fn on_progress(&self, _percent: f64, message: &str) {
        if message.starts_with("Scanning files by size") {
            self.token.cancel();
        }
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Cancels the token as soon as hashing starts.
struct CancelOnHashing {
    token: CancelToken,
}

impl ProgressSink for CancelOnHashing {
    fn on_progress(&self, _percent: f64, message: &str) {
        if message.starts_with("Checking for actual duplicates") {
            self.token.cancel();
        }
    }
}

/// Asks the coordinator to cancel once hashing starts.
struct CancelThroughCoordinator {
    coordinator: Arc<ScanCoordinator>,
    accepted: Mutex<Option<bool>>,
}

impl ProgressSink for CancelThroughCoordinator {
    fn on_progress(&self, _percent: f64, message: &str) {
        if message.starts_with("Checking for actual duplicates") {
            let mut accepted = self.accepted.lock().unwrap();
            if accepted.is_none() {
                *accepted = Some(self.coordinator.cancel());
            }
        }
    }
}

/// Starts a second scan on the same coordinator from inside the first.
struct Reentrant {
    coordinator: Arc<ScanCoordinator>,
    roots: Vec<PathBuf>,
    nested: Mutex<Option<Result<ScanOutcome, FinderError>>>,
}

impl ProgressSink for Reentrant {
    fn on_progress(&self, _percent: f64, _message: &str) {
        let mut nested = self.nested.lock().unwrap();
        if nested.is_none() {
            *nested = Some(
                self.coordinator
                    .run_scan(&self.roots, &NoProgress, &CancelToken::new()),
            );
        }
    }
}

#[test]
fn test_cancel_before_start() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 20);
    let token = CancelToken::new();
    token.cancel();

    let coordinator = ScanCoordinator::new(FinderConfig::default());
    let outcome = coordinator
        .run_scan(&[dir.path().to_path_buf()], &NoProgress, &token)
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(coordinator.state(), ScanState::Cancelled);
    assert_eq!(coordinator.last_message(), "Scan cancelled");
}

#[test]
fn test_cancel_during_sizing() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 50);
    let sink = CancelOnSizing {
        token: CancelToken::new(),
        messages: Mutex::new(Vec::new()),
    };

    let coordinator = ScanCoordinator::new(FinderConfig::default());
    let outcome = coordinator
        .run_scan(&[dir.path().to_path_buf()], &sink, &sink.token)
        .unwrap();

    assert!(matches!(outcome, ScanOutcome::Cancelled));
    let messages = sink.messages.lock().unwrap();
    assert!(!messages
        .iter()
        .any(|m| m.starts_with("Checking for actual duplicates")));
    assert_eq!(messages.last().map(String::as_str), Some("Scan cancelled"));
}

#[test]
fn test_cancel_through_coordinator_during_hashing() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 30);
    let coordinator = Arc::new(ScanCoordinator::new(FinderConfig::default()));
    let sink = CancelThroughCoordinator {
        coordinator: Arc::clone(&coordinator),
        accepted: Mutex::new(None),
    };

    let outcome = coordinator
        .run_scan(&[dir.path().to_path_buf()], &sink, &CancelToken::new())
        .unwrap();

    assert_eq!(*sink.accepted.lock().unwrap(), Some(true));
    assert!(outcome.is_cancelled());
    assert!(outcome.report().is_none());
    assert_eq!(coordinator.state(), ScanState::Cancelled);
}

#[test]
fn test_cancel_with_no_scan_running() {
    let coordinator = ScanCoordinator::default();
    assert!(!coordinator.cancel());
    assert_eq!(coordinator.state(), ScanState::Idle);
}

#[test]
fn test_second_scan_while_running_is_busy() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 10);
    let roots = vec![dir.path().to_path_buf()];
    let coordinator = Arc::new(ScanCoordinator::new(FinderConfig::default()));
    let sink = Reentrant {
        coordinator: Arc::clone(&coordinator),
        roots: roots.clone(),
        nested: Mutex::new(None),
    };

    let outcome = coordinator
        .run_scan(&roots, &sink, &CancelToken::new())
        .unwrap();

    assert!(matches!(
        sink.nested.lock().unwrap().take(),
        Some(Err(FinderError::Busy))
    ));
    assert!(!outcome.is_cancelled());
    assert_eq!(coordinator.state(), ScanState::Completed);
}

#[test]
fn test_coordinator_reusable_after_cancel() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 14);
    let roots = [dir.path().to_path_buf()];
    let coordinator = ScanCoordinator::new(FinderConfig::default());

    let token = CancelToken::new();
    token.cancel();
    assert!(coordinator
        .run_scan(&roots, &NoProgress, &token)
        .unwrap()
        .is_cancelled());

    let outcome = coordinator
        .run_scan(&roots, &NoProgress, &CancelToken::new())
        .unwrap();
    let report = outcome.report().expect("second scan completes");
    assert_eq!(report.groups.len(), 7);
    assert_eq!(coordinator.state(), ScanState::Completed);
}

#[test]
fn test_cancel_during_hashing_of_multi_chunk_files() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..(CHUNK_SIZE * 5 + 3)).map(|i| (i % 253) as u8).collect();
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(dir.path().join(name), &content).unwrap();
    }
    let token = CancelToken::new();
    let sink = CancelOnHashing {
        token: token.clone(),
    };

    let coordinator = ScanCoordinator::new(FinderConfig::default().with_threads(1));
    let outcome = coordinator
        .run_scan(&[dir.path().to_path_buf()], &sink, &token)
        .unwrap();

    assert!(matches!(outcome, ScanOutcome::Cancelled));
    assert_eq!(coordinator.state(), ScanState::Cancelled);
    assert_eq!(coordinator.last_message(), "Scan cancelled");
}
