use dupsweep::cancel::CancelToken;
use dupsweep::duplicates::{
    FinderConfig, RetentionPolicy, ScanCoordinator, ScanOutcome, ScanReport, ScanState,
};
use dupsweep::progress::{NoProgress, ProgressSink};
use filetime::FileTime;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::tempdir;

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path.canonicalize().unwrap()
}

fn scan_with(config: FinderConfig, roots: &[PathBuf]) -> ScanReport {
    let coordinator = ScanCoordinator::new(config);
    match coordinator
        .run_scan(roots, &NoProgress, &CancelToken::new())
        .unwrap()
    {
        ScanOutcome::Completed(report) => report,
        ScanOutcome::Cancelled => panic!("scan was cancelled"),
    }
}

fn scan(roots: &[PathBuf]) -> ScanReport {
    scan_with(FinderConfig::default(), roots)
}

fn membership(report: &ScanReport) -> Vec<BTreeSet<PathBuf>> {
    report
        .groups
        .iter()
        .map(|g| g.paths().into_iter().collect())
        .collect()
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(f64, String)>>,
}

impl ProgressSink for Recorder {
    fn on_progress(&self, percent: f64, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((percent, message.to_string()));
    }
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let report = scan(&[dir.path().to_path_buf()]);

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.files_scanned, 0);
    assert_eq!(report.summary.duplicate_groups, 0);
}

#[test]
fn test_scenario_a_two_identical_files() {
    let dir = tempdir().unwrap();
    let content = [b'X'; 100];
    let a = write(dir.path(), "a.bin", &content);
    let b = write(dir.path(), "b.bin", &content);

    let report = scan(&[dir.path().to_path_buf()]);

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.size, 100);
    assert_eq!(group.wasted_size(), 100);
    assert_eq!(group.paths(), vec![a, b]);
}

#[test]
fn test_scenario_b_same_size_different_content() {
    let dir = tempdir().unwrap();
    let x = [b'X'; 100];
    let mut y = x;
    y[50] = b'Y';
    write(dir.path(), "a.bin", &x);
    write(dir.path(), "b.bin", &y);

    let report = scan(&[dir.path().to_path_buf()]);

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.candidate_files, 2);
}

#[test]
fn test_scenario_c_three_copies() {
    let dir = tempdir().unwrap();
    let content = [7u8; 200];
    write(dir.path(), "one.bin", &content);
    write(dir.path(), "nested/two.bin", &content);
    write(dir.path(), "nested/deeper/three.bin", &content);

    let report = scan(&[dir.path().to_path_buf()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 3);
    assert_eq!(report.groups[0].wasted_size(), 400);
    assert_eq!(report.summary.duplicate_files, 2);
    assert_eq!(report.summary.reclaimable_space, 400);
}

#[test]
fn test_scenario_d_missing_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let recorder = Recorder::default();

    let coordinator = ScanCoordinator::new(FinderConfig::default());
    let outcome = coordinator
        .run_scan(&[missing], &recorder, &CancelToken::new())
        .unwrap();

    let report = outcome.report().expect("missing root must not fail the scan");
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.skipped_roots.len(), 1);
    assert_eq!(coordinator.state(), ScanState::Completed);

    let events = recorder.events.lock().unwrap();
    assert!(events.iter().any(|(_, m)| m.starts_with("Skipping ")));
}

#[test]
fn test_missing_root_alongside_valid_root() {
    let dir = tempdir().unwrap();
    let valid = dir.path().join("valid");
    write(&valid, "a.bin", b"same content");
    write(&valid, "b.bin", b"same content");

    let report = scan(&[dir.path().join("missing"), valid]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.summary.roots_scanned.len(), 1);
    assert_eq!(report.summary.skipped_roots.len(), 1);
}

#[test]
fn test_different_sizes_never_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "short.bin", b"abcabc");
    write(dir.path(), "long.bin", b"abcabcabc");

    let report = scan(&[dir.path().to_path_buf()]);
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.candidate_files, 0);
}

#[test]
fn test_tiny_files_are_ignored() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");
    write(dir.path(), "one1", b"z");
    write(dir.path(), "one2", b"z");

    let report = scan(&[dir.path().to_path_buf()]);
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.files_scanned, 0);
}

#[test]
fn test_skipped_directories_are_not_scanned() {
    let dir = tempdir().unwrap();
    let content = b"duplicated everywhere";
    write(dir.path(), "keep/a.txt", content);
    write(dir.path(), ".git/objects/b.txt", content);
    write(dir.path(), "node_modules/pkg/c.txt", content);
    write(dir.path(), "build/obj/d.txt", content);
    write(dir.path(), "$Recycle.Bin/e.txt", content);

    let report = scan(&[dir.path().to_path_buf()]);
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.files_scanned, 1);
}

#[test]
fn test_extra_skip_dirs_from_config() {
    let dir = tempdir().unwrap();
    write(dir.path(), "photos/a.jpg", b"jpeg bytes");
    write(dir.path(), "Backups/a.jpg", b"jpeg bytes");

    let config = FinderConfig::default().with_extra_skip_dirs(vec!["Backups".to_string()]);
    let report = scan_with(config, &[dir.path().to_path_buf()]);

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.files_scanned, 1);
}

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let a = write(first.path(), "a.bin", b"shared across roots");
    let b = write(second.path(), "b.bin", b"shared across roots");

    let report = scan(&[first.path().to_path_buf(), second.path().to_path_buf()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].paths(), vec![a, b]);
    assert_eq!(report.summary.roots_scanned.len(), 2);
}

#[test]
fn test_root_order_does_not_change_membership() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write(first.path(), "a.bin", b"shared across roots");
    write(second.path(), "b.bin", b"shared across roots");
    write(first.path(), "c.bin", b"another pair!");
    write(second.path(), "d.bin", b"another pair!");

    let forward = scan(&[first.path().to_path_buf(), second.path().to_path_buf()]);
    let backward = scan(&[second.path().to_path_buf(), first.path().to_path_buf()]);

    let mut forward_sets = membership(&forward);
    let mut backward_sets = membership(&backward);
    forward_sets.sort();
    backward_sets.sort();
    assert_eq!(forward_sets, backward_sets);
}

#[test]
fn test_groups_sorted_by_wasted_size() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1.bin", &[1u8; 10]);
    write(dir.path(), "small2.bin", &[1u8; 10]);
    write(dir.path(), "small3.bin", &[1u8; 10]);
    write(dir.path(), "big1.bin", &[2u8; 5000]);
    write(dir.path(), "big2.bin", &[2u8; 5000]);
    write(dir.path(), "mid1.bin", &[3u8; 300]);
    write(dir.path(), "mid2.bin", &[3u8; 300]);

    let report = scan(&[dir.path().to_path_buf()]);
    let wasted: Vec<u64> = report.groups.iter().map(|g| g.wasted_size()).collect();

    assert_eq!(wasted, vec![5000, 300, 20]);
}

#[test]
fn test_large_files_spanning_many_chunks() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    let mut different = content.clone();
    different[250_000] ^= 0xff;
    write(dir.path(), "a.bin", &content);
    write(dir.path(), "b.bin", &content);
    write(dir.path(), "c.bin", &different);

    let report = scan(&[dir.path().to_path_buf()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.summary.bytes_hashed, 3 * content.len() as u64);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("set_a/{i}.bin"), b"content of set a");
        write(dir.path(), &format!("set_b/{i}.bin"), b"content of set b");
        write(dir.path(), &format!("unique/{i}.bin"), format!("unique {i}").as_bytes());
    }
    let roots = [dir.path().to_path_buf()];

    let first = scan(&roots);
    let second = scan(&roots);

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.groups.len(), 2);
}

#[test]
fn test_every_group_is_consistent() {
    let dir = tempdir().unwrap();
    for i in 0..20u8 {
        let content = vec![i % 4; 64 + usize::from(i % 3)];
        write(dir.path(), &format!("f{i:02}.bin"), &content);
    }

    let report = scan(&[dir.path().to_path_buf()]);
    assert!(!report.groups.is_empty());
    for group in &report.groups {
        assert!(group.len() >= 2);
        let first = fs::read(&group.files[0].path).unwrap();
        for file in &group.files {
            assert_eq!(file.size, group.size);
            assert_eq!(fs::read(&file.path).unwrap(), first);
        }
    }
}

#[test]
fn test_paranoid_mode_matches_default_results() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..20_000u32).map(|i| (i % 97) as u8).collect();
    write(dir.path(), "a.bin", &content);
    write(dir.path(), "b.bin", &content);
    write(dir.path(), "c.bin", b"tiny dup");
    write(dir.path(), "d.bin", b"tiny dup");

    let roots = [dir.path().to_path_buf()];
    let normal = scan(&roots);
    let paranoid = scan_with(FinderConfig::default().with_paranoid(true), &roots);

    assert_eq!(normal.groups, paranoid.groups);
}

#[test]
fn test_single_thread_pool() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.bin", b"pool of one");
    write(dir.path(), "b.bin", b"pool of one");

    let report = scan_with(FinderConfig::default().with_threads(1), &[dir.path().to_path_buf()]);
    assert_eq!(report.groups.len(), 1);
}

#[test]
fn test_progress_is_monotonic_and_complete() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(dir.path(), &format!("{i}.bin"), format!("content {}", i % 10).as_bytes());
    }

    let recorder = Recorder::default();
    let coordinator = ScanCoordinator::new(FinderConfig::default().with_progress_interval(5));
    coordinator
        .run_scan(&[dir.path().to_path_buf()], &recorder, &CancelToken::new())
        .unwrap();

    let events = recorder.events.lock().unwrap();
    assert_eq!(events.first().unwrap().0, 0.0);
    assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(events.iter().all(|(p, _)| (0.0..=100.0).contains(p)));

    let messages: Vec<&str> = events.iter().map(|(_, m)| m.as_str()).collect();
    assert!(messages.contains(&"Scanning files by size..."));
    assert!(messages.contains(&"Checking for actual duplicates..."));

    let (last_percent, last_message) = events.last().unwrap();
    assert_eq!(*last_percent, 100.0);
    assert_eq!(last_message, "Found 10 duplicate groups");
    assert_eq!(coordinator.last_message(), "Found 10 duplicate groups");
}

#[test]
fn test_retention_policy_on_scan_results() {
    let dir = tempdir().unwrap();
    let old = write(dir.path(), "b_old.bin", b"versioned bytes");
    let new = write(dir.path(), "a_new.bin", b"versioned bytes");
    filetime::set_file_mtime(&old, FileTime::from_unix_time(1_000_000_000, 0)).unwrap();
    filetime::set_file_mtime(&new, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

    let report = scan(&[dir.path().to_path_buf()]);
    let group = &report.groups[0];

    assert_eq!(group.keeper(RetentionPolicy::First).path, new);
    assert_eq!(group.keeper(RetentionPolicy::Newest).path, new);
    assert_eq!(group.keeper(RetentionPolicy::Oldest).path, old);
    assert_eq!(group.deletion_candidates(RetentionPolicy::Oldest), vec![new]);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "real.bin", b"only one real copy");
    std::os::unix::fs::symlink(&target, dir.path().join("link.bin")).unwrap();

    let report = scan(&[dir.path().to_path_buf()]);
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.files_scanned, 1);
}
