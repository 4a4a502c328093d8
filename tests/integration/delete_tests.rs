use dupsweep::actions::{delete_batch, delete_files, deletion_plan, DeleteConfig};
use dupsweep::cancel::CancelToken;
use dupsweep::duplicates::{FinderConfig, RetentionPolicy, ScanCoordinator, ScanReport};
use dupsweep::progress::NoProgress;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn scan(root: &Path) -> ScanReport {
    ScanCoordinator::new(FinderConfig::default())
        .run_scan(&[root.to_path_buf()], &NoProgress, &CancelToken::new())
        .unwrap()
        .report()
        .cloned()
        .expect("scan completed")
}

#[test]
fn test_scenario_e_delete_with_missing_path() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.bin", &[1u8; 100]);
    let b = write(dir.path(), "b.bin", &[2u8; 250]);
    let missing = dir.path().join("never-existed.bin");

    let freed = delete_files(&[a.clone(), missing, b.clone()]);

    assert_eq!(freed, 350);
    assert!(!a.exists());
    assert!(!b.exists());
}

#[test]
fn test_delete_empty_list() {
    assert_eq!(delete_files(&[]), 0);
}

#[test]
fn test_batch_continues_after_failure() {
    let dir = tempdir().unwrap();
    let subdir = dir.path().join("a_directory");
    fs::create_dir(&subdir).unwrap();
    let file = write(dir.path(), "after.bin", b"still deleted");

    let result = delete_batch(&[subdir.clone(), file.clone()], &DeleteConfig::permanent());

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, subdir);
    assert_eq!(result.deleted_count(), 1);
    assert_eq!(result.bytes_freed, 13);
    assert!(!result.all_succeeded());
    assert!(subdir.exists());
    assert!(!file.exists());
}

#[test]
fn test_deleting_twice_frees_nothing_the_second_time() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "once.bin", &[9u8; 64]);
    let paths = vec![file];

    assert_eq!(delete_files(&paths), 64);
    assert_eq!(delete_files(&paths), 0);
}

#[test]
fn test_scan_delete_rescan_round_trip() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1.bin", &[1u8; 500]);
    write(dir.path(), "a2.bin", &[1u8; 500]);
    write(dir.path(), "a3.bin", &[1u8; 500]);
    write(dir.path(), "b1.bin", &[2u8; 40]);
    write(dir.path(), "b2.bin", &[2u8; 40]);
    write(dir.path(), "solo.bin", &[3u8; 77]);

    let before = scan(dir.path());
    assert_eq!(before.groups.len(), 2);
    let reclaimable = before.summary.reclaimable_space;

    let plan = deletion_plan(&before.groups, RetentionPolicy::First);
    assert_eq!(plan.len(), 3);
    assert_eq!(delete_files(&plan), reclaimable);

    let after = scan(dir.path());
    assert!(after.groups.is_empty());
    assert_eq!(after.summary.files_scanned, 3);
}

#[test]
fn test_deletion_plan_keeps_shortest_path() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("deeply").join("nested");
    fs::create_dir_all(&nested).unwrap();
    write(dir.path(), "k.bin", b"keep the short one");
    write(&nested, "k.bin", b"keep the short one");

    let report = scan(dir.path());
    let plan = deletion_plan(&report.groups, RetentionPolicy::ShortestPath);

    assert_eq!(plan.len(), 1);
    assert!(plan[0].starts_with(dir.path().canonicalize().unwrap().join("deeply")));

    let result = delete_batch(&plan, &DeleteConfig::default());
    assert!(result.all_succeeded());
    assert!(dir.path().join("k.bin").exists());
}
