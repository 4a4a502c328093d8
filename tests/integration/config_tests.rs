use dupsweep::cancel::CancelToken;
use dupsweep::config::Config;
use dupsweep::duplicates::ScanCoordinator;
use dupsweep::progress::NoProgress;
use figment::providers::Env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_file_controls_scan() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(data.join("Archive")).unwrap();
    fs::write(data.join("a.txt"), "archived twice").unwrap();
    fs::write(data.join("Archive").join("a.txt"), "archived twice").unwrap();

    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "threads = 2\nextra_skip_dirs = [\"Archive\"]\nprogress_interval = 1\n",
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.threads, 2);

    let coordinator = ScanCoordinator::new(config.finder_config());
    assert_eq!(coordinator.config().progress_interval, 1);

    let outcome = coordinator
        .run_scan(&[data], &NoProgress, &CancelToken::new())
        .unwrap();
    let report = outcome.report().unwrap();
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.files_scanned, 1);
}

#[test]
fn test_env_layer_overrides_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "threads = 2\nparanoid = false\n").unwrap();

    // A private prefix keeps this test independent of the real environment.
    std::env::set_var("DUPSWEEP_ITEST_THREADS", "6");
    std::env::set_var("DUPSWEEP_ITEST_PARANOID", "true");

    let figment = Config::figment(Some(&config_path)).merge(Env::prefixed("DUPSWEEP_ITEST_"));
    let config = Config::extract(&figment).unwrap();

    std::env::remove_var("DUPSWEEP_ITEST_THREADS");
    std::env::remove_var("DUPSWEEP_ITEST_PARANOID");

    assert_eq!(config.threads, 6);
    assert!(config.paranoid);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "paranoid = true\n").unwrap();

    let config = Config::extract(&Config::figment(Some(&config_path))).unwrap();
    let defaults = Config::default();

    assert!(config.paranoid);
    assert_eq!(config.threads, defaults.threads);
    assert_eq!(config.progress_interval, defaults.progress_interval);
    assert!(config.extra_skip_dirs.is_empty());
}

#[test]
fn test_malformed_toml_is_an_error() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "threads = [unclosed\n").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}
