use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use homefeed::cli::ScanOptions;
use homefeed::config::Config;
use homefeed::dates::DateSource;
use homefeed::library::{FolderProvider, SettingsProvider};
use tempfile::tempdir;

// Environment variables are process-wide.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_file_values() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
folders = ["/srv/photos", "/mnt/nas"]
date_source = "ctime"
slow_storage_mode = true
max_video_size = 1024
"#,
    )
    .unwrap();

    let config = Config::try_load_from_path(&path).unwrap();
    assert_eq!(
        config.active_folders(),
        vec![PathBuf::from("/srv/photos"), PathBuf::from("/mnt/nas")]
    );

    let settings = config.library_settings();
    assert_eq!(settings.date_source, DateSource::Ctime);
    assert_eq!(settings.effective_ttl(), Duration::from_secs(1800));
    assert_eq!(settings.filter.max_video_size(), 1024);
}

#[test]
fn test_missing_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let config = Config::load_from_path(dir.path().join("absent.toml"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_file_reports_error_and_falls_back() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "date_source = \"birthtime\"\n").unwrap();

    assert!(Config::try_load_from_path(&path).is_err());
    assert_eq!(Config::load_from_path(&path), Config::default());
}

#[test]
fn test_environment_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "date_source = \"mtime\"\ncache_ttl_secs = 60\n").unwrap();

    std::env::set_var("HOMEFEED_DATE_SOURCE", "ctime");
    std::env::set_var("HOMEFEED_SLOW_STORAGE_MODE", "true");
    let result = Config::try_load_from_path(&path);
    std::env::remove_var("HOMEFEED_DATE_SOURCE");
    std::env::remove_var("HOMEFEED_SLOW_STORAGE_MODE");

    let config = result.unwrap();
    assert_eq!(config.date_source, DateSource::Ctime);
    assert!(config.slow_storage_mode);
    assert_eq!(config.cache_ttl_secs, 60);
}

#[test]
fn test_command_line_overrides_everything() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "folders = [\"/configured\"]\n").unwrap();

    let mut config = Config::try_load_from_path(&path).unwrap();
    config.apply_scan_options(&ScanOptions {
        folders: vec![PathBuf::from("/from/cli")],
        date_source: Some(DateSource::Ctime),
        ..ScanOptions::default()
    });

    assert_eq!(config.active_folders(), vec![PathBuf::from("/from/cli")]);
    assert_eq!(config.library_settings().date_source, DateSource::Ctime);
}

#[test]
fn test_save_and_reload() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/dir/config.toml");

    let config = Config {
        folders: vec![PathBuf::from("~/Pictures")],
        image_extensions: vec!["jpg".into(), "cr2".into()],
        ..Config::default()
    };
    config.save(&path).unwrap();

    assert_eq!(Config::try_load_from_path(&path).unwrap(), config);
    assert!(config.to_toml().unwrap().contains("cr2"));
}
