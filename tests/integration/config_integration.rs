//! Integration tests for the layered configuration loader

use crate::integration::test_utils::with_xdg_env;
use mangaflow::config::{ConfigLoader, DEFAULT_BASE_URL};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_global(test_dir: &TempDir, contents: &str) -> PathBuf {
    let dir = test_dir.path().join("config").join("mangaflow");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_apply_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let config = ConfigLoader::load(None).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.poll_interval_secs, 5);
        assert_eq!(config.api.poll_timeout_secs, 300);
        assert!(config.validate().is_ok());

        let store_path = config.storage.resolve_store_path().unwrap();
        assert!(store_path.ends_with("store"));
    });
}

#[test]
fn global_file_is_picked_up_from_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let path = write_global(
            &test_dir,
            "[api]\nmodel = \"global-model\"\n\n[logging]\nlevel = \"warn\"\n",
        );
        assert_eq!(ConfigLoader::global_config_path(), Some(path));

        let config = ConfigLoader::load(None).unwrap();
        assert_eq!(config.api.model, "global-model");
        assert_eq!(config.logging.level, "warn");
    });
}

#[test]
fn explicit_file_overrides_global_and_env_overrides_both() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        write_global(
            &test_dir,
            "[api]\nmodel = \"global-model\"\npoll_interval_secs = 7\n",
        );
        let explicit = test_dir.path().join("project.toml");
        std::fs::write(&explicit, "[api]\nmodel = \"explicit-model\"\n").unwrap();

        let config = ConfigLoader::load(Some(&explicit)).unwrap();
        assert_eq!(config.api.model, "explicit-model");
        assert_eq!(config.api.poll_interval_secs, 7);

        std::env::set_var("MANGAFLOW__API__MODEL", "env-model");
        let config = ConfigLoader::load(Some(&explicit)).unwrap();
        assert_eq!(config.api.model, "env-model");
    });
}

#[test]
fn missing_explicit_file_is_an_error() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let missing = test_dir.path().join("nope.toml");
        assert!(ConfigLoader::load(Some(&missing)).is_err());
    });
}

#[test]
fn invalid_values_fail_validation() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let explicit = test_dir.path().join("bad.toml");
        std::fs::write(&explicit, "[api]\nbase_url = \"ftp://nowhere\"\npoll_interval_secs = 0\n")
            .unwrap();
        let config = ConfigLoader::load(Some(&explicit)).unwrap();
        assert!(config.ensure_valid().is_err());
    });
}
