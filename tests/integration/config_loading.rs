//! Integration tests for layered configuration loading

use reqctx::config::{global_config_path, ConfigLoader, ReqctxConfig};
use reqctx::ScanPolicy;
use std::fs;
use tempfile::TempDir;

use crate::integration::with_isolated_env;

fn write_workspace_config(workspace: &std::path::Path, name: &str, contents: &str) {
    let config_dir = workspace.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join(name), contents).unwrap();
}

#[test]
fn test_global_config_path_under_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let path = global_config_path().unwrap();
        assert_eq!(
            path,
            test_dir.path().join("xdg").join("reqctx").join("config.toml")
        );
    });
}

#[test]
fn test_workspace_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let global = global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "[resolver]\nscan_policy = \"always-full\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        write_workspace_config(
            workspace.path(),
            "config.toml",
            "[resolver]\nscan_policy = \"incremental\"\n",
        );

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.resolver.scan_policy, ScanPolicy::Incremental);
        // untouched keys keep the global value
        assert_eq!(config.logging.level, "debug");
    });
}

#[test]
fn test_env_specific_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        write_workspace_config(
            workspace.path(),
            "config.toml",
            "[resolver.scan]\nignore_dirs = [\"a\"]\n",
        );
        write_workspace_config(
            workspace.path(),
            "ci.toml",
            "[resolver.scan]\nignore_dirs = [\"b\", \"c\"]\n",
        );
        std::env::set_var("REQCTX_ENV", "ci");

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(
            config.resolver.scan.ignore_dirs,
            vec!["b".to_string(), "c".to_string()]
        );
    });
}

#[test]
fn test_environment_variable_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        write_workspace_config(
            workspace.path(),
            "config.toml",
            "[resolver]\nscan_policy = \"incremental\"\n",
        );
        std::env::set_var("REQCTX_RESOLVER__SCAN_POLICY", "always-full");

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.resolver.scan_policy, ScanPolicy::AlwaysFull);
    });
}

#[test]
fn test_serialized_config_loads_back() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let mut original = ReqctxConfig::default();
        original.resolver.scan_policy = ScanPolicy::AlwaysFull;
        original.resolver.scan.follow_symlinks = true;
        original.resolver.transform.minify = true;

        let path = test_dir.path().join("reqctx.toml");
        fs::write(&path, toml::to_string(&original).unwrap()).unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded.resolver.scan_policy, ScanPolicy::AlwaysFull);
        assert!(loaded.resolver.scan.follow_symlinks);
        assert!(loaded.resolver.transform.minify);
        assert!(loaded.validate().is_ok());
    });
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let missing = test_dir.path().join("nope.toml");
        assert!(ConfigLoader::load_from_file(&missing).is_err());
    });
}
