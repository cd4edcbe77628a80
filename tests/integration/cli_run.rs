//! Integration tests for CLI command execution

use reqctx::cli::{Commands, ContextArgs, OutputFormat, RunContext};
use reqctx::ContextError;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::integration::{with_isolated_env, write_files};

fn args(dir: &str, mode: &str) -> ContextArgs {
    ContextArgs {
        dir: PathBuf::from(dir),
        filter: "\\.js$".to_string(),
        flags: String::new(),
        recursive: true,
        mode: mode.to_string(),
    }
}

#[test]
fn test_generate_text_prints_module_source() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_files(workspace.path(), &["pages/home.js", "pages/about/index.js", "pages/a.css"]);

    with_isolated_env(&test_dir, || {
        let context = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        let output = context
            .execute(&Commands::Generate {
                request: args("pages", "sync"),
                format: OutputFormat::Text,
            })
            .unwrap();

        assert!(output.contains("\"./home.js\""));
        assert!(output.contains("\"./about/index.js\""));
        assert!(!output.contains("a.css"));
        assert!(output.contains("module.exports = requireContext;"));
    });
}

#[test]
fn test_generate_json_reports_keys() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_files(workspace.path(), &["pages/home.js"]);

    with_isolated_env(&test_dir, || {
        let context = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        let output = context
            .execute(&Commands::Generate {
                request: args("pages", "lazy"),
                format: OutputFormat::Json,
            })
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["mode"], "lazy");
        assert_eq!(value["keys"], serde_json::json!(["./home.js"]));
        assert!(value["synthetic_path"].as_str().unwrap().contains("?ctx="));
    });
}

#[test]
fn test_id_json_matches_library_identity() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(workspace.path().join("pages")).unwrap();

    with_isolated_env(&test_dir, || {
        let context = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        let output = context
            .execute(&Commands::Id {
                request: args("pages", "eager"),
                format: OutputFormat::Json,
            })
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let hash = value["hash"].as_str().unwrap();
        assert_eq!(hash, reqctx::compute_hash(value["key"].as_str().unwrap()));
        assert!(value["key"].as_str().unwrap().contains(" eager recursive "));
    });
}

#[test]
fn test_unknown_mode_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_isolated_env(&test_dir, || {
        let context = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        let err = context
            .execute(&Commands::Id {
                request: args("missing", "weak"),
                format: OutputFormat::Text,
            })
            .unwrap_err();
        assert!(matches!(err, ContextError::UnsupportedMode(_)));
    });
}

#[test]
fn test_invalid_config_file_fails_run_context() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let config_path = workspace.path().join("bad.toml");
    std::fs::write(&config_path, "[logging]\nformat = \"yaml\"\n").unwrap();

    with_isolated_env(&test_dir, || {
        let result = RunContext::new(workspace.path().to_path_buf(), Some(config_path.clone()));
        assert!(matches!(result, Err(ContextError::ConfigError(_))));
    });
}
