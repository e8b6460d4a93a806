//! Integration tests for `ironsbom config` command.
//!
//! Tests config validation and display functionality with real TOML files.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn ironsbom() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ironsbom"))
}

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ironsbom.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[catalog]
shard_count = 8
max_link_hops = 16
link_resolution = "full-path"
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let result = ironsbom_core::config::IronsbomConfig::load(&config_path).await;

    // Then: Should succeed
    let config = result.expect("valid config should load successfully");
    assert_eq!(config.catalog.shard_count, 8);
    assert_eq!(config.catalog.link_resolution, "full-path");
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write bad config");

    let result = ironsbom_core::config::IronsbomConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[test]
fn test_config_validate_command_reports_invalid_policy() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ironsbom.toml");
    fs::write(&config_path, "[catalog]\nlink_resolution = \"guess\"\n").expect("write");

    let output = ironsbom()
        .args(["--output", "json", "-c"])
        .arg(&config_path)
        .args(["config", "validate"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(2), "invalid config exits with 2");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json validation report");
    assert_eq!(report["valid"], false);
    assert!(
        report["errors"][0]
            .as_str()
            .is_some_and(|e| e.contains("link_resolution"))
    );
}

#[test]
fn test_config_validate_command_rejects_out_of_range_hops() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ironsbom.toml");
    fs::write(&config_path, "[catalog]\nmax_link_hops = 0\n").expect("write");

    let output = ironsbom()
        .args(["--output", "json", "-c"])
        .arg(&config_path)
        .args(["config", "validate"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_show_section_without_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("missing.toml");

    let output = ironsbom()
        .arg("-c")
        .arg(&config_path)
        .args(["config", "show", "--section", "catalog"])
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("max_link_hops = 40"));
    assert!(stdout.contains("basename-fallback"));
}

#[test]
fn test_config_show_unknown_section_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("missing.toml");

    let output = ironsbom()
        .arg("-c")
        .arg(&config_path)
        .args(["config", "show", "--section", "ebpf"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown section"));
}
