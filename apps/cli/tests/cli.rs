//! intake-cli 端到端测试
//!
//! 所有测试都通过 `--config` 指向临时目录，不触碰用户配置。

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("intake-cli").unwrap()
}

/// 写入空配置（全部使用默认值）
fn empty_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("calibrate"))
        .stdout(predicate::str::contains("cycle"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    cli()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    // 已存在时拒绝覆盖
    cli()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    cli()
        .args(["config", "init", "--force", "--config"])
        .arg(&path)
        .assert()
        .success();

    cli()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("tick_ms = 20"))
        .stdout(predicate::str::contains("time_phased"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pair]\nleft_port = 10\n").unwrap();

    cli()
        .args(["status", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("share port"));
}

#[test]
fn status_json_before_calibration() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    cli()
        .args(["status", "--json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"calibrated\": false"))
        .stdout(predicate::str::contains("\"mode\": \"idle\""));
}

#[test]
fn open_calibrates_then_reaches() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    cli()
        .args(["--yes", "open", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("校准完成"))
        .stdout(predicate::str::contains("open: reached"));
}

#[test]
fn close_calibrates_then_reaches() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    cli()
        .args(["-y", "close", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("close: reached"));
}

#[test]
fn cycle_runs_requested_count() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    cli()
        .args(["--yes", "cycle", "--count", "2", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("完成 2 次开合"));
}
