//! Integration tests for the `tabstore` binary.
//!
//! Each test points `XDG_CONFIG_HOME` at a temp dir so the user's own
//! configuration never leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tabstore(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tabstore").expect("binary should build");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("TABSTORE_LOG");
    cmd
}

fn write_script(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("steps.jsonl");
    fs::write(&path, body).expect("failed to write script");
    path
}

#[test]
fn replay_prints_snapshot_json() {
    let home = TempDir::new().expect("temp dir");
    let script = write_script(
        &home,
        r#"{"op":"open","url":"https://a.test"}
{"op":"open","url":"https://b.test"}
{"op":"navigate","url":"https://b.test/next"}
{"op":"back"}
"#,
    );

    let output = tabstore(&home)
        .args(["replay", script.to_str().expect("utf8 path")])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let snapshot: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let windows = &snapshot["windows"];
    let tab_ids = windows["main"]["tabIds"].as_array().expect("tabIds array");
    assert_eq!(tab_ids.len(), 2);

    let focus = windows["main"]["focus"].as_str().expect("focus set");
    let focused = &snapshot["tabs"][focus];
    assert_eq!(focused["url"], "https://b.test");
    assert_eq!(focused["isActive"], true);
    assert_eq!(focused["history"]["entries"].as_array().map(Vec::len), Some(2));
}

#[test]
fn replay_honors_window_flag() {
    let home = TempDir::new().expect("temp dir");
    let script = write_script(&home, "{\"op\":\"open\"}\n");

    tabstore(&home)
        .args(["replay", script.to_str().expect("utf8 path"), "--window", "side"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"side\""))
        .stdout(predicate::str::contains("https://www.google.com.hk/"));
}

#[test]
fn replay_uses_configured_default_url() {
    let home = TempDir::new().expect("temp dir");
    let config = home.path().join("custom.toml");
    fs::write(&config, "[tabs]\ndefault_url = \"https://start.test/\"\n").expect("write config");
    let script = write_script(&home, "{\"op\":\"open\"}\n");

    tabstore(&home)
        .args([
            "replay",
            script.to_str().expect("utf8 path"),
            "--config",
            config.to_str().expect("utf8 path"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://start.test/"));
}

#[test]
fn replay_bad_step_fails_with_line_number() {
    let home = TempDir::new().expect("temp dir");
    let script = write_script(&home, "{\"op\":\"open\"}\n{\"op\":\"select\",\"at\":7}\n");

    tabstore(&home)
        .args(["replay", script.to_str().expect("utf8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn replay_missing_script_fails() {
    let home = TempDir::new().expect("temp dir");

    tabstore(&home)
        .args(["replay", "/nonexistent/steps.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read script"));
}

#[test]
fn config_path_uses_xdg_config_home() {
    let home = TempDir::new().expect("temp dir");

    tabstore(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tabstore/config.toml"));
}

#[test]
fn config_init_then_refuses_without_force() {
    let home = TempDir::new().expect("temp dir");

    tabstore(&home).args(["config", "init"]).assert().success();
    assert!(home.path().join("tabstore/config.toml").exists());

    tabstore(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tabstore(&home)
        .args(["config", "init", "--force"])
        .assert()
        .success();
    assert!(home.path().join("tabstore/config.toml.backup").exists());
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().expect("temp dir");

    tabstore(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("channel_capacity = 256"))
        .stdout(predicate::str::contains("[tabs]"));
}
