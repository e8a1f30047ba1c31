//! CLI tests in offline mode against a temp data file

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn mapmark(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mapmark").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("MAPMARK_SERVER")
        .env_remove("MAPMARK_USER")
        .env_remove("RUST_LOG")
        .arg("--offline");
    cmd
}

fn json_data(dir: &TempDir, args: &[&str]) -> Value {
    let output = mapmark(dir).arg("--json").args(args).output().unwrap();
    assert!(output.status.success(), "mapmark {:?} failed", args);
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["ok"], true);
    json["data"].clone()
}

fn add(dir: &TempDir, x: &str, y: &str, note: &str) -> String {
    let data = json_data(dir, &["add", x, y, "--note", note]);
    data["marker"]["id"].as_str().unwrap().to_string()
}

#[test]
fn test_add_then_list() {
    let dir = tempdir().unwrap();
    let id = add(&dir, "0.25", "0.5", "north gate");

    let data = json_data(&dir, &["list"]);
    assert_eq!(data["snapshot_count"], 1);
    assert_eq!(data["browsing"], false);
    let markers = data["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["id"], id.as_str());
    assert_eq!(markers[0]["note"], "north gate");
    assert_eq!(markers[0]["color"], "#ff0000");

    assert!(dir.path().join("mapmark_local.json").exists());
}

#[test]
fn test_human_output() {
    let dir = tempdir().unwrap();
    mapmark(&dir)
        .args(["add", "0.1", "0.2", "--note", "well"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Added marker marker-"));

    mapmark(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added marker: well"));
}

#[test]
fn test_history_and_browse() {
    let dir = tempdir().unwrap();
    let m1 = add(&dir, "0.1", "0.1", "first");
    let m2 = add(&dir, "0.9", "0.9", "second");

    let data = json_data(&dir, &["list", "--at", "0"]);
    assert_eq!(data["snapshot_index"], 0);
    assert_eq!(data["browsing"], true);
    assert_eq!(data["markers"].as_array().unwrap().len(), 1);
    assert_eq!(data["markers"][0]["id"], m1.as_str());

    // Browsing is not persisted; a delete always applies to the tip
    json_data(&dir, &["delete", &m1]);

    let data = json_data(&dir, &["history"]);
    let snapshots = data["snapshots"].as_array().unwrap();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[2]["description"], "Deleted marker: first");
    assert_eq!(snapshots[2]["marker_count"], 1);

    let data = json_data(&dir, &["list"]);
    assert_eq!(data["markers"][0]["id"], m2.as_str());
}

#[test]
fn test_user_label_in_description() {
    let dir = tempdir().unwrap();
    let data = json_data(&dir, &["--user", "alice", "add", "0.5", "0.5", "--note", "bridge"]);
    assert_eq!(data["description"], "Added marker: bridge (by alice)");
    assert_eq!(data["marker"]["created_by"], "alice");
    assert_eq!(data["synced"], false);
}

#[test]
fn test_add_rejects_out_of_range_position() {
    let dir = tempdir().unwrap();
    let output = mapmark(&dir)
        .args(["--json", "add", "1.5", "0.5", "--note", "offshore"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let json: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["error"]["code"], "invalid_args");
    assert!(json["error"]["message"].as_str().unwrap().contains("x must be in [0, 1]"));

    let data = json_data(&dir, &["history"]);
    assert!(data["snapshots"].as_array().unwrap().is_empty());
}

#[test]
fn test_delete_unknown_marker_fails() {
    let dir = tempdir().unwrap();
    add(&dir, "0.5", "0.5", "only");

    let output = mapmark(&dir)
        .args(["--json", "delete", "marker-0-0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let json: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "not_found");

    let data = json_data(&dir, &["history"]);
    assert_eq!(data["snapshots"].as_array().unwrap().len(), 1);
}

#[test]
fn test_delete_on_empty_history() {
    let dir = tempdir().unwrap();
    mapmark(&dir)
        .args(["delete", "marker-1-1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("history is empty"));
}

#[test]
fn test_list_out_of_range() {
    let dir = tempdir().unwrap();
    add(&dir, "0.5", "0.5", "a");

    mapmark(&dir)
        .args(["list", "--at", "5"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("out of range"))
        .stderr(predicate::str::contains("mapmark history"));
}

#[test]
fn test_pull_requires_server() {
    let dir = tempdir().unwrap();
    let output = mapmark(&dir).args(["--json", "pull"]).output().unwrap();
    assert_eq!(output.status.code(), Some(6));
    let json: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["error"]["code"], "sync_error");
}

#[test]
fn test_config_file_sets_data_file() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("mapmark.toml"),
        "data_file = \"maps/site.json\"\nuser = \"carol\"\n",
    )
    .unwrap();

    let data = json_data(&dir, &["add", "0.3", "0.3", "--note", "hut"]);
    assert_eq!(data["description"], "Added marker: hut (by carol)");
    assert!(dir.path().join("maps/site.json").exists());
    assert!(!dir.path().join("mapmark_local.json").exists());
}

#[test]
fn test_quiet_suppresses_output() {
    let dir = tempdir().unwrap();
    mapmark(&dir)
        .args(["--quiet", "add", "0.5", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
