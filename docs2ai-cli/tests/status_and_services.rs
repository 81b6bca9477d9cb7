use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, SystemTime};

use assert_cmd::prelude::*;
use filetime::{set_file_mtime, FileTime};
use predicates::str::contains;
use tempfile::TempDir;

fn docs2ai(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docs2ai"));
    cmd.current_dir(root)
        .env_remove("DOCS_TO_AI_SOURCE_DIR")
        .env_remove("DOCS_TO_AI_SERVICES")
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL")
        .env("NO_COLOR", "1");
    cmd
}

/// `a.md` converted and current, `b.md` edited after conversion, plus an
/// orphaned `old.mdc`.
fn converted_project() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    let source = tmp.path().join("docs/rules");
    fs::create_dir_all(&source).unwrap();
    for name in ["a.md", "b.md"] {
        let path = source.join(name);
        fs::write(&path, name).unwrap();
        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
        set_file_mtime(&path, old).unwrap();
    }
    docs2ai(tmp.path()).arg("convert").assert().success();

    let later = FileTime::from_system_time(SystemTime::now() + Duration::from_secs(120));
    set_file_mtime(source.join("b.md"), later).unwrap();
    fs::write(tmp.path().join(".cursor/rules/old.mdc"), "old").unwrap();
    tmp
}

#[test]
fn status_json_classifies_artifacts() {
    let project = converted_project();

    let assert = docs2ai(project.path())
        .args(["status", "--json"])
        .assert()
        .success();
    let status: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid JSON");

    let artifacts = status["targets"][0]["artifacts"].as_array().unwrap();
    let states: Vec<(&str, &str)> = artifacts
        .iter()
        .map(|a| (a["artifact"].as_str().unwrap(), a["state"].as_str().unwrap()))
        .collect();
    assert_eq!(
        states,
        vec![("a.mdc", "current"), ("b.mdc", "stale"), ("old.mdc", "orphan")]
    );
    assert_eq!(status["summary"]["orphan"], 1);
    assert!(project.path().join(".cursor/rules/old.mdc").exists());
}

#[test]
fn status_table_suggests_sync() {
    let project = converted_project();

    docs2ai(project.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("CURSOR"))
        .stdout(contains("ORPHAN"))
        .stdout(contains("STALE"))
        .stdout(contains("docs2ai convert --sync"));
}

#[test]
fn services_lists_builtins() {
    let project = TempDir::new().unwrap();

    docs2ai(project.path())
        .arg("services")
        .assert()
        .success()
        .stdout(contains("cursor"))
        .stdout(contains("cline"))
        .stdout(contains("mdc"));
}

#[test]
fn services_json_includes_custom_targets() {
    let project = TempDir::new().unwrap();
    let config = project.path().join("custom.yaml");
    fs::write(
        &config,
        "targets:\n  - name: windsurf\n    directory: .windsurf/rules\n    extension: .md\n",
    )
    .unwrap();

    let assert = docs2ai(project.path())
        .args(["services", "--json", "--config"])
        .arg(&config)
        .assert()
        .success();
    let rows: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cline", "cursor", "windsurf"]);
    assert_eq!(rows[2]["extension"], "md");
}

#[test]
fn missing_explicit_config_exits_1() {
    let project = TempDir::new().unwrap();

    docs2ai(project.path())
        .args(["services", "--config", "nope.yaml"])
        .assert()
        .code(1)
        .stderr(contains("config file not found"));
}

#[test]
fn clean_dry_run_lists_and_clean_removes() {
    let project = converted_project();
    let rules = project.path().join(".cursor/rules");

    docs2ai(project.path())
        .args(["clean", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("would remove 3 entries"));
    assert!(rules.join("a.mdc").exists());

    docs2ai(project.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(contains("removed 3 entries"));
    assert!(rules.is_dir());
    assert_eq!(fs::read_dir(&rules).unwrap().count(), 0);
}

#[test]
fn help_exits_0() {
    let project = TempDir::new().unwrap();
    docs2ai(project.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert"));
}
