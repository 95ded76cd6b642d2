//! CLI tests: run the actual `pp` binary with an isolated home

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `pp` with data, config and working directories inside `home`
fn pp(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pp").expect("pp binary");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_demo_prints_average() {
    let home = TempDir::new().expect("Failed to create temp dir");
    pp(&home)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Story 1"))
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("Bob"))
        .stdout(predicate::str::contains("9.0"))
        .stdout(predicate::str::contains("outlier").not());
}

#[test]
fn test_demo_json_is_valid() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let output = pp(&home).args(["demo", "--format", "json"]).output().expect("run pp");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["tally"]["title"], "Story 1");
    assert_eq!(json["tally"]["average"], 9.0);
    assert_eq!(json["tally"]["entries"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_demo_honors_config_outlier_ratio() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let config = home.path().join("pp.yml");
    fs::write(&config, "session:\n  outlier-ratio: 0.1\n").expect("write config");

    pp(&home)
        .arg("--config")
        .arg(&config)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("outlier"));
}

#[test]
fn test_invalid_config_fails() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let config = home.path().join("pp.yml");
    fs::write(&config, "session:\n  outlier-ratio: -1.0\n").expect("write config");

    pp(&home)
        .arg("--config")
        .arg(&config)
        .arg("demo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outlier-ratio"));
}

#[test]
fn test_scale() {
    let home = TempDir::new().expect("Failed to create temp dir");
    pp(&home)
        .arg("scale")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 2 3 5 8 13 21"));
}

#[test]
fn test_demo_writes_log_file() {
    let home = TempDir::new().expect("Failed to create temp dir");
    pp(&home).args(["--log-level", "debug", "demo"]).assert().success();

    let log = home.path().join("data").join("planpoker").join("logs").join("planpoker.log");
    let content = fs::read_to_string(log).expect("log file");
    assert!(content.contains("Demo round complete"));
}

#[test]
fn test_play_scripted_from_stdin() {
    let home = TempDir::new().expect("Failed to create temp dir");
    pp(&home)
        .args(["play", "--name", "Alice"])
        .write_stdin("/facilitate\n/task Story 1\n/vote 8\n/reveal\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Joined as Alice"))
        .stdout(predicate::str::contains("Votes revealed"))
        .stdout(predicate::str::contains("8.0"));
}

#[test]
fn test_help_names_the_log_file_that_is_written() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let log = home.path().join("data").join("planpoker").join("logs").join("planpoker.log");

    pp(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(log.display().to_string()));

    pp(&home).arg("scale").assert().success();
    assert!(log.exists());
}
