//! CLI surface behaviour.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_pipeline() {
    Command::cargo_bin("gin-release")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gin"))
        .stdout(predicate::str::contains("--no-download"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("gin-release")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn malformed_target_is_rejected_before_any_work() {
    Command::cargo_bin("gin-release")
        .unwrap()
        .args(["--targets", "linuxamd64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid target"));
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    Command::cargo_bin("gin-release")
        .unwrap()
        .args(["--config", "/nonexistent/release.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn unknown_os_in_targets_is_rejected() {
    Command::cargo_bin("gin-release")
        .unwrap()
        .args(["--targets", "plan9/amd64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized target"));
}
