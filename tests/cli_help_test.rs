//! CLI help output integration tests

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_root_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extension marketplace for moonlight"));
}

#[test]
fn test_root_help_lists_commands() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("repo")
                .and(predicate::str::contains("sync"))
                .and(predicate::str::contains("install"))
                .and(predicate::str::contains("config")),
        );
}

#[test]
fn test_repo_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["repo", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage extension repositories"));
}

#[test]
fn test_repo_add_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["repo", "add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON array of extension manifests"));
}

#[test]
fn test_sync_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last cached listing"));
}

#[test]
fn test_list_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("STATES").and(predicate::str::contains("--json")));
}

#[test]
fn test_install_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start disabled"));
}

#[test]
fn test_enable_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["enable", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Enable an installed extension"));
}

#[test]
fn test_disable_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["disable", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Disable an installed extension"));
}

#[test]
fn test_config_help() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EXAMPLES").and(predicate::str::contains("--unset")));
}

#[test]
fn test_unknown_command_fails() {
    Command::cargo_bin("moonbase")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}
