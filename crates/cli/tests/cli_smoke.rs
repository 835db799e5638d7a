//! CLI smoke tests for podbin.
//!
//! These tests verify that the commands parse their arguments and return
//! appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn podbin_cmd() -> Command {
  let mut cmd: Command = cargo_bin_cmd!("podbin");
  cmd.env_remove("PODBIN_CACHE_DIR");
  cmd.env_remove("PODBIN_BUILDER");
  cmd.env_remove("RUST_LOG");
  cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  podbin_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  podbin_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("podbin"));
}

#[test]
fn version_command_prints_package_version() {
  podbin_cmd()
    .arg("version")
    .assert()
    .success()
    .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_command_json() {
  podbin_cmd()
    .args(["version", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "status", "clean", "version"] {
    podbin_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Argument errors
// =============================================================================

#[test]
fn build_without_scheme_is_usage_error() {
  podbin_cmd()
    .arg("build")
    .assert()
    .failure()
    .code(2)
    .stderr(predicate::str::contains("--scheme"));
}

#[test]
fn build_with_empty_scheme_fails() {
  let temp = TempDir::new().unwrap();
  podbin_cmd()
    .current_dir(temp.path())
    .args(["build", "--scheme", " "])
    .assert()
    .failure()
    .stderr(predicate::str::contains("scheme must not be empty"));
}

#[test]
fn unknown_validation_mode_is_rejected() {
  podbin_cmd()
    .args(["build", "--scheme", "Pods-App", "--validation", "paranoid"])
    .assert()
    .failure()
    .code(2);
}

#[test]
fn unknown_command_fails() {
  podbin_cmd().arg("frobnicate").assert().failure();
}
