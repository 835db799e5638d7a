use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn status_on_empty_cache_reports_incomplete() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .arg("status")
    .assert()
    .success()
    .stdout(predicate::str::contains("incomplete"))
    .stdout(predicate::str::contains("missing"));
}

#[test]
fn status_json_lists_every_entry() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .args(["status", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"frameworks\""))
    .stdout(predicate::str::contains("\"bundles\""))
    .stdout(predicate::str::contains("\"manifest\""))
    .stdout(predicate::str::contains("\"complete\": false"));
}

#[test]
#[cfg(unix)]
fn status_after_build_is_complete_and_current() {
  let env = TestEnv::with_manifest("PODS: []\n");
  env.build_cmd().assert().success();

  env
    .podbin_cmd()
    .arg("status")
    .assert()
    .success()
    .stdout(predicate::str::contains("up to date"));

  env.write_file("Pods/Manifest.lock", "PODS:\n  - Kit (2.0)\n");
  env
    .podbin_cmd()
    .arg("status")
    .assert()
    .success()
    .stderr(predicate::str::contains("Manifest differs"));
}

#[test]
#[cfg(unix)]
fn clean_forces_next_build() {
  let env = TestEnv::with_manifest("PODS: []\n");
  env.build_cmd().assert().success();

  env
    .podbin_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Cache cleared"));

  assert!(!env.cache_path().join("Manifest.lock").exists());

  env.build_cmd().assert().success();
  assert_eq!(env.build_calls(), 2);
}

#[test]
fn clean_without_cache_creates_nothing() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Cache cleared"));

  assert!(!env.output_path().exists());
}
