#![cfg(unix)]

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn first_build_runs_builder_and_fills_cache() {
  let env = TestEnv::with_manifest("PODS:\n  - Kit (1.0)\n");

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Built binaries"));

  assert_eq!(env.build_calls(), 1);
  let out = env.output_path();
  assert!(out.join("XcodeFrameworks/Kit.xcframework/Kit").is_file());
  assert!(out.join("Bundles/Res.bundle/res.txt").is_file());
  assert!(out.join("Bundles/Kit.bundle/en.strings").is_file());
  assert!(env.cache_path().join("XcodeFrameworks.tar.gz").is_file());
  assert!(env.cache_path().join("Bundles.tar.gz").is_file());
  assert!(env.cache_path().join("Manifest.lock").is_file());
  assert!(!out.join("tmp").exists(), "build directory should be removed");
}

#[test]
fn second_build_restores_without_builder() {
  let env = TestEnv::with_manifest("PODS:\n  - Kit (1.0)\n");
  env.build_cmd().assert().success();

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Restored binaries from cache"));

  assert_eq!(env.build_calls(), 1);
  assert_eq!(
    std::fs::read_to_string(env.output_path().join("XcodeFrameworks/Kit.xcframework/Kit")).unwrap(),
    "binary\n"
  );
  assert!(env.output_path().join("Bundles/Res.bundle/res.txt").is_file());
}

#[test]
fn changed_manifest_triggers_rebuild() {
  let env = TestEnv::with_manifest("PODS:\n  - Kit (1.0)\n");
  env.build_cmd().assert().success();

  env.write_file("Pods/Manifest.lock", "PODS:\n  - Kit (2.0)\n");
  env.build_cmd().assert().success();

  assert_eq!(env.build_calls(), 2);
  assert_eq!(
    std::fs::read_to_string(env.cache_path().join("Manifest.lock")).unwrap(),
    "PODS:\n  - Kit (2.0)\n"
  );
}

#[test]
fn builder_from_environment_variable() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App"])
    .env("PODBIN_BUILDER", env.fake_builder())
    .assert()
    .success();

  assert_eq!(env.build_calls(), 1);
}

#[test]
fn missing_builder_fails_without_touching_cache() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no build command configured"));

  assert!(!env.cache_path().join("Manifest.lock").exists());
}

#[test]
fn failing_builder_reports_error() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App", "--builder", "echo 'scheme not found' >&2; exit 65"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("scheme not found"));
}

#[test]
fn missing_manifest_is_reported() {
  let env = TestEnv::with_manifest("PODS: []\n");
  std::fs::remove_file(env.root().join("Pods/Manifest.lock")).unwrap();

  env
    .build_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("Manifest.lock"));

  assert_eq!(env.build_calls(), 0);
}

#[test]
fn cache_dir_env_relocates_cache() {
  let env = TestEnv::with_manifest("PODS: []\n");
  let cache = env.root().join("shared-cache");

  env.build_cmd().env("PODBIN_CACHE_DIR", &cache).assert().success();

  assert!(cache.join("Manifest.lock").is_file());
  assert!(!env.cache_path().exists());
}

#[test]
fn json_output_reports_outcome() {
  let env = TestEnv::with_manifest("PODS: []\n");
  env.build_cmd().assert().success();

  env
    .build_cmd()
    .args(["-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"outcome\": \"restored\""));
}

#[test]
fn relative_project_resolves_against_invocation_directory() {
  let env = TestEnv::with_manifest("PODS: []\n");
  env.write_file("Pods/Pods.xcodeproj/project.pbxproj", "// project");
  let builder = format!("test -e \"$PODBIN_PROJECT/project.pbxproj\" && {}", env.fake_builder());

  env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App", "--project", "Pods/Pods.xcodeproj", "--builder"])
    .arg(builder)
    .assert()
    .success();

  assert_eq!(env.build_calls(), 1);
}

#[test]
fn default_project_is_absolute() {
  let env = TestEnv::with_manifest("PODS: []\n");
  env.write_file("Pods/Pods.xcodeproj/project.pbxproj", "// project");
  let builder = format!("test -e \"$PODBIN_PROJECT\" && {}", env.fake_builder());

  env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App", "--builder"])
    .arg(builder)
    .assert()
    .success();
}

#[test]
fn failing_builder_stderr_reported_once() {
  let env = TestEnv::with_manifest("PODS: []\n");

  let assert = env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App", "--builder", "printf 'sch%sme not found\\n' e >&2; exit 65"])
    .assert()
    .failure();

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
  assert_eq!(stderr.matches("scheme not found").count(), 1, "{}", stderr);
}

#[test]
fn archive_without_products_fails_build() {
  let env = TestEnv::with_manifest("PODS: []\n");

  env
    .podbin_cmd()
    .args(["build", "--scheme", "Pods-App", "--builder", "mkdir -p Empty.xcarchive && echo Empty.xcarchive"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no products directory"));

  assert!(!env.cache_path().join("Manifest.lock").exists());
}
