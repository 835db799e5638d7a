//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated project directory with a `Pods` folder and an output directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project whose manifest has `manifest` as its contents.
  pub fn with_manifest(manifest: &str) -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("Pods/Manifest.lock", manifest);
    env.write_file("Pods/Kit/Resources/Kit.bundle/en.strings", "\"hello\" = \"hello\";");
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn output_path(&self) -> PathBuf {
    self.root().join("PodsBinaries")
  }

  pub fn cache_path(&self) -> PathBuf {
    self.output_path().join("Cache")
  }

  /// File the fake build command appends to on every invocation.
  pub fn calls_path(&self) -> PathBuf {
    self.root().join("calls.log")
  }

  /// Number of times the build command has run.
  pub fn build_calls(&self) -> usize {
    std::fs::read_to_string(self.calls_path())
      .map(|s| s.lines().count())
      .unwrap_or(0)
  }

  /// A shell build command that installs `Kit.xcframework` into the frameworks
  /// output and reports one archive holding `Res.bundle`.
  pub fn fake_builder(&self) -> String {
    format!(
      concat!(
        "echo run >> '{calls}' && ",
        "mkdir -p \"$PODBIN_OUTPUT_DIR/Kit.xcframework\" && ",
        "echo binary > \"$PODBIN_OUTPUT_DIR/Kit.xcframework/Kit\" && ",
        "mkdir -p App.xcarchive/Products/Library/Frameworks/Res.bundle && ",
        "echo res > App.xcarchive/Products/Library/Frameworks/Res.bundle/res.txt && ",
        "echo App.xcarchive"
      ),
      calls = self.calls_path().display()
    )
  }

  /// A `podbin` command running in the project directory with a clean environment.
  pub fn podbin_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("podbin");
    cmd.current_dir(self.root());
    cmd.env_remove("PODBIN_CACHE_DIR");
    cmd.env_remove("PODBIN_BUILDER");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `podbin build --scheme Pods-App` with the fake builder.
  pub fn build_cmd(&self) -> Command {
    let mut cmd = self.podbin_cmd();
    cmd.args(["build", "--scheme", "Pods-App", "--builder"]).arg(self.fake_builder());
    cmd
  }
}
