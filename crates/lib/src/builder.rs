//! The external build step.
//!
//! Compiling the dependency graph is delegated to a [`Builder`]. It receives a
//! [`BuildRequest`] and reports the archive locations it produced; the
//! orchestrator never looks inside the build beyond those locations.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::BuildConfig;

/// Errors reported by a builder.
#[derive(Debug, Error)]
pub enum BuilderError {
  /// No build command was configured.
  #[error("no build command configured (pass --builder or set PODBIN_BUILDER)")]
  NoCommand,

  /// The build process could not be started.
  #[error("failed to start build command '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: io::Error,
  },

  /// The build ran and exited unsuccessfully.
  #[error("build command failed with exit code {code:?}: {cmd}\n{stderr}")]
  Failed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },

  /// The build working directory could not be prepared.
  #[error("failed to prepare build directory '{path}': {source}")]
  WorkDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// What to build and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  pub project: String,
  pub scheme: String,
  /// Directory the builder writes finished frameworks into.
  pub output_dir: PathBuf,
  /// Scratch directory for intermediate build products.
  pub build_dir: PathBuf,
  pub verbose: bool,
}

impl BuildRequest {
  pub fn from_config(config: &BuildConfig) -> Self {
    Self {
      project: config.project.clone(),
      scheme: config.scheme.clone(),
      output_dir: config.frameworks_output(),
      build_dir: config.build_dir.clone(),
      verbose: config.verbose,
    }
  }
}

/// A build archive produced by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
  path: PathBuf,
}

impl ArtifactLocation {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Directory holding the installed products, `<archive>/Products/<install_path>`.
  pub fn products_dir(&self, install_path: &Path) -> PathBuf {
    self.path.join("Products").join(install_path)
  }
}

/// The capability that performs the expensive dependency build.
pub trait Builder {
  fn build(&self, request: &BuildRequest) -> Result<Vec<ArtifactLocation>, BuilderError>;
}

impl<B: Builder + ?Sized> Builder for &B {
  fn build(&self, request: &BuildRequest) -> Result<Vec<ArtifactLocation>, BuilderError> {
    (**self).build(request)
  }
}

/// Runs the build as a shell command.
///
/// The request is exported to the command's environment as `PODBIN_PROJECT`,
/// `PODBIN_SCHEME`, `PODBIN_OUTPUT_DIR`, `PODBIN_BUILD_DIR` and `PODBIN_VERBOSE`.
/// The command runs in the build directory and prints one artifact location per
/// line on stdout; relative locations are resolved against the build directory.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
  command: String,
  shell: Option<String>,
}

impl CommandBuilder {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      shell: None,
    }
  }

  /// Use `shell` instead of the platform default.
  pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
    self.shell = Some(shell.into());
    self
  }

  pub fn command(&self) -> &str {
    &self.command
  }
}

impl Builder for CommandBuilder {
  fn build(&self, request: &BuildRequest) -> Result<Vec<ArtifactLocation>, BuilderError> {
    if self.command.trim().is_empty() {
      return Err(BuilderError::NoCommand);
    }

    std::fs::create_dir_all(&request.build_dir).map_err(|e| BuilderError::WorkDir {
      path: request.build_dir.clone(),
      source: e,
    })?;

    let (shell_cmd, shell_args) = get_shell(self.shell.as_deref());
    info!(cmd = %self.command, scheme = %request.scheme, "running build command");

    let output = Command::new(&shell_cmd)
      .args(&shell_args)
      .arg(&self.command)
      .current_dir(&request.build_dir)
      .env("PODBIN_PROJECT", &request.project)
      .env("PODBIN_SCHEME", &request.scheme)
      .env("PODBIN_OUTPUT_DIR", &request.output_dir)
      .env("PODBIN_BUILD_DIR", &request.build_dir)
      .env("PODBIN_VERBOSE", if request.verbose { "1" } else { "0" })
      .output()
      .map_err(|e| BuilderError::Spawn {
        cmd: self.command.clone(),
        source: e,
      })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "build command stderr");
    }

    if !output.status.success() {
      return Err(BuilderError::Failed {
        cmd: self.command.clone(),
        code: output.status.code(),
        stderr: stderr.trim().to_string(),
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let artifacts = parse_artifact_lines(&stdout, &request.build_dir);
    info!(count = artifacts.len(), "build produced artifacts");
    Ok(artifacts)
  }
}

fn parse_artifact_lines(stdout: &str, base: &Path) -> Vec<ArtifactLocation> {
  stdout
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(|line| {
      let path = Path::new(line);
      if path.is_absolute() {
        ArtifactLocation::new(path)
      } else {
        ArtifactLocation::new(base.join(path))
      }
    })
    .collect()
}

/// Shell and argument prefix used to run the build command.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}
