//! Implementation of the `podbin build` command.
//!
//! Restores frameworks and bundles from the cache when the manifest is
//! unchanged, otherwise runs the build command and refreshes the cache.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::debug;

use podbin_lib::builder::CommandBuilder;
use podbin_lib::cache::CacheStore;
use podbin_lib::config::{BuildConfig, Validation};
use podbin_lib::consts::BUILDER_ENV;
use podbin_lib::orchestrate::{Orchestrator, Outcome};

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success};

/// Arguments of `podbin build` after parsing.
pub struct BuildArgs {
  pub scheme: String,
  pub pods_folder: PathBuf,
  pub project: Option<String>,
  pub output_dir: PathBuf,
  pub build_dir: Option<PathBuf>,
  pub builder: Option<String>,
  pub shell: Option<String>,
  pub validation: Validation,
  pub verbose: bool,
  pub output: OutputFormat,
}

pub fn cmd_build(args: BuildArgs) -> Result<()> {
  if args.scheme.trim().is_empty() {
    bail!("scheme must not be empty");
  }

  let pods_folder = absolute(&args.pods_folder)?;
  let output_dir = absolute(&args.output_dir)?;

  let mut config = BuildConfig::new(pods_folder, args.scheme, output_dir);
  if let Some(project) = args.project {
    config.project = absolute(Path::new(&project))?.to_string_lossy().into_owned();
  }
  if let Some(build_dir) = args.build_dir {
    config.build_dir = absolute(&build_dir)?;
  }
  config.verbose = args.verbose;
  config.validation = args.validation;

  let command = args
    .builder
    .or_else(|| std::env::var(BUILDER_ENV).ok())
    .unwrap_or_default();
  let mut builder = CommandBuilder::new(command);
  if let Some(shell) = args.shell {
    builder = builder.with_shell(shell);
  }

  let store = CacheStore::new(config.cache_root(), config.layout.clone()).with_validation(config.validation);
  debug!(cache = %store.root().display(), "using cache root");

  let report = Orchestrator::new(config, store, builder)
    .run()
    .context("Build failed")?;

  if args.output.is_json() {
    print_json(&report)?;
  } else {
    match report.outcome {
      Outcome::Restored => print_success("Restored binaries from cache"),
      Outcome::Built => print_success("Built binaries and refreshed cache"),
    }
    if report.outcome == Outcome::Built {
      print_stat("Artifacts", &report.artifacts.to_string());
      print_stat("Bundles copied", &report.bundles_copied.to_string());
    }
    print_stat("Frameworks", &report.frameworks_dir.display().to_string());
    print_stat("Bundles", &report.bundles_dir.display().to_string());
    print_stat("Cache", &report.cache_root.display().to_string());
    print_stat("Duration", &format_duration(Duration::from_millis(report.elapsed_ms)));
  }

  Ok(())
}

/// Resolve `path` against the working directory without requiring it to exist.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }
  let cwd = std::env::current_dir().context("Failed to read current directory")?;
  let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);
  Ok(cwd.join(path))
}
