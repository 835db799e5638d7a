//! Restore-or-build control flow for one invocation.
//!
//! ```text
//! Prepare → CheckCache ─valid──→ Restore                              (done)
//!                      └invalid→ Build → Populate → SaveCache → Cleanup (done)
//! ```
//!
//! Output directories are reset on every run. A cache that claims to be valid
//! but cannot be restored is an error; the run never falls back to building in
//! that case. A failed build leaves the cache untouched.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::builder::{ArtifactLocation, BuildRequest, Builder, BuilderError};
use crate::bundles::{BundleError, copy_matching_dirs};
use crate::cache::{CacheEntryKind, CacheError, CacheStore, Restore};
use crate::config::BuildConfig;
use crate::consts::BUNDLE_EXTENSION;
use crate::manifest::{Manifest, ManifestError};
use crate::util::fs::{clear_dir, remove_path};

/// The step of a run, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Prepare,
  CheckCache,
  Restore,
  Build,
  Populate,
  SaveCache,
  Cleanup,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Prepare => "prepare",
      Stage::CheckCache => "check cache",
      Stage::Restore => "restore",
      Stage::Build => "build",
      Stage::Populate => "populate",
      Stage::SaveCache => "save cache",
      Stage::Cleanup => "cleanup",
    };
    f.write_str(name)
  }
}

/// Errors that end a run.
///
/// Messages embed the underlying error; no variant has a `source`.
#[derive(Debug, Error)]
pub enum OrchestrateError {
  /// Required input is missing or unusable.
  #[error("check cache: {0}")]
  Configuration(ManifestError),

  /// Creating or clearing a working directory failed.
  #[error("{stage}: filesystem error on '{path}': {error}")]
  Filesystem {
    stage: Stage,
    path: PathBuf,
    error: io::Error,
  },

  /// The external builder failed.
  #[error("build: {0}")]
  Build(BuilderError),

  /// Collecting resource bundles failed.
  #[error("populate: {0}")]
  Populate(BundleError),

  /// Saving to the cache failed.
  #[error("{stage}: {error}")]
  Cache { stage: Stage, error: CacheError },

  /// The cache passed validation but could not be restored.
  #[error("restore: cache was reported valid but {kind} could not be restored: {reason}")]
  CacheConsistency { kind: CacheEntryKind, reason: String },
}

/// How a successful run obtained its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Restored,
  Built,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub outcome: Outcome,
  /// Artifact locations reported by the builder; 0 when restored.
  pub artifacts: usize,
  /// Bundles copied during populate; 0 when restored.
  pub bundles_copied: usize,
  pub frameworks_dir: PathBuf,
  pub bundles_dir: PathBuf,
  pub cache_root: PathBuf,
  pub elapsed_ms: u64,
}

/// Drives one invocation against a cache store and a builder.
pub struct Orchestrator<B: Builder> {
  config: BuildConfig,
  store: CacheStore,
  builder: B,
}

impl<B: Builder> Orchestrator<B> {
  pub fn new(config: BuildConfig, store: CacheStore, builder: B) -> Self {
    Self { config, store, builder }
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn store(&self) -> &CacheStore {
    &self.store
  }

  /// Run the full state machine.
  pub fn run(&self) -> Result<RunReport, OrchestrateError> {
    let start = Instant::now();

    enter(Stage::Prepare);
    let frameworks_dir = self.prepare_output(self.config.frameworks_output())?;
    let bundles_dir = self.prepare_output(self.config.bundles_output())?;

    enter(Stage::CheckCache);
    let manifest =
      Manifest::locate(&self.config.pods_folder, &self.config.layout).map_err(OrchestrateError::Configuration)?;

    if self.store.is_valid(manifest.path()) {
      info!(cache = %self.store.root().display(), "cache is valid, restoring");
      enter(Stage::Restore);
      self.restore_all()?;

      return Ok(RunReport {
        outcome: Outcome::Restored,
        artifacts: 0,
        bundles_copied: 0,
        frameworks_dir,
        bundles_dir,
        cache_root: self.store.root().to_path_buf(),
        elapsed_ms: elapsed_ms(start),
      });
    }

    info!(scheme = %self.config.scheme, "cache is missing or stale, building");
    enter(Stage::Build);
    let request = BuildRequest::from_config(&self.config);
    let artifacts = self.builder.build(&request).map_err(OrchestrateError::Build)?;

    enter(Stage::Populate);
    let bundles_copied = self.populate(&artifacts, &bundles_dir)?;
    enter(Stage::SaveCache);
    self.save_cache(&frameworks_dir, &bundles_dir, &manifest)?;
    enter(Stage::Cleanup);
    self.cleanup();

    Ok(RunReport {
      outcome: Outcome::Built,
      artifacts: artifacts.len(),
      bundles_copied,
      frameworks_dir,
      bundles_dir,
      cache_root: self.store.root().to_path_buf(),
      elapsed_ms: elapsed_ms(start),
    })
  }

  /// Ensure `dir` exists and is empty.
  fn prepare_output(&self, dir: PathBuf) -> Result<PathBuf, OrchestrateError> {
    let fs_error = |error| OrchestrateError::Filesystem {
      stage: Stage::Prepare,
      path: dir.clone(),
      error,
    };
    std::fs::create_dir_all(&dir).map_err(fs_error)?;
    clear_dir(&dir).map_err(fs_error)?;
    debug!(dir = %dir.display(), "prepared output directory");
    Ok(dir)
  }

  fn restore_all(&self) -> Result<(), OrchestrateError> {
    for kind in CacheEntryKind::ALL {
      let expected = self.config.output_dir.join(kind.live_name(&self.config.layout));
      match self.store.restore(kind, &self.config.output_dir) {
        Ok(Restore::Skipped) => {}
        Ok(Restore::Restored(paths)) if paths.contains(&expected) => {}
        Ok(Restore::Restored(paths)) => {
          return Err(OrchestrateError::CacheConsistency {
            kind,
            reason: format!("archive restored {:?} instead of '{}'", paths, expected.display()),
          });
        }
        Ok(Restore::Missing(path)) => {
          return Err(OrchestrateError::CacheConsistency {
            kind,
            reason: format!("stored object '{}' is missing", path.display()),
          });
        }
        Err(e) => {
          return Err(OrchestrateError::CacheConsistency {
            kind,
            reason: e.to_string(),
          });
        }
      }
    }
    Ok(())
  }

  /// Collect bundles from the first build archive and from the dependency folder.
  fn populate(&self, artifacts: &[ArtifactLocation], bundles_dir: &Path) -> Result<usize, OrchestrateError> {
    let mut copied = 0;

    // Bundles are resources, identical across architectures, so one archive is enough.
    match artifacts.first() {
      Some(artifact) => {
        let products = artifact.products_dir(&self.config.layout.archive_install_path);
        if !products.is_dir() {
          return Err(OrchestrateError::Populate(BundleError::ProductsMissing(products)));
        }
        copied +=
          copy_matching_dirs(&products, bundles_dir, BUNDLE_EXTENSION, false).map_err(OrchestrateError::Populate)?;
      }
      None => debug!("builder reported no artifacts, skipping product bundles"),
    }

    copied += copy_matching_dirs(&self.config.pods_folder, bundles_dir, BUNDLE_EXTENSION, true)
      .map_err(OrchestrateError::Populate)?;

    info!(count = copied, dest = %bundles_dir.display(), "collected bundles");
    Ok(copied)
  }

  /// Replace the whole cache with this run's output. The manifest is saved last.
  fn save_cache(&self, frameworks_dir: &Path, bundles_dir: &Path, manifest: &Manifest) -> Result<(), OrchestrateError> {
    let cache_error = |error| OrchestrateError::Cache {
      stage: Stage::SaveCache,
      error,
    };

    self.store.clear().map_err(cache_error)?;
    for kind in CacheEntryKind::ALL {
      let source = match kind {
        CacheEntryKind::Frameworks => frameworks_dir,
        CacheEntryKind::Bundles => bundles_dir,
        CacheEntryKind::Manifest => manifest.path(),
      };
      self.store.save(source, kind).map_err(cache_error)?;
    }

    info!(cache = %self.store.root().display(), "saved cache");
    Ok(())
  }

  /// Remove the transient build directory. Failures are only logged.
  fn cleanup(&self) {
    let build_dir = &self.config.build_dir;
    if self.config.output_dir.starts_with(build_dir) {
      warn!(build_dir = %build_dir.display(), "build directory contains the output directory, not removing it");
      return;
    }
    if self.config.pods_folder.starts_with(build_dir) {
      warn!(build_dir = %build_dir.display(), "build directory contains the dependency folder, not removing it");
      return;
    }

    if let Err(e) = remove_path(build_dir) {
      warn!(build_dir = %build_dir.display(), error = %e, "failed to remove build directory");
    }
  }
}

fn enter(stage: Stage) {
  debug!(stage = %stage, "entering stage");
}

fn elapsed_ms(start: Instant) -> u64 {
  u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
