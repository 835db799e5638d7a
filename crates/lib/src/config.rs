//! Invocation configuration.
//!
//! Directory and file names used in the output tree are carried in
//! [`OutputLayout`] and passed to the cache store and orchestrator explicitly.

use std::path::{Path, PathBuf};

use crate::consts::{
  CACHE_DIR_ENV, DEFAULT_ARCHIVE_INSTALL_PATH, DEFAULT_BUNDLES_DIR, DEFAULT_CACHE_DIR, DEFAULT_FRAMEWORKS_DIR,
  DEFAULT_MANIFEST_FILE,
};

/// Names of the entries that make up an output directory.
///
/// ```text
/// <output_dir>/
/// ├── XcodeFrameworks/     # frameworks_dir
/// ├── Bundles/             # bundles_dir
/// └── Cache/               # cache_dir
///     ├── XcodeFrameworks.tar.gz
///     ├── Bundles.tar.gz
///     └── Manifest.lock    # manifest_file
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
  pub frameworks_dir: String,
  pub bundles_dir: String,
  pub cache_dir: String,
  pub manifest_file: String,
  /// Where frameworks are installed inside a build archive's `Products/` directory.
  pub archive_install_path: PathBuf,
}

impl Default for OutputLayout {
  fn default() -> Self {
    Self {
      frameworks_dir: DEFAULT_FRAMEWORKS_DIR.to_string(),
      bundles_dir: DEFAULT_BUNDLES_DIR.to_string(),
      cache_dir: DEFAULT_CACHE_DIR.to_string(),
      manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
      archive_install_path: PathBuf::from(DEFAULT_ARCHIVE_INSTALL_PATH),
    }
  }
}

impl OutputLayout {
  /// Cache root for `output_dir`.
  ///
  /// `PODBIN_CACHE_DIR` overrides the default `<output_dir>/<cache_dir>`.
  pub fn cache_root(&self, output_dir: &Path) -> PathBuf {
    if let Ok(path) = std::env::var(CACHE_DIR_ENV)
      && !path.is_empty()
    {
      return PathBuf::from(path);
    }

    output_dir.join(&self.cache_dir)
  }
}

/// How thoroughly the cache is checked before it is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validation {
  /// Every entry exists and the manifest matches.
  Existence,
  /// As `Existence`, and every archive decodes to the end.
  #[default]
  Integrity,
}

/// Everything one build invocation needs.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// The dependency folder; holds the manifest and prebuilt bundles.
  pub pods_folder: PathBuf,
  /// Project handed to the builder.
  pub project: String,
  /// Scheme handed to the builder.
  pub scheme: String,
  pub output_dir: PathBuf,
  /// Transient working directory for the builder, removed after a build.
  pub build_dir: PathBuf,
  pub verbose: bool,
  pub layout: OutputLayout,
  pub validation: Validation,
}

impl BuildConfig {
  /// Config with the conventional defaults: project `<pods_folder>/Pods.xcodeproj`
  /// and build directory `<output_dir>/tmp`.
  pub fn new(pods_folder: impl Into<PathBuf>, scheme: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
    let pods_folder = pods_folder.into();
    let output_dir = output_dir.into();
    Self {
      project: pods_folder.join("Pods.xcodeproj").to_string_lossy().into_owned(),
      build_dir: output_dir.join("tmp"),
      pods_folder,
      scheme: scheme.into(),
      output_dir,
      verbose: false,
      layout: OutputLayout::default(),
      validation: Validation::default(),
    }
  }

  pub fn frameworks_output(&self) -> PathBuf {
    self.output_dir.join(&self.layout.frameworks_dir)
  }

  pub fn bundles_output(&self) -> PathBuf {
    self.output_dir.join(&self.layout.bundles_dir)
  }

  pub fn cache_root(&self) -> PathBuf {
    self.layout.cache_root(&self.output_dir)
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.pods_folder.join(&self.layout.manifest_file)
  }
}
