//! Resource bundle collection.
//!
//! Bundles are directories with a `.bundle` extension. They are gathered from
//! the built products and from the dependency folder into the bundles output.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::util::fs::copy_dir_all;

#[derive(Debug, Error)]
pub enum BundleError {
  #[error("failed to scan '{path}' for bundles: {message}")]
  Scan { path: PathBuf, message: String },

  #[error("build archive has no products directory at '{0}'")]
  ProductsMissing(PathBuf),

  #[error("failed to copy bundle from '{from}' to '{to}': {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn has_extension(path: &Path, extension: &str) -> bool {
  path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Directories under `root` whose extension is `extension` (with or without a
/// leading dot), sorted by path.
///
/// Without `recursive` only direct children are considered. A matching
/// directory is not searched further.
pub fn find_dirs_with_extension(root: &Path, extension: &str, recursive: bool) -> Result<Vec<PathBuf>, BundleError> {
  let extension = extension.strip_prefix('.').unwrap_or(extension);
  let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
  if !recursive {
    walker = walker.max_depth(1);
  }

  let mut found = Vec::new();
  let mut it = walker.into_iter();
  while let Some(entry) = it.next() {
    let entry = entry.map_err(|e| BundleError::Scan {
      path: root.to_path_buf(),
      message: e.to_string(),
    })?;
    if entry.file_type().is_dir() && has_extension(entry.path(), extension) {
      found.push(entry.path().to_path_buf());
      it.skip_current_dir();
    }
  }

  Ok(found)
}

/// Copy every matching directory found under `source` into `dest`.
///
/// When two bundles share a name the first one found is kept. Returns the
/// number of bundles copied.
pub fn copy_matching_dirs(source: &Path, dest: &Path, extension: &str, recursive: bool) -> Result<usize, BundleError> {
  let mut copied = 0;
  for dir in find_dirs_with_extension(source, extension, recursive)? {
    let Some(name) = dir.file_name() else {
      continue;
    };
    let target = dest.join(name);
    if target.exists() {
      warn!(bundle = %dir.display(), existing = %target.display(), "skipping bundle with duplicate name");
      continue;
    }

    copy_dir_all(&dir, &target).map_err(|e| BundleError::Copy {
      from: dir.clone(),
      to: target.clone(),
      source: e,
    })?;
    debug!(from = %dir.display(), to = %target.display(), "copied bundle");
    copied += 1;
  }

  Ok(copied)
}
