use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::CacheEntryKind;
use crate::archive::{self, ArchiveError};
use crate::config::{OutputLayout, Validation};
use crate::manifest::manifests_equal;
use crate::util::fs::{copy_file_atomic, disk_usage, remove_path};

/// Errors that can occur while saving or restoring cache entries.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error(transparent)]
  Archive(#[from] ArchiveError),

  #[error("cache filesystem error on '{path}': {source}")]
  Filesystem {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot cache {kind} from '{path}': expected a {expected}")]
  InvalidSource {
    kind: CacheEntryKind,
    path: PathBuf,
    expected: &'static str,
  },
}

fn fs_error(path: &Path) -> impl FnOnce(io::Error) -> CacheError + '_ {
  move |source| CacheError::Filesystem {
    path: path.to_path_buf(),
    source,
  }
}

/// Outcome of restoring one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restore {
  /// The stored archive was unpacked; holds the restored top-level paths.
  Restored(Vec<PathBuf>),
  /// No stored object exists for the kind at the given path.
  Missing(PathBuf),
  /// The kind has nothing to restore into a build tree.
  Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
  pub kind: CacheEntryKind,
  pub path: PathBuf,
  pub present: bool,
  pub size_bytes: u64,
}

/// Snapshot of what a cache root holds.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
  pub root: PathBuf,
  pub entries: Vec<EntryStatus>,
  /// Every kind has a stored object.
  pub complete: bool,
  /// Whether the stored manifest equals the current one, when a current
  /// manifest was supplied.
  pub manifest_matches: Option<bool>,
}

impl CacheStatus {
  pub fn total_bytes(&self) -> u64 {
    self.entries.iter().map(|e| e.size_bytes).sum()
  }
}

/// The cache root and the operations over it.
///
/// Holds at most one object per [`CacheEntryKind`]. Only this type writes into
/// the root.
#[derive(Debug, Clone)]
pub struct CacheStore {
  root: PathBuf,
  layout: OutputLayout,
  validation: Validation,
}

impl CacheStore {
  pub fn new(root: impl Into<PathBuf>, layout: OutputLayout) -> Self {
    Self {
      root: root.into(),
      layout,
      validation: Validation::default(),
    }
  }

  pub fn with_validation(mut self, validation: Validation) -> Self {
    self.validation = validation;
    self
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn layout(&self) -> &OutputLayout {
    &self.layout
  }

  /// Path of the stored object for `kind`.
  pub fn entry_path(&self, kind: CacheEntryKind) -> PathBuf {
    self.root.join(kind.cache_name(&self.layout))
  }

  /// Whether a stored object exists for `kind`.
  pub fn exists(&self, kind: CacheEntryKind) -> bool {
    self.entry_path(kind).is_file()
  }

  /// Whether the cache can be restored in place of a build for `current_manifest`.
  ///
  /// Requires a stored object for every kind and a byte-identical stored
  /// manifest. With [`Validation::Integrity`] every archive must also decode
  /// to the end. Stops at the first failed check.
  pub fn is_valid(&self, current_manifest: &Path) -> bool {
    for kind in CacheEntryKind::ALL {
      if !self.exists(kind) {
        debug!(kind = %kind, path = %self.entry_path(kind).display(), "cache entry missing");
        return false;
      }
    }

    let stored_manifest = self.entry_path(CacheEntryKind::Manifest);
    if !manifests_equal(&stored_manifest, current_manifest) {
      debug!(
        stored = %stored_manifest.display(),
        current = %current_manifest.display(),
        "manifest changed since cache was saved"
      );
      return false;
    }

    if self.validation == Validation::Integrity {
      for kind in CacheEntryKind::ALL.into_iter().filter(|k| k.compressed()) {
        if let Err(e) = archive::verify(&self.entry_path(kind)) {
          debug!(kind = %kind, error = %e, "cached archive failed verification");
          return false;
        }
      }
    }

    true
  }

  /// Store `source` as the object for `kind`, replacing any previous one.
  ///
  /// Compressed kinds expect a directory and pack it under its own name; the
  /// manifest expects a file and is copied verbatim.
  pub fn save(&self, source: &Path, kind: CacheEntryKind) -> Result<(), CacheError> {
    fs::create_dir_all(&self.root).map_err(fs_error(&self.root))?;

    let dest = self.entry_path(kind);
    remove_path(&dest).map_err(fs_error(&dest))?;

    info!(kind = %kind, source = %source.display(), dest = %dest.display(), "caching");

    if kind.compressed() {
      archive::pack(source, &dest)?;
    } else {
      if !source.is_file() {
        return Err(CacheError::InvalidSource {
          kind,
          path: source.to_path_buf(),
          expected: "file",
        });
      }
      copy_file_atomic(source, &dest).map_err(fs_error(&dest))?;
    }

    Ok(())
  }

  /// Restore `kind` into `dest_parent`.
  ///
  /// For compressed kinds the packed directory reappears under `dest_parent`
  /// with the name it was saved under. The manifest is never restored.
  /// A missing stored object is reported as [`Restore::Missing`]; it is up to
  /// the caller to decide whether that is fatal.
  pub fn restore(&self, kind: CacheEntryKind, dest_parent: &Path) -> Result<Restore, CacheError> {
    if !kind.compressed() {
      return Ok(Restore::Skipped);
    }

    let stored = self.entry_path(kind);
    if !stored.is_file() {
      warn!(kind = %kind, path = %stored.display(), "couldn't restore cache entry: not found");
      return Ok(Restore::Missing(stored));
    }

    let restored = archive::unpack(&stored, dest_parent)?;
    info!(kind = %kind, dest = %dest_parent.display(), "restored from cache");
    Ok(Restore::Restored(restored))
  }

  /// Remove every stored object, leaving an empty root.
  pub fn clear(&self) -> Result<(), CacheError> {
    remove_path(&self.root).map_err(fs_error(&self.root))?;
    fs::create_dir_all(&self.root).map_err(fs_error(&self.root))?;
    debug!(root = %self.root.display(), "cleared cache");
    Ok(())
  }

  /// Describe the cache contents, optionally against a current manifest.
  pub fn status(&self, current_manifest: Option<&Path>) -> CacheStatus {
    let entries: Vec<EntryStatus> = CacheEntryKind::ALL
      .into_iter()
      .map(|kind| {
        let path = self.entry_path(kind);
        let present = path.is_file();
        EntryStatus {
          kind,
          size_bytes: if present { disk_usage(&path) } else { 0 },
          path,
          present,
        }
      })
      .collect();

    let complete = entries.iter().all(|e| e.present);
    let manifest_matches =
      current_manifest.map(|current| manifests_equal(&self.entry_path(CacheEntryKind::Manifest), current));

    CacheStatus {
      root: self.root.clone(),
      entries,
      complete,
      manifest_matches,
    }
  }
}
