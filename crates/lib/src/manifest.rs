//! Dependency manifest fingerprint.
//!
//! The manifest is an opaque file written by the dependency resolver. Its exact
//! bytes identify the dependency set, so two manifests are equal only when they
//! are byte-identical. No parsing or normalization is done.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::OutputLayout;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest not found at '{0}'; resolve dependencies before building")]
  Missing(PathBuf),

  #[error("manifest path is not a file: {0}")]
  NotAFile(PathBuf),

  #[error("failed to read manifest '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// The current manifest for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  path: PathBuf,
}

impl Manifest {
  /// Locate the manifest inside the dependency folder.
  ///
  /// A missing manifest is a configuration problem, not a cache miss.
  pub fn locate(pods_folder: &Path, layout: &OutputLayout) -> Result<Self, ManifestError> {
    Self::from_path(pods_folder.join(&layout.manifest_file))
  }

  pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ManifestError> {
    let path = path.into();
    match path.metadata() {
      Ok(m) if m.is_file() => Ok(Self { path }),
      Ok(_) => Err(ManifestError::NotAFile(path)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ManifestError::Missing(path)),
      Err(e) => Err(ManifestError::Read { path, source: e }),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Compare against another manifest file on disk.
  pub fn matches(&self, other: &Path) -> bool {
    manifests_equal(&self.path, other)
  }
}

/// Byte-for-byte comparison of two files.
///
/// Missing or unreadable files compare as not equal.
pub fn manifests_equal(a: &Path, b: &Path) -> bool {
  match compare_files(a, b) {
    Ok(equal) => equal,
    Err(e) => {
      debug!(a = %a.display(), b = %b.display(), error = %e, "manifest comparison failed");
      false
    }
  }
}

fn compare_files(a: &Path, b: &Path) -> io::Result<bool> {
  let file_a = File::open(a)?;
  let file_b = File::open(b)?;

  if file_a.metadata()?.len() != file_b.metadata()?.len() {
    return Ok(false);
  }

  let mut reader_a = BufReader::new(file_a);
  let mut reader_b = BufReader::new(file_b);
  let mut buf_a = vec![0u8; CHUNK_SIZE];
  let mut buf_b = vec![0u8; CHUNK_SIZE];

  loop {
    let n = read_full(&mut reader_a, &mut buf_a)?;
    let m = read_full(&mut reader_b, &mut buf_b)?;
    if n != m || buf_a[..n] != buf_b[..m] {
      return Ok(false);
    }
    if n == 0 {
      return Ok(true);
    }
  }
}

/// Fill `buf` as far as the reader allows; returns fewer bytes only at EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
  let mut filled = 0;
  while filled < buf.len() {
    match reader.read(&mut buf[filled..]) {
      Ok(0) => break,
      Ok(n) => filled += n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(e),
    }
  }
  Ok(filled)
}
