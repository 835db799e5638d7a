//! Directory archiving for cache entries.
//!
//! Output directories are stored as gzip-compressed tar archives whose single
//! top-level entry is the directory's own name:
//!
//! ```text
//! XcodeFrameworks.tar.gz
//! └── XcodeFrameworks/
//!     ├── Alamofire.xcframework/...
//!     └── SnapKit.xcframework/...
//! ```
//!
//! Unpacking into the source's parent therefore reproduces the same tree.
//! Both directions stage their work in a temporary location next to the final
//! path and only move it into place once it is complete.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::Archive;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::util::fs::remove_path;

/// Prefix of the staging directory used while unpacking.
const STAGING_PREFIX: &str = ".podbin-unpack-";

/// Errors that can occur while packing, unpacking, or verifying an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
  /// The directory to pack does not exist.
  #[error("source directory does not exist: {0}")]
  SourceMissing(PathBuf),

  /// The path to pack is not a directory.
  #[error("source is not a directory: {0}")]
  NotADirectory(PathBuf),

  /// The directory to pack has no final path component (e.g. `/` or `..`).
  #[error("source directory has no name to archive under: {0}")]
  UnnamedSource(PathBuf),

  /// The archive to read does not exist.
  #[error("archive not found: {0}")]
  ArchiveMissing(PathBuf),

  /// Reading or writing a file failed.
  #[error("i/o error on '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Extraction failed part way through.
  #[error("failed to extract '{path}': {source}")]
  Extract {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The archive could not be decoded to the end.
  #[error("archive '{path}' is corrupt: {source}")]
  Corrupt {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The archive decoded cleanly but holds nothing.
  #[error("archive '{0}' contains no entries")]
  Empty(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
  move |source| ArchiveError::Io {
    path: path.to_path_buf(),
    source,
  }
}

fn parent_or_cwd(path: &Path) -> &Path {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  }
}

fn open_archive(archive_path: &Path) -> Result<File, ArchiveError> {
  File::open(archive_path).map_err(|e| {
    if e.kind() == io::ErrorKind::NotFound {
      ArchiveError::ArchiveMissing(archive_path.to_path_buf())
    } else {
      ArchiveError::Io {
        path: archive_path.to_path_buf(),
        source: e,
      }
    }
  })
}

/// Pack `source_dir` into a `.tar.gz` at `archive_path`.
///
/// The archive's internal root is the file name of `source_dir`, not its full
/// path. Any existing file at `archive_path` is replaced, but only after the
/// new archive has been fully written.
pub fn pack(source_dir: &Path, archive_path: &Path) -> Result<(), ArchiveError> {
  let metadata = fs::metadata(source_dir).map_err(|e| {
    if e.kind() == io::ErrorKind::NotFound {
      ArchiveError::SourceMissing(source_dir.to_path_buf())
    } else {
      ArchiveError::Io {
        path: source_dir.to_path_buf(),
        source: e,
      }
    }
  })?;
  if !metadata.is_dir() {
    return Err(ArchiveError::NotADirectory(source_dir.to_path_buf()));
  }

  let name = source_dir
    .file_name()
    .ok_or_else(|| ArchiveError::UnnamedSource(source_dir.to_path_buf()))?;

  let archive_dir = parent_or_cwd(archive_path);
  fs::create_dir_all(archive_dir).map_err(io_error(archive_dir))?;

  let temp = NamedTempFile::new_in(archive_dir).map_err(io_error(archive_dir))?;
  let encoder = GzEncoder::new(BufWriter::new(temp), Compression::default());

  let mut builder = tar::Builder::new(encoder);
  builder.follow_symlinks(false);
  builder
    .append_dir_all(name, source_dir)
    .map_err(io_error(source_dir))?;

  let encoder = builder.into_inner().map_err(io_error(archive_path))?;
  let writer = encoder.finish().map_err(io_error(archive_path))?;
  let temp = writer
    .into_inner()
    .map_err(|e| io_error(archive_path)(e.into_error()))?;
  temp.as_file().sync_all().map_err(io_error(archive_path))?;
  temp
    .persist(archive_path)
    .map_err(|e| io_error(archive_path)(e.error))?;

  info!(source = %source_dir.display(), archive = %archive_path.display(), "packed directory");
  Ok(())
}

/// Unpack the archive at `archive_path` into `dest_parent`.
///
/// Extraction happens in a staging directory inside `dest_parent`. Each
/// top-level entry is then moved into place, replacing an existing entry of the
/// same name. If extraction fails, `dest_parent` is left as it was.
///
/// Returns the restored top-level paths.
pub fn unpack(archive_path: &Path, dest_parent: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
  let file = open_archive(archive_path)?;
  fs::create_dir_all(dest_parent).map_err(io_error(dest_parent))?;

  let staging = tempfile::Builder::new()
    .prefix(STAGING_PREFIX)
    .tempdir_in(dest_parent)
    .map_err(io_error(dest_parent))?;

  let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
  archive.set_preserve_permissions(true);
  archive.set_preserve_mtime(true);
  archive.unpack(staging.path()).map_err(|e| ArchiveError::Extract {
    path: archive_path.to_path_buf(),
    source: e,
  })?;

  let mut names = Vec::new();
  for entry in fs::read_dir(staging.path()).map_err(io_error(staging.path()))? {
    names.push(entry.map_err(io_error(staging.path()))?.file_name());
  }
  if names.is_empty() {
    return Err(ArchiveError::Empty(archive_path.to_path_buf()));
  }
  names.sort();

  let mut restored = Vec::with_capacity(names.len());
  for name in names {
    let target = dest_parent.join(&name);
    remove_path(&target).map_err(io_error(&target))?;
    fs::rename(staging.path().join(&name), &target).map_err(io_error(&target))?;
    debug!(path = %target.display(), "moved extracted entry into place");
    restored.push(target);
  }

  info!(archive = %archive_path.display(), dest = %dest_parent.display(), "unpacked archive");
  Ok(restored)
}

/// Decode the whole archive without writing anything.
///
/// Every entry body is read to the end and the gzip trailer is checked, so a
/// truncated or bit-flipped archive is reported as [`ArchiveError::Corrupt`].
/// Returns the number of entries.
pub fn verify(archive_path: &Path) -> Result<u64, ArchiveError> {
  let file = open_archive(archive_path)?;
  let corrupt = |source: io::Error| ArchiveError::Corrupt {
    path: archive_path.to_path_buf(),
    source,
  };

  let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
  let mut count = 0u64;
  for entry in archive.entries().map_err(corrupt)? {
    let mut entry = entry.map_err(corrupt)?;
    io::copy(&mut entry, &mut io::sink()).map_err(corrupt)?;
    count += 1;
  }

  // tar stops at the end-of-archive marker; drain the rest so the gzip
  // trailer is validated too.
  let mut decoder = archive.into_inner();
  io::copy(&mut decoder, &mut io::sink()).map_err(corrupt)?;

  if count == 0 {
    return Err(ArchiveError::Empty(archive_path.to_path_buf()));
  }

  debug!(archive = %archive_path.display(), entries = count, "verified archive");
  Ok(count)
}
