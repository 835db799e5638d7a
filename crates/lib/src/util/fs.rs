//! Filesystem helpers shared by the cache, archive, and bundle modules.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Recursively copy `src` into `dst`, creating `dst` if needed.
///
/// Symlinks are recreated as symlinks on Unix so framework bundles keep their
/// `Versions/Current` layout.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
  fs::create_dir_all(dst)?;
  for entry in fs::read_dir(src)? {
    let entry = entry?;
    let ty = entry.file_type()?;
    let dst_path = dst.join(entry.file_name());
    if ty.is_dir() {
      copy_dir_all(&entry.path(), &dst_path)?;
    } else if ty.is_symlink() {
      copy_symlink(&entry.path(), &dst_path)?;
    } else {
      fs::copy(entry.path(), dst_path)?;
    }
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  let target = fs::read_link(src)?;
  std::os::unix::fs::symlink(target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  if src.is_dir() {
    copy_dir_all(src, dst)
  } else {
    fs::copy(src, dst).map(|_| ())
  }
}

/// Remove a path (file, directory, or symlink). Missing paths are not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
  let metadata = match path.symlink_metadata() {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(e) => return Err(e),
  };

  if metadata.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
}

/// Remove everything inside `dir`, keeping `dir` itself.
pub fn clear_dir(dir: &Path) -> io::Result<()> {
  for entry in fs::read_dir(dir)? {
    remove_path(&entry?.path())?;
  }
  Ok(())
}

/// Copy a single file so that `dst` either keeps its old content or holds the
/// complete new content.
pub fn copy_file_atomic(src: &Path, dst: &Path) -> io::Result<()> {
  let parent = dst
    .parent()
    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent directory"))?;

  let mut reader = fs::File::open(src)?;
  let mut temp = NamedTempFile::new_in(parent)?;
  io::copy(&mut reader, temp.as_file_mut())?;
  temp.as_file().sync_all()?;
  temp.persist(dst).map_err(|e| e.error)?;
  Ok(())
}

/// Total size in bytes of the regular files under `path`.
///
/// Accepts a file path as well; returns 0 when nothing exists.
pub fn disk_usage(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .filter_map(|e| e.metadata().ok())
    .map(|m| m.len())
    .sum()
}
