//! Test utilities for podbin-lib.
//!
//! Helpers for building small directory trees and comparing them byte-for-byte.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// Create `root` and write each `(relative path, contents)` pair under it.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
  fs::create_dir_all(root).unwrap();
  for (rel, contents) in files {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
  }
}

/// Collect every regular file under `root` keyed by its `/`-separated relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
  WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .map(|e| {
      let rel = e
        .path()
        .strip_prefix(root)
        .unwrap()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
      (rel, fs::read(e.path()).unwrap())
    })
    .collect()
}
