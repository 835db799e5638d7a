//! Status command implementation.
//!
//! Reports which cache entries exist, their size on disk, and whether the
//! stored manifest matches the current one.

use std::path::Path;

use anyhow::Result;

use podbin_lib::cache::CacheStore;
use podbin_lib::config::OutputLayout;

use super::build::absolute;
use crate::output::{
  OutputFormat, entry_marker, format_bytes, print_info, print_json, print_stat, print_success, print_warning,
};

pub fn cmd_status(pods_folder: &Path, output_dir: &Path, output: OutputFormat) -> Result<()> {
  let layout = OutputLayout::default();
  let output_dir = absolute(output_dir)?;
  let manifest = absolute(pods_folder)?.join(&layout.manifest_file);

  let store = CacheStore::new(layout.cache_root(&output_dir), layout);
  let status = store.status(manifest.is_file().then_some(manifest.as_path()));

  if output.is_json() {
    print_json(&status)?;
    return Ok(());
  }

  if status.complete {
    print_success(&format!("Cache at {}", status.root.display()));
  } else {
    print_info(&format!("Cache at {} is incomplete", status.root.display()));
  }

  for entry in &status.entries {
    let size = if entry.present {
      format_bytes(entry.size_bytes)
    } else {
      "missing".to_string()
    };
    println!("  {} {} ({})", entry_marker(entry.present), entry.path.display(), size);
  }

  println!();
  print_stat("Total size", &format_bytes(status.total_bytes()));
  match status.manifest_matches {
    Some(true) => print_stat("Manifest", "up to date"),
    Some(false) => print_warning("Manifest differs from cache; next build will rebuild"),
    None => print_warning(&format!("No manifest found at {}", manifest.display())),
  }

  Ok(())
}
