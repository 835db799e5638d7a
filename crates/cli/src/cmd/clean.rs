use std::path::Path;

use anyhow::{Context, Result};

use podbin_lib::cache::CacheStore;
use podbin_lib::config::OutputLayout;

use super::build::absolute;
use crate::output::{OutputFormat, format_bytes, print_json, print_stat, print_success};

pub fn cmd_clean(output_dir: &Path, output: OutputFormat) -> Result<()> {
  let layout = OutputLayout::default();
  let output_dir = absolute(output_dir)?;
  let store = CacheStore::new(layout.cache_root(&output_dir), layout);

  let freed = store.status(None).total_bytes();
  if store.root().exists() {
    store.clear().context("Failed to clear cache")?;
  }

  if output.is_json() {
    print_json(&serde_json::json!({ "root": store.root(), "bytes_freed": freed }))?;
  } else {
    print_success("Cache cleared");
    print_stat("Cache", &store.root().display().to_string());
    print_stat("Space freed", &format_bytes(freed));
  }

  Ok(())
}
