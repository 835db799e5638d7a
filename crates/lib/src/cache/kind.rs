use std::fmt;

use serde::Serialize;

use crate::config::OutputLayout;
use crate::consts::ARCHIVE_EXTENSION;

/// The distinct objects held in a cache root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheEntryKind {
  /// Compiled framework artifacts.
  Frameworks,
  /// Resource bundles.
  Bundles,
  /// The dependency manifest, stored verbatim as the cache fingerprint.
  Manifest,
}

impl CacheEntryKind {
  /// Every kind, in save order. The manifest comes last so an interrupted save
  /// never looks complete.
  pub const ALL: [CacheEntryKind; 3] = [
    CacheEntryKind::Frameworks,
    CacheEntryKind::Bundles,
    CacheEntryKind::Manifest,
  ];

  /// Whether the kind is stored as a `.tar.gz` archive rather than copied.
  pub fn compressed(self) -> bool {
    match self {
      CacheEntryKind::Frameworks | CacheEntryKind::Bundles => true,
      CacheEntryKind::Manifest => false,
    }
  }

  /// Name of the corresponding entry in the live output tree.
  pub fn live_name(self, layout: &OutputLayout) -> &str {
    match self {
      CacheEntryKind::Frameworks => &layout.frameworks_dir,
      CacheEntryKind::Bundles => &layout.bundles_dir,
      CacheEntryKind::Manifest => &layout.manifest_file,
    }
  }

  /// Name the kind is stored under inside the cache root.
  pub fn cache_name(self, layout: &OutputLayout) -> String {
    let live = self.live_name(layout);
    if self.compressed() {
      format!("{}.{}", live, ARCHIVE_EXTENSION)
    } else {
      live.to_string()
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      CacheEntryKind::Frameworks => "frameworks",
      CacheEntryKind::Bundles => "bundles",
      CacheEntryKind::Manifest => "manifest",
    }
  }
}

impl fmt::Display for CacheEntryKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
