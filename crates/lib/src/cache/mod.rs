//! Build-output cache.
//!
//! # Storage Layout
//!
//! ```text
//! <cache_root>/
//! ├── XcodeFrameworks.tar.gz   # CacheEntryKind::Frameworks
//! ├── Bundles.tar.gz           # CacheEntryKind::Bundles
//! └── Manifest.lock            # CacheEntryKind::Manifest (fingerprint only)
//! ```
//!
//! There is one generation: every save replaces the previous object for its
//! kind, and the cache is only trusted when all three objects are present and
//! the stored manifest matches the current one byte-for-byte.

mod kind;
mod store;

pub use kind::CacheEntryKind;
pub use store::{CacheError, CacheStatus, CacheStore, EntryStatus, Restore};
