pub const APP_NAME: &str = "podbin";

/// Version string reported by `podbin version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that relocates the cache root.
pub const CACHE_DIR_ENV: &str = "PODBIN_CACHE_DIR";

/// Environment variable holding the build command when `--builder` is absent.
pub const BUILDER_ENV: &str = "PODBIN_BUILDER";

pub const DEFAULT_FRAMEWORKS_DIR: &str = "XcodeFrameworks";
pub const DEFAULT_BUNDLES_DIR: &str = "Bundles";
pub const DEFAULT_CACHE_DIR: &str = "Cache";
pub const DEFAULT_MANIFEST_FILE: &str = "Manifest.lock";

/// Path inside an archive's `Products/` directory where built frameworks land.
pub const DEFAULT_ARCHIVE_INSTALL_PATH: &str = "Library/Frameworks";

pub const ARCHIVE_EXTENSION: &str = "tar.gz";
pub const BUNDLE_EXTENSION: &str = "bundle";
