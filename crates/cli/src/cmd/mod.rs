mod build;
mod clean;
mod status;
mod version;

pub use build::{BuildArgs, cmd_build};
pub use clean::cmd_clean;
pub use status::cmd_status;
pub use version::cmd_version;
