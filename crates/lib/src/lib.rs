//! podbin-lib: build-output cache for precompiled dependency binaries.
//!
//! This crate provides the pieces that sit between "run the expensive build" and
//! "reuse a previous result":
//! - `archive`: packs output directories into `.tar.gz` archives and back
//! - `manifest`: locates and compares the dependency manifest fingerprint
//! - `cache`: the cache root with one stored object per `CacheEntryKind`
//! - `builder`: the external build capability
//! - `orchestrate`: the restore-or-build control flow for one invocation

pub mod archive;
pub mod builder;
pub mod bundles;
pub mod cache;
pub mod config;
pub mod consts;
pub mod manifest;
pub mod orchestrate;
pub mod util;
