//! Shared types, error model, and configuration for Geoflow.
//!
//! This crate is the foundation depended on by all other Geoflow crates.
//! It provides:
//! - [`GeoflowError`] — the unified error type
//! - [`DatasetLocation`] — deterministic on-disk layout per dataset
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, MirrorConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{GeoflowError, Result};
pub use types::{DatasetLocation, commit_dir, part_path};
