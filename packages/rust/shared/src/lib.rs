//! Shared types, error model, and configuration for the Civis ingester.
//!
//! This crate is the foundation depended on by all other Civis crates.
//! It provides:
//! - [`CivisError`]: the unified error type
//! - Dataset entities ([`Motion`], [`RollCall`], [`Vote`], [`Deputy`], [`RollCallIndexEntry`])
//! - Configuration ([`AppConfig`], [`IngestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, IngestConfig, OutputPaths, PathsConfig, SourceConfig, YearsConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{CivisError, Result};
pub use types::{
    Dataset, Deputy, Motion, NO_THEME, PropositionKey, RollCall, RollCallIndexEntry, Vote,
    VoteCode, XML_TEXT_KEY,
};
