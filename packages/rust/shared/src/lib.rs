//! Shared types, error model, and configuration for subjects-fast.
//!
//! This crate is the foundation depended on by all other subjects-fast crates.
//! It provides:
//! - [`SubjectsFastError`]: the unified error type
//! - Domain types ([`Facet`], [`FacetTable`], [`SubjectEntry`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, PathsConfig, SourceConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{Result, SubjectsFastError};
pub use types::{DEFAULT_BASE_URL, FAST_ID_PREFIX, Facet, FacetTable, SubjectEntry};
