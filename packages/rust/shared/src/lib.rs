//! Shared types, error model, and configuration for sampledocs.
//!
//! This crate is the foundation depended on by all other sampledocs crates.
//! It provides:
//! - [`SampleDocsError`] as the unified error type
//! - Domain types ([`SourceItem`], [`SampleDocument`], [`DerivedItem`], [`ArtifactKind`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildSettings, CONFIG_FILE_NAME, FrontMatterConfig, PathsConfig, PipelineConfig,
    default_config_path, init_config, load_config, load_config_from,
};
pub use error::{BuildStage, Result, SampleDocsError};
pub use types::{
    ArtifactGroup, ArtifactKind, DerivedItem, SampleDocument, Section, SourceItem,
    relative_slash_path, strip_extension,
};
