//! Error types for sampledocs.
//!
//! Library crates use [`SampleDocsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::PathBuf;

/// The build stage a fatal error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Removing previously generated artifacts.
    Cleanup,
    /// Enumerating source samples.
    Enumerate,
    /// Writing artifacts to the sink.
    Write,
    /// Setting up the filesystem watcher.
    Watch,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cleanup => "cleanup",
            Self::Enumerate => "enumeration",
            Self::Write => "write",
            Self::Watch => "watch",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all sampledocs operations.
#[derive(Debug, thiserror::Error)]
pub enum SampleDocsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A sample could not be parsed.
    #[error("parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A source glob pattern was malformed.
    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// JSON serialization of a sample document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A sample worker task panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),

    /// Filesystem watcher error.
    #[error("watch error: {0}")]
    Watch(String),

    /// A fatal failure, tagged with the stage that produced it.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: BuildStage,
        #[source]
        source: Box<SampleDocsError>,
    },

    /// Strict mode: at least one sample was skipped.
    #[error("{count} sample(s) failed to parse")]
    SkippedSamples { count: usize },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SampleDocsError>;

impl SampleDocsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for the sample at `path`.
    pub fn parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Tag an error with the build stage it aborted.
    pub fn stage(stage: BuildStage, source: SampleDocsError) -> Self {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }

    /// The failed stage, if this is a stage-tagged error.
    pub fn failed_stage(&self) -> Option<BuildStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
