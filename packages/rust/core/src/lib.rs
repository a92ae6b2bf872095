//! Build orchestration for sampledocs.
//!
//! This crate ties together discovery, parsing, artifact generation and the
//! sink into end-to-end workflows: a one-shot [`build`] and a long-running
//! [`watch`].

pub mod build;
pub mod cleanup;
pub mod discovery;
pub mod pipeline;
pub mod reporter;
pub mod sink;
pub mod watch;

pub use build::{build, generate};
pub use cleanup::clean_destination;
pub use discovery::discover_sources;
pub use pipeline::{PipelineSummary, SampleCheck, SkippedSample, check_samples, run_pipeline};
pub use reporter::{BuildReporter, SilentReporter, TracingReporter};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use watch::{SourceWatcher, watch};
