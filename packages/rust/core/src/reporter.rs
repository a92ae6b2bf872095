//! Build progress reporting, injected into the pipeline as a capability.

use std::path::Path;

use tracing::{error, info, warn};

use sampledocs_shared::SampleDocsError;

use crate::pipeline::PipelineSummary;

/// Progress callback for reporting build status.
pub trait BuildReporter: Send + Sync {
    /// Called when entering a new phase (cleanup, generation).
    fn phase(&self, name: &str);
    /// Called before enumerating the source root.
    fn run_started(&self, source_root: &Path);
    /// Called as each sample is handed to a worker.
    fn item_started(&self, relative_path: &str, current: usize, total: usize);
    /// Called when a sample is skipped.
    fn item_failed(&self, relative_path: &str, error: &SampleDocsError);
    /// Called when a run completes, possibly with skipped samples.
    fn run_succeeded(&self, summary: &PipelineSummary);
    /// Called when a run aborts.
    fn run_failed(&self, error: &SampleDocsError);
}

/// Reports through `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl BuildReporter for TracingReporter {
    fn phase(&self, name: &str) {
        info!(phase = name, "build phase");
    }

    fn run_started(&self, source_root: &Path) {
        info!(source_root = %source_root.display(), "build started");
    }

    fn item_started(&self, relative_path: &str, current: usize, total: usize) {
        info!(sample = relative_path, current, total, "processing sample");
    }

    fn item_failed(&self, relative_path: &str, error: &SampleDocsError) {
        warn!(sample = relative_path, error = %error, "sample skipped");
    }

    fn run_succeeded(&self, summary: &PipelineSummary) {
        info!(
            generated = summary.generated,
            artifacts = summary.artifacts_written,
            skipped = summary.skipped.len(),
            elapsed_ms = summary.elapsed.as_millis(),
            "build finished"
        );
    }

    fn run_failed(&self, error: &SampleDocsError) {
        error!(error = %error, stage = ?error.failed_stage(), "build failed");
    }
}

/// No-op reporter for headless/test usage.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {
    fn phase(&self, _name: &str) {}
    fn run_started(&self, _source_root: &Path) {}
    fn item_started(&self, _relative_path: &str, _current: usize, _total: usize) {}
    fn item_failed(&self, _relative_path: &str, _error: &SampleDocsError) {}
    fn run_succeeded(&self, _summary: &PipelineSummary) {}
    fn run_failed(&self, _error: &SampleDocsError) {}
}
