//! Build orchestration: cleanup, one pipeline run, final report.

use std::sync::Arc;

use tracing::instrument;

use sampledocs_parser::SampleParser;
use sampledocs_shared::{BuildStage, PipelineConfig, Result, SampleDocsError};

use crate::cleanup::clean_destination;
use crate::pipeline::{PipelineSummary, run_pipeline};
use crate::reporter::BuildReporter;
use crate::sink::ArtifactSink;

/// Full build: clean the destination root, then generate everything.
#[instrument(skip_all, fields(destination = %config.destination_root.display()))]
pub async fn build(
    config: &PipelineConfig,
    parser: Arc<dyn SampleParser>,
    sink: &dyn ArtifactSink,
    reporter: &dyn BuildReporter,
) -> Result<PipelineSummary> {
    reporter.phase("Cleaning destination");
    if let Err(e) = clean_destination(&config.destination_root, &config.preserved_file) {
        let err = SampleDocsError::stage(BuildStage::Cleanup, e);
        reporter.run_failed(&err);
        return Err(err);
    }

    generate(config, parser, sink, reporter).await
}

/// One pipeline run without cleanup, reported as success or failure.
///
/// In strict mode a run with skipped samples is a failure.
pub async fn generate(
    config: &PipelineConfig,
    parser: Arc<dyn SampleParser>,
    sink: &dyn ArtifactSink,
    reporter: &dyn BuildReporter,
) -> Result<PipelineSummary> {
    reporter.phase("Generating artifacts");

    let result = run_pipeline(config, parser, sink, reporter)
        .await
        .and_then(|summary| enforce_strict(config, summary));

    match &result {
        Ok(summary) => reporter.run_succeeded(summary),
        Err(e) => reporter.run_failed(e),
    }
    result
}

fn enforce_strict(config: &PipelineConfig, summary: PipelineSummary) -> Result<PipelineSummary> {
    if config.strict && !summary.skipped.is_empty() {
        return Err(SampleDocsError::SkippedSamples {
            count: summary.skipped.len(),
        });
    }
    Ok(summary)
}
