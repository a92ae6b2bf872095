//! Fan-out pipeline: enumerate → parse → generate → emit.
//!
//! Each sample is parsed and turned into its four artifacts on a blocking
//! worker. A single coordinator drains finished workers and hands each group to
//! the sink whole, so one sample's artifacts never interleave with another's.
//! Parse failures skip the sample; enumeration and sink failures end the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::{Id, JoinSet};
use tracing::{debug, info, instrument};

use sampledocs_parser::SampleParser;
use sampledocs_shared::{
    ArtifactGroup, BuildStage, FrontMatterConfig, PipelineConfig, Result, SampleDocsError,
    SampleDocument, SourceItem,
};

use crate::discovery::discover_sources;
use crate::reporter::BuildReporter;
use crate::sink::ArtifactSink;

/// A sample that produced no artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSample {
    /// Path relative to the source root.
    pub path: String,
    /// Rendered error.
    pub error: String,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Samples matched by the pattern.
    pub discovered: usize,
    /// Samples whose artifacts reached the sink.
    pub generated: usize,
    /// Total artifacts emitted.
    pub artifacts_written: usize,
    /// Samples skipped after a parse or generate failure.
    pub skipped: Vec<SkippedSample>,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Run the pipeline once over every sample under `config.source_root`.
#[instrument(skip_all, fields(source_root = %config.source_root.display(), pattern = %config.pattern))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    parser: Arc<dyn SampleParser>,
    sink: &dyn ArtifactSink,
    reporter: &dyn BuildReporter,
) -> Result<PipelineSummary> {
    let start = Instant::now();
    reporter.run_started(&config.source_root);

    let sources = discover_sources(&config.source_root, &config.pattern)
        .map_err(|e| SampleDocsError::stage(BuildStage::Enumerate, e))?;
    let total = sources.len();
    let limit = config.concurrency.max(1);
    info!(total, concurrency = limit, "starting pipeline");

    let front_matter = Arc::new(config.front_matter.clone());
    let mut summary = PipelineSummary {
        discovered: total,
        ..PipelineSummary::default()
    };
    let mut workers = Workers::default();

    for (i, item) in sources.into_iter().enumerate() {
        while workers.tasks.len() >= limit {
            workers.drain_next(sink, reporter, &mut summary).await?;
        }

        reporter.item_started(&item.relative_path, i + 1, total);
        workers.spawn(item, Arc::clone(&parser), Arc::clone(&front_matter));
    }

    while !workers.tasks.is_empty() {
        workers.drain_next(sink, reporter, &mut summary).await?;
    }

    summary.elapsed = start.elapsed();
    info!(
        generated = summary.generated,
        skipped = summary.skipped.len(),
        elapsed_ms = summary.elapsed.as_millis(),
        "pipeline complete"
    );
    Ok(summary)
}

/// Parse one sample and generate its artifacts.
fn process_item(
    item: &SourceItem,
    parser: &dyn SampleParser,
    front_matter: &FrontMatterConfig,
) -> Result<ArtifactGroup> {
    let doc = parser.parse_bytes(&item.absolute_path, &item.content)?;
    sampledocs_artifacts::generate_all(item, &doc, front_matter)
}

/// In-flight workers, keyed back to the sample each one is handling.
#[derive(Default)]
struct Workers {
    tasks: JoinSet<Result<ArtifactGroup>>,
    samples: HashMap<Id, String>,
}

impl Workers {
    fn spawn(
        &mut self,
        item: SourceItem,
        parser: Arc<dyn SampleParser>,
        front_matter: Arc<FrontMatterConfig>,
    ) {
        let path = item.relative_path.clone();
        let handle = self
            .tasks
            .spawn_blocking(move || process_item(&item, parser.as_ref(), &front_matter));
        self.samples.insert(handle.id(), path);
    }

    /// Wait for the next worker and route its result. Only sink errors escape.
    async fn drain_next(
        &mut self,
        sink: &dyn ArtifactSink,
        reporter: &dyn BuildReporter,
        summary: &mut PipelineSummary,
    ) -> Result<()> {
        let Some(joined) = self.tasks.join_next_with_id().await else {
            return Ok(());
        };

        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => (e.id(), Err(SampleDocsError::Worker(e.to_string()))),
        };
        let path = self.samples.remove(&id).unwrap_or_default();

        match outcome {
            Ok(group) => {
                sink.emit(&group)
                    .map_err(|e| SampleDocsError::stage(BuildStage::Write, e))?;
                summary.generated += 1;
                summary.artifacts_written += group.len();
                debug!(sample = %path, artifacts = group.len(), "sample emitted");
            }
            Err(e) => {
                reporter.item_failed(&path, &e);
                summary.skipped.push(SkippedSample {
                    path,
                    error: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// Parse outcome for one sample, without generating anything.
#[derive(Debug)]
pub struct SampleCheck {
    /// Path relative to the source root.
    pub path: String,
    /// The parsed document, or why parsing failed.
    pub result: Result<SampleDocument>,
}

/// Enumerate and parse every sample, writing nothing.
pub fn check_samples(config: &PipelineConfig, parser: &dyn SampleParser) -> Result<Vec<SampleCheck>> {
    let sources = discover_sources(&config.source_root, &config.pattern)
        .map_err(|e| SampleDocsError::stage(BuildStage::Enumerate, e))?;

    Ok(sources
        .into_iter()
        .map(|item| SampleCheck {
            result: parser.parse_bytes(&item.absolute_path, &item.content),
            path: item.relative_path,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use sampledocs_parser::HtmlSampleParser;
    use sampledocs_shared::{AppConfig, DerivedItem};

    use super::*;
    use crate::reporter::SilentReporter;
    use crate::sink::MemorySink;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sampledocs-pipeline-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample(title: &str) -> String {
        format!(
            "<!doctype html>\n<html>\n<head><title>{title}</title></head>\n<body>\n  <!-- Intro. -->\n  <p>{title}</p>\n</body>\n</html>\n"
        )
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn make_config(source_root: &Path, concurrency: usize) -> PipelineConfig {
        let mut config = PipelineConfig::from(&AppConfig::default());
        config.source_root = source_root.to_path_buf();
        config.concurrency = concurrency;
        config
    }

    fn html_parser(root: &Path) -> Arc<dyn SampleParser> {
        Arc::new(HtmlSampleParser::new(root))
    }

    /// Panics on one sample, delegates the rest.
    struct PanickingParser {
        inner: HtmlSampleParser,
        poison: &'static str,
    }

    impl SampleParser for PanickingParser {
        fn parse_bytes(&self, path: &Path, content: &[u8]) -> Result<SampleDocument> {
            if path.ends_with(self.poison) {
                panic!("parser blew up");
            }
            self.inner.parse_bytes(path, content)
        }
    }

    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn emit(&self, _group: &[DerivedItem]) -> Result<()> {
            Err(SampleDocsError::io(
                "/dest",
                std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
            ))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        started: Mutex<Vec<String>>,
        failed: Mutex<Vec<String>>,
    }

    impl BuildReporter for RecordingReporter {
        fn phase(&self, _name: &str) {}
        fn run_started(&self, _source_root: &Path) {}
        fn item_started(&self, relative_path: &str, _current: usize, _total: usize) {
            self.started.lock().unwrap().push(relative_path.to_string());
        }
        fn item_failed(&self, relative_path: &str, _error: &SampleDocsError) {
            self.failed.lock().unwrap().push(relative_path.to_string());
        }
        fn run_succeeded(&self, _summary: &PipelineSummary) {}
        fn run_failed(&self, _error: &SampleDocsError) {}
    }

    #[tokio::test]
    async fn single_sample_produces_four_artifacts() {
        let tmp = temp_dir();
        let original = sample("Bar Example");
        write(&tmp, "foo/bar.html", &original);

        let sink = MemorySink::new();
        let summary = run_pipeline(&make_config(&tmp, 4), html_parser(&tmp), &sink, &SilentReporter)
            .await
            .unwrap();

        assert_eq!(summary.discovered, 1);
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.artifacts_written, 4);
        assert!(summary.skipped.is_empty());
        assert_eq!(
            sink.paths(),
            ["foo/bar-manual.html", "foo/bar-preview.html", "foo/bar-source.html", "foo/bar.json"]
        );

        let group = &sink.groups()[0];
        let manual = std::str::from_utf8(&group[1].content).unwrap();
        assert!(manual.contains("$title: Bar Example\n"));
        assert!(manual.contains("/content/examples/foo/bar.json"));

        let preview = std::str::from_utf8(&group[2].content).unwrap();
        assert!(preview.contains("$hidden: true\n"));
        assert!(preview.contains("/foo/bar/preview.html\n"));

        assert!(group[3].content.ends_with(original.as_bytes()));

        let data: SampleDocument = serde_json::from_slice(&group[0].content).unwrap();
        assert_eq!(data.title, "Bar Example");
        assert_eq!(data.file_path, "foo/bar.html");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn failed_sample_is_isolated() {
        let tmp = temp_dir();
        write(&tmp, "a.html", &sample("A"));
        write(&tmp, "b.html", "<html><body><p>no title here</p></body></html>");
        write(&tmp, "c.html", &sample("C"));

        let sink = MemorySink::new();
        let reporter = RecordingReporter::default();
        let summary = run_pipeline(&make_config(&tmp, 2), html_parser(&tmp), &sink, &reporter)
            .await
            .unwrap();

        assert_eq!(summary.generated, 2);
        assert_eq!(summary.artifacts_written, 8);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, "b.html");
        assert!(summary.skipped[0].error.contains("no title"));

        assert_eq!(sink.paths().len(), 8);
        assert!(sink.paths().iter().all(|p| !p.starts_with("b")));
        assert_eq!(*reporter.failed.lock().unwrap(), ["b.html"]);
        assert_eq!(*reporter.started.lock().unwrap(), ["a.html", "b.html", "c.html"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn groups_never_interleave() {
        let tmp = temp_dir();
        for i in 0..12 {
            write(&tmp, &format!("dir{}/s{i}.html", i % 3), &sample(&format!("S{i}")));
        }

        let sink = MemorySink::new();
        run_pipeline(&make_config(&tmp, 4), html_parser(&tmp), &sink, &SilentReporter)
            .await
            .unwrap();

        let groups = sink.groups();
        assert_eq!(groups.len(), 12);
        for group in groups {
            assert_eq!(group.len(), 4);
            let stem = group[0].relative_path.trim_end_matches(".json").to_string();
            assert!(group.iter().all(|d| d.relative_path.starts_with(&stem)));
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn concurrency_does_not_change_output() {
        let tmp = temp_dir();
        for name in ["one", "two", "three", "four", "five"] {
            write(&tmp, &format!("{name}.html"), &sample(name));
        }

        let serial = MemorySink::new();
        run_pipeline(&make_config(&tmp, 1), html_parser(&tmp), &serial, &SilentReporter)
            .await
            .unwrap();
        let parallel = MemorySink::new();
        run_pipeline(&make_config(&tmp, 8), html_parser(&tmp), &parallel, &SilentReporter)
            .await
            .unwrap();

        assert_eq!(serial.paths(), parallel.paths());
        assert_eq!(serial.paths().len(), 20);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn panicking_worker_is_skipped() {
        let tmp = temp_dir();
        write(&tmp, "good.html", &sample("Good"));
        write(&tmp, "boom.html", &sample("Boom"));

        let parser = Arc::new(PanickingParser {
            inner: HtmlSampleParser::new(&tmp),
            poison: "boom.html",
        });
        let sink = MemorySink::new();
        let summary = run_pipeline(&make_config(&tmp, 2), parser, &sink, &SilentReporter)
            .await
            .unwrap();

        assert_eq!(summary.generated, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, "boom.html");
        assert!(summary.skipped[0].error.contains("worker failed"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn item_is_parsed_from_enumerated_bytes() {
        let tmp = temp_dir();
        write(&tmp, "a.html", &sample("Edited Later"));
        let enumerated = sample("As Enumerated");
        let item = SourceItem::new(&tmp, &tmp.join("a.html"), enumerated.clone().into_bytes()).unwrap();

        let group = process_item(
            &item,
            &HtmlSampleParser::new(&tmp),
            &FrontMatterConfig::default(),
        )
        .unwrap();

        let data: SampleDocument = serde_json::from_slice(&group[0].content).unwrap();
        assert_eq!(data.title, "As Enumerated");
        assert!(group[3].content.ends_with(enumerated.as_bytes()));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn missing_source_root_is_fatal() {
        let tmp = temp_dir();
        let missing = tmp.join("nope");
        let err = run_pipeline(
            &make_config(&missing, 1),
            html_parser(&missing),
            &MemorySink::new(),
            &SilentReporter,
        )
        .await
        .unwrap_err();

        assert_eq!(err.failed_stage(), Some(BuildStage::Enumerate));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn sink_failure_is_fatal() {
        let tmp = temp_dir();
        write(&tmp, "a.html", &sample("A"));

        let err = run_pipeline(&make_config(&tmp, 1), html_parser(&tmp), &FailingSink, &SilentReporter)
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(BuildStage::Write));
        assert!(err.to_string().contains("disk full"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn empty_source_root_succeeds() {
        let tmp = temp_dir();
        let sink = MemorySink::new();
        let summary = run_pipeline(&make_config(&tmp, 4), html_parser(&tmp), &sink, &SilentReporter)
            .await
            .unwrap();

        assert_eq!(summary.discovered, 0);
        assert!(sink.groups().is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn check_samples_reports_each_outcome() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/samples")
            .canonicalize()
            .unwrap();
        let config = make_config(&root, 1);

        let checks = check_samples(&config, &HtmlSampleParser::new(&root)).unwrap();
        let outcomes: Vec<(&str, bool)> = checks
            .iter()
            .map(|c| (c.path.as_str(), c.result.is_ok()))
            .collect();

        assert_eq!(
            outcomes,
            [
                ("broken/untitled.html", false),
                ("components/carousel.html", true),
                ("hello-world.html", true),
            ]
        );
    }
}
