//! Watch mode: re-run the pipeline whenever the source tree changes.
//!
//! There is no cleanup between cycles. A failed cycle is reported through the
//! reporter and the loop keeps watching; only watcher setup is fatal.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use sampledocs_parser::SampleParser;
use sampledocs_shared::{BuildStage, PipelineConfig, Result, SampleDocsError};

use crate::build::generate;
use crate::reporter::BuildReporter;
use crate::sink::ArtifactSink;

/// Recursive watcher over the source root.
///
/// Dropping it stops the underlying notify watcher.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    changes: mpsc::Receiver<PathBuf>,
}

impl SourceWatcher {
    /// Start watching `source_root`, ignoring anything under `ignored`.
    pub fn new(source_root: &Path, ignored: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel(256);
        let ignored = ignored_roots(ignored);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "watcher error");
                    return;
                }
            };
            if !is_relevant(&event.kind) {
                return;
            }
            for path in event.paths {
                if ignored.iter().any(|root| path.starts_with(root)) {
                    continue;
                }
                // A full channel already guarantees another cycle.
                let _ = tx.try_send(path);
            }
        })
        .map_err(|e| SampleDocsError::Watch(e.to_string()))?;

        watcher
            .watch(source_root, RecursiveMode::Recursive)
            .map_err(|e| SampleDocsError::Watch(format!("{}: {e}", source_root.display())))?;

        Ok(Self {
            _watcher: watcher,
            changes: rx,
        })
    }

    /// Wait for the next change, then swallow everything that arrives within
    /// `debounce`. Returns `None` once the watcher has shut down.
    pub async fn next_batch(&mut self, debounce: Duration) -> Option<Vec<PathBuf>> {
        let first = self.changes.recv().await?;
        tokio::time::sleep(debounce).await;

        let mut batch = vec![first];
        while let Ok(path) = self.changes.try_recv() {
            if !batch.contains(&path) {
                batch.push(path);
            }
        }
        Some(batch)
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// The ignored root as given and, if it exists, its canonical form.
fn ignored_roots(root: &Path) -> Vec<PathBuf> {
    let mut roots = vec![root.to_path_buf()];
    if let Ok(canonical) = root.canonicalize() {
        if canonical != root {
            roots.push(canonical);
        }
    }
    roots
}

/// Run the pipeline once, then again after every batch of source changes,
/// until `shutdown` resolves.
///
/// Shutdown is only observed between cycles; a running cycle finishes first.
/// Returns the number of cycles that ran.
#[instrument(skip_all, fields(source_root = %config.source_root.display()))]
pub async fn watch<F>(
    config: &PipelineConfig,
    parser: Arc<dyn SampleParser>,
    sink: &dyn ArtifactSink,
    reporter: &dyn BuildReporter,
    debounce: Duration,
    shutdown: F,
) -> Result<usize>
where
    F: Future<Output = ()>,
{
    let mut watcher = SourceWatcher::new(&config.source_root, &config.destination_root)
        .map_err(|e| SampleDocsError::stage(BuildStage::Watch, e))?;
    tokio::pin!(shutdown);

    let mut cycles = 0;
    loop {
        // Failures are already reported; the next change gets another try.
        let _ = generate(config, Arc::clone(&parser), sink, reporter).await;
        cycles += 1;
        reporter.phase("Watching for changes");

        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(cycles, "watch stopped");
                return Ok(cycles);
            }
            batch = watcher.next_batch(debounce) => match batch {
                Some(paths) => debug!(changed = paths.len(), "source change detected"),
                None => {
                    return Err(SampleDocsError::stage(
                        BuildStage::Watch,
                        SampleDocsError::Watch("change channel closed".to_string()),
                    ));
                }
            },
        }
    }
}
