//! Destinations for generated artifacts.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use sampledocs_shared::{ArtifactGroup, DerivedItem, Result, SampleDocsError};

/// Accepts the artifacts of one sample at a time.
///
/// The pipeline calls `emit` from a single coordinator, so groups never
/// interleave. An error aborts the whole run.
pub trait ArtifactSink: Send + Sync {
    fn emit(&self, group: &[DerivedItem]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// DirectorySink
// ---------------------------------------------------------------------------

/// Writes artifacts under a destination root, mirroring their relative paths.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    fn emit(&self, group: &[DerivedItem]) -> Result<()> {
        for item in group {
            let target = self.root.join(&item.relative_path);
            write_atomic(&target, &item.content)?;
            debug!(path = %target.display(), kind = %item.kind, size = item.content.len(), "wrote artifact");
        }
        Ok(())
    }
}

/// Write to a hidden temp file beside `target`, then rename it into place.
fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| SampleDocsError::io(parent, e))?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| SampleDocsError::io(&temp, e))?;
    std::fs::rename(&temp, target).map_err(|e| SampleDocsError::io(target, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Keeps emitted groups in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    groups: Mutex<Vec<ArtifactGroup>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every group emitted so far, in arrival order.
    pub fn groups(&self) -> Vec<ArtifactGroup> {
        let groups = self
            .groups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        groups.clone()
    }

    /// Relative paths of every emitted artifact, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .groups()
            .into_iter()
            .flatten()
            .map(|item| item.relative_path)
            .collect();
        paths.sort();
        paths
    }
}

impl ArtifactSink for MemorySink {
    fn emit(&self, group: &[DerivedItem]) -> Result<()> {
        let mut groups = self
            .groups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        groups.push(group.to_vec());
        Ok(())
    }
}
