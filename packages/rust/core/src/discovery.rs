//! Source enumeration: glob pattern under a root → [`SourceItem`]s.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use sampledocs_shared::{Result, SampleDocsError, SourceItem};

/// Find every file under `root` matching `pattern` and read it.
///
/// Items come back sorted by relative path. Any failure here is fatal to the run.
#[instrument(skip_all, fields(root = %root.display(), pattern = %pattern))]
pub fn discover_sources(root: &Path, pattern: &str) -> Result<Vec<SourceItem>> {
    if !root.is_dir() {
        return Err(SampleDocsError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source root is not a directory"),
        ));
    }

    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern.trim_start_matches('/')
    );

    let entries = glob::glob(&full_pattern).map_err(|e| SampleDocsError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let source = std::io::Error::new(e.error().kind(), e.error().to_string());
            SampleDocsError::io(e.path(), source)
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read(&path).map_err(|e| SampleDocsError::io(&path, e))?;
        match SourceItem::new(root, &path, content) {
            Some(item) => items.push(item),
            None => debug!(path = %path.display(), "match outside source root, ignoring"),
        }
    }
    items.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    debug!(count = items.len(), "sources discovered");
    Ok(items)
}
