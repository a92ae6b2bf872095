//! Pre-build cleanup of previously generated artifacts.

use std::path::Path;

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use sampledocs_shared::{Result, SampleDocsError};

/// Extensions of files the build owns under the destination root.
pub const GENERATED_EXTENSIONS: [&str; 3] = ["json", "html", "md"];

/// Delete every generated-looking file under `root` except `preserved`.
///
/// `preserved` is relative to `root`. A missing `root` is treated as already
/// clean. Returns the number of files removed; the first failed delete aborts.
#[instrument(skip_all, fields(root = %root.display(), preserved = %preserved.display()))]
pub fn clean_destination(root: &Path, preserved: &Path) -> Result<usize> {
    if !root.exists() {
        debug!("destination root missing, nothing to clean");
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            SampleDocsError::io(path, std::io::Error::from(e))
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || !is_generated(path) {
            continue;
        }
        if path.strip_prefix(root).is_ok_and(|rel| rel == preserved) {
            continue;
        }

        std::fs::remove_file(path).map_err(|e| SampleDocsError::io(path, e))?;
        debug!(path = %path.display(), "removed stale artifact");
        removed += 1;
    }

    info!(removed, "destination cleaned");
    Ok(removed)
}

fn is_generated(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GENERATED_EXTENSIONS.contains(&ext))
}
