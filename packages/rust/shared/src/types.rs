//! Core domain types: source samples, parsed documents, generated artifacts.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceItem
// ---------------------------------------------------------------------------

/// One input sample file, read once during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// Path relative to the source root, always `/`-separated.
    pub relative_path: String,
    /// Location on disk.
    pub absolute_path: PathBuf,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

impl SourceItem {
    /// Build an item for `path` found under `root`.
    ///
    /// Returns `None` if `path` is not inside `root`.
    pub fn new(root: &Path, path: &Path, content: Vec<u8>) -> Option<Self> {
        let relative_path = relative_slash_path(root, path)?;
        Some(Self {
            relative_path,
            absolute_path: path.to_path_buf(),
            content,
        })
    }

    /// Relative path with its final extension removed (`foo/bar.html` -> `foo/bar`).
    pub fn stem_path(&self) -> &str {
        strip_extension(&self.relative_path)
    }
}

/// `path` relative to `root`, joined with `/` regardless of platform.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Drop the extension of the last path segment, if any.
///
/// Dots in directory names and leading dots of hidden files are not extensions.
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

// ---------------------------------------------------------------------------
// SampleDocument
// ---------------------------------------------------------------------------

/// One annotated part of a sample: explanatory prose plus the markup it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Text of the annotation comment. Empty for markup preceding the first comment.
    pub doc: String,
    /// Markup following the annotation.
    pub code: String,
}

/// Normalized parse result of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDocument {
    /// Human-readable title.
    pub title: String,
    /// Source path relative to the source root.
    pub file_path: String,
    /// `<meta name="description">`, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form metadata declared by the sample.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Annotated sections in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// The four documents generated for every sample, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Serialized [`SampleDocument`].
    DataSource,
    /// Manual page.
    Manual,
    /// Hidden live preview page.
    Preview,
    /// Hidden raw source page.
    Source,
}

impl ArtifactKind {
    /// Every kind, in the order artifacts are generated and emitted.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::DataSource,
        ArtifactKind::Manual,
        ArtifactKind::Preview,
        ArtifactKind::Source,
    ];

    /// Destination path for a sample whose relative path (extension stripped) is `stem`.
    pub fn destination_for(self, stem: &str) -> String {
        match self {
            Self::DataSource => format!("{stem}.json"),
            Self::Manual => format!("{stem}-manual.html"),
            Self::Preview => format!("{stem}-preview.html"),
            Self::Source => format!("{stem}-source.html"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DataSource => "data",
            Self::Manual => "manual",
            Self::Preview => "preview",
            Self::Source => "source",
        };
        f.write_str(name)
    }
}

/// A generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedItem {
    /// Which generator produced it.
    pub kind: ArtifactKind,
    /// Path relative to the destination root, `/`-separated.
    pub relative_path: String,
    /// File contents.
    pub content: Vec<u8>,
}

/// All artifacts for one sample. Emitted to the sink as a unit.
pub type ArtifactGroup = Vec<DerivedItem>;
