//! Sample parsing: annotated HTML example file → [`SampleDocument`].
//!
//! The pipeline only sees the [`SampleParser`] trait. [`HtmlSampleParser`] is the
//! built-in implementation: it pulls the title and description out of the
//! document with `scraper`, then splits the body into annotated sections.

mod annotations;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, instrument};

use sampledocs_shared::{Result, SampleDocsError, SampleDocument, relative_slash_path};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Turns one sample file into a [`SampleDocument`].
///
/// Implementations are called from blocking worker threads, one call per sample.
pub trait SampleParser: Send + Sync {
    /// Parse sample `content` that was read from `path`. Any error skips this
    /// sample only.
    fn parse_bytes(&self, path: &Path, content: &[u8]) -> Result<SampleDocument>;

    /// Read the sample at `path` and parse it.
    fn parse(&self, path: &Path) -> Result<SampleDocument> {
        let content = std::fs::read(path).map_err(|e| SampleDocsError::io(path, e))?;
        self.parse_bytes(path, &content)
    }
}

// ---------------------------------------------------------------------------
// HTML parser
// ---------------------------------------------------------------------------

/// Default parser for annotated HTML samples.
#[derive(Debug, Clone)]
pub struct HtmlSampleParser {
    source_root: PathBuf,
}

impl HtmlSampleParser {
    /// Create a parser that reports `file_path` relative to `source_root`.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }
}

impl SampleParser for HtmlSampleParser {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn parse_bytes(&self, path: &Path, content: &[u8]) -> Result<SampleDocument> {
        let html = std::str::from_utf8(content)
            .map_err(|_| SampleDocsError::parse(path, "sample is not valid UTF-8"))?;

        let file_path = relative_slash_path(&self.source_root, path).ok_or_else(|| {
            SampleDocsError::parse(
                path,
                format!("not under source root {}", self.source_root.display()),
            )
        })?;

        parse_html(html, &file_path)
    }
}

/// Parse sample markup. `file_path` is recorded verbatim in the document.
pub fn parse_html(html: &str, file_path: &str) -> Result<SampleDocument> {
    let (raw_metadata, markup) = annotations::split_metadata(html);

    let metadata = match raw_metadata {
        Some(raw) => parse_metadata(raw).map_err(|msg| SampleDocsError::parse(file_path, msg))?,
        None => serde_json::Map::new(),
    };

    let doc = Html::parse_document(markup);
    let title = extract_title(&doc)
        .ok_or_else(|| SampleDocsError::parse(file_path, "sample has no title"))?;
    let description = extract_description(&doc);

    let sections = annotations::split_sections(annotations::body_markup(markup));

    debug!(
        title = %title,
        sections = sections.len(),
        metadata_keys = metadata.len(),
        "sample parsed"
    );

    Ok(SampleDocument {
        title,
        file_path: file_path.to_string(),
        description,
        metadata,
        sections,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_metadata(raw: &str) -> std::result::Result<serde_json::Map<String, serde_json::Value>, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err("metadata block must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid metadata block: {e}")),
    }
}

/// `<title>`, falling back to the first `<h1>`. Whitespace is collapsed.
fn extract_title(doc: &Html) -> Option<String> {
    static TITLE_SEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("title").expect("valid selector"));
    static H1_SEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h1").expect("valid selector"));

    [&*TITLE_SEL, &*H1_SEL].into_iter().find_map(|sel| {
        doc.select(sel)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
    })
}

fn extract_description(doc: &Html) -> Option<String> {
    static DESC_SEL: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(r#"meta[name="description"]"#).expect("valid selector")
    });

    doc.select(&DESC_SEL)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|d| !d.is_empty())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
