//! Artifact generators: one parsed sample in, four site documents out.
//!
//! Every generator is a pure function of `(SourceItem, SampleDocument)` plus the
//! front matter settings. Output is byte-identical across calls.

mod frontmatter;

use tracing::debug;

use sampledocs_shared::{
    ArtifactGroup, ArtifactKind, DerivedItem, FrontMatterConfig, Result, SampleDocument,
    SourceItem,
};

pub use frontmatter::FrontMatter;

/// Run all four generators in order: data source, manual, preview, source.
pub fn generate_all(
    item: &SourceItem,
    doc: &SampleDocument,
    config: &FrontMatterConfig,
) -> Result<ArtifactGroup> {
    let group = vec![
        data_source(item, doc)?,
        manual_doc(item, doc, config),
        preview_doc(item, doc, config),
        source_doc(item, doc, config),
    ];
    debug!(sample = %item.relative_path, artifacts = group.len(), "artifacts generated");
    Ok(group)
}

/// `rel.json`: the pretty-printed sample document.
pub fn data_source(item: &SourceItem, doc: &SampleDocument) -> Result<DerivedItem> {
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    Ok(derived(item, ArtifactKind::DataSource, json.into_bytes()))
}

/// `rel-manual.html`: front matter for the manual page.
pub fn manual_doc(item: &SourceItem, doc: &SampleDocument, config: &FrontMatterConfig) -> DerivedItem {
    let stem = item.stem_path();
    let fm = FrontMatter::new()
        .text("$title", &doc.title)
        .text("$view", &config.manual_view)
        .text("$path", &request_path(config, stem, ""))
        .raw("example", data_reference(config, stem));
    derived(item, ArtifactKind::Manual, fm.render().into_bytes())
}

/// `rel-preview.html`: front matter for the hidden live preview.
pub fn preview_doc(item: &SourceItem, doc: &SampleDocument, config: &FrontMatterConfig) -> DerivedItem {
    let stem = item.stem_path();
    let fm = FrontMatter::new()
        .text("$title", &doc.title)
        .text("$view", &config.preview_view)
        .text("$path", &request_path(config, stem, "preview.html"))
        .raw("example", data_reference(config, stem))
        .flag("$hidden", true);
    derived(item, ArtifactKind::Preview, fm.render().into_bytes())
}

/// `rel-source.html`: front matter followed by the untouched sample bytes.
pub fn source_doc(item: &SourceItem, doc: &SampleDocument, config: &FrontMatterConfig) -> DerivedItem {
    let stem = item.stem_path();
    let fm = FrontMatter::new()
        .text("$title", &doc.title)
        .text("$view", &config.source_view)
        .text("$path", &request_path(config, stem, "source.html"))
        .flag("$hidden", true)
        .flag("$$injectDependencies", false);

    let mut content = fm.render().into_bytes();
    content.extend_from_slice(&item.content);
    derived(item, ArtifactKind::Source, content)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn derived(item: &SourceItem, kind: ArtifactKind, content: Vec<u8>) -> DerivedItem {
    DerivedItem {
        kind,
        relative_path: kind.destination_for(item.stem_path()),
        content,
    }
}

/// `<path_base>/<stem>/<leaf>`
fn request_path(config: &FrontMatterConfig, stem: &str, leaf: &str) -> String {
    format!("{}/{stem}/{leaf}", config.path_base.trim_end_matches('/'))
}

/// `!g.json <data_prefix>/<stem>.json`, which the site generator loads as page data.
fn data_reference(config: &FrontMatterConfig, stem: &str) -> String {
    let prefix = config.data_prefix.trim_end_matches('/');
    format!("!g.json {prefix}/{}", ArtifactKind::DataSource.destination_for(stem))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
