//! Application configuration for sampledocs.
//!
//! Project config lives at `./sampledocs.toml` (or wherever `--config` points).
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SampleDocsError};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "sampledocs.toml";

// ---------------------------------------------------------------------------
// Config structs (matching sampledocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source and destination locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Values written into generated front matter.
    #[serde(default)]
    pub front_matter: FrontMatterConfig,

    /// Build behavior.
    #[serde(default)]
    pub build: BuildSettings,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory containing the annotated HTML samples.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Glob pattern, relative to `source_root`, selecting samples.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Directory generated artifacts are written under.
    #[serde(default = "default_destination_root")]
    pub destination_root: PathBuf,

    /// File under `destination_root` that cleanup never deletes.
    #[serde(default = "default_preserved_file")]
    pub preserved_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            pattern: default_pattern(),
            destination_root: default_destination_root(),
            preserved_file: default_preserved_file(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("samples")
}
fn default_pattern() -> String {
    "**/*.html".into()
}
fn default_destination_root() -> PathBuf {
    PathBuf::from("content/examples")
}
fn default_preserved_file() -> PathBuf {
    PathBuf::from("index.md")
}

/// `[front_matter]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatterConfig {
    /// URL prefix the request paths of generated documents start with.
    #[serde(default = "default_path_base")]
    pub path_base: String,

    /// Prefix of the data-source references, as seen by the site generator.
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,

    /// Template used by manual documents.
    #[serde(default = "default_manual_view")]
    pub manual_view: String,

    /// Template used by preview documents.
    #[serde(default = "default_preview_view")]
    pub preview_view: String,

    /// Blank template used by source documents.
    #[serde(default = "default_source_view")]
    pub source_view: String,
}

impl Default for FrontMatterConfig {
    fn default() -> Self {
        Self {
            path_base: default_path_base(),
            data_prefix: default_data_prefix(),
            manual_view: default_manual_view(),
            preview_view: default_preview_view(),
            source_view: default_source_view(),
        }
    }
}

fn default_path_base() -> String {
    "/documentation/examples".into()
}
fn default_data_prefix() -> String {
    "/content/examples".into()
}
fn default_manual_view() -> String {
    "/views/examples/manual.j2".into()
}
fn default_preview_view() -> String {
    "/views/examples/preview.j2".into()
}
fn default_source_view() -> String {
    "/views/examples/blank.j2".into()
}

/// `[build]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Maximum samples parsed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Fail the build when any sample is skipped.
    #[serde(default)]
    pub strict: bool,

    /// Quiet period after a change before watch mode rebuilds.
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            strict: false,
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}
fn default_watch_debounce_ms() -> u64 {
    200
}

impl AppConfig {
    /// Check values that serde defaults can't guard.
    pub fn validate(&self) -> Result<()> {
        if self.build.concurrency == 0 {
            return Err(SampleDocsError::config("build.concurrency must be at least 1"));
        }
        if self.paths.pattern.trim().is_empty() {
            return Err(SampleDocsError::config("paths.pattern must not be empty"));
        }
        if !self.front_matter.path_base.starts_with('/') {
            return Err(SampleDocsError::config(format!(
                "front_matter.path_base must start with '/', got '{}'",
                self.front_matter.path_base
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory containing the samples.
    pub source_root: PathBuf,
    /// Glob pattern relative to `source_root`.
    pub pattern: String,
    /// Directory artifacts are written under.
    pub destination_root: PathBuf,
    /// Cleanup exclusion, relative to `destination_root`.
    pub preserved_file: PathBuf,
    /// Front matter values.
    pub front_matter: FrontMatterConfig,
    /// Maximum samples processed at once.
    pub concurrency: usize,
    /// Treat skipped samples as a failed build.
    pub strict: bool,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            source_root: config.paths.source_root.clone(),
            pattern: config.paths.pattern.clone(),
            destination_root: config.paths.destination_root.clone(),
            preserved_file: config.paths.preserved_file.clone(),
            front_matter: config.front_matter.clone(),
            concurrency: config.build.concurrency.max(1),
            strict: config.build.strict,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the project config file in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = default_config_path();

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SampleDocsError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SampleDocsError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file at `path`. Refuses to overwrite an existing file.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(SampleDocsError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SampleDocsError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SampleDocsError::config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| SampleDocsError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sampledocs-config-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("source_root"));
        assert!(toml_str.contains("/views/examples/manual.j2"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
        assert_eq!(parsed.paths.preserved_file, PathBuf::from("index.md"));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml_str = r#"
[paths]
source_root = "src/samples"

[build]
strict = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.source_root, PathBuf::from("src/samples"));
        assert_eq!(config.paths.pattern, "**/*.html");
        assert!(config.build.strict);
        assert_eq!(config.build.concurrency, 4);
    }

    #[test]
    fn pipeline_config_from_app_config() {
        let app = AppConfig::default();
        let pipeline = PipelineConfig::from(&app);
        assert_eq!(pipeline.concurrency, 4);
        assert!(!pipeline.strict);
        assert_eq!(pipeline.front_matter.path_base, "/documentation/examples");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.build.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.front_matter.path_base = "documentation".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn init_then_load() {
        let tmp = temp_dir();
        let path = tmp.join("nested").join(CONFIG_FILE_NAME);

        init_config(&path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, AppConfig::default());

        // Second init refuses to clobber
        assert!(init_config(&path).is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
