//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use sampledocs_core::{BuildReporter, DirectorySink, PipelineSummary, check_samples};
use sampledocs_parser::HtmlSampleParser;
use sampledocs_shared::{
    AppConfig, PipelineConfig, SampleDocsError, default_config_path, init_config, load_config,
    load_config_from,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sampledocs: generate documentation pages from annotated HTML samples.
#[derive(Parser)]
#[command(
    name = "sampledocs",
    version,
    about = "Generate documentation pages from annotated HTML samples.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./sampledocs.toml if present).
    #[arg(long, global = true, env = "SAMPLEDOCS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Clean the destination and generate every artifact once.
    Build(BuildArgs),

    /// Generate once, then regenerate on every source change until Ctrl-C.
    Watch {
        #[command(flatten)]
        build: BuildArgs,

        /// Quiet period after a change before regenerating, in milliseconds.
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// Parse-check every sample without writing anything.
    List {
        /// Directory containing the samples.
        #[arg(long)]
        source: Option<PathBuf>,

        /// Glob pattern relative to the source directory.
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides shared by `build` and `watch`.
#[derive(Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Directory containing the samples.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Directory artifacts are written under.
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Glob pattern relative to the source directory.
    #[arg(long)]
    pub pattern: Option<String>,

    /// Fail the build if any sample is skipped.
    #[arg(long)]
    pub strict: bool,

    /// Maximum samples processed at once.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
}

impl BuildArgs {
    /// Layer the flags over the file config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(source) = &self.source {
            config.paths.source_root = source.clone();
        }
        if let Some(dest) = &self.dest {
            config.paths.destination_root = dest.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.paths.pattern = pattern.clone();
        }
        if self.strict {
            config.build.strict = true;
        }
        if let Some(concurrency) = self.concurrency {
            config.build.concurrency = concurrency;
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Where to write it (defaults to ./sampledocs.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sampledocs=info",
        1 => "sampledocs=debug",
        _ => "sampledocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Build(args) => cmd_build(config_path.as_deref(), &args).await,
        Command::Watch { build, debounce_ms } => {
            cmd_watch(config_path.as_deref(), &build, debounce_ms).await
        }
        Command::List { source, pattern } => {
            let args = BuildArgs {
                source,
                pattern,
                ..BuildArgs::default()
            };
            cmd_list(config_path.as_deref(), &args)
        }
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(path),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

/// Load the explicit config file, or `./sampledocs.toml`, or defaults.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// File config with flags on top, validated again after the merge.
fn merged_config(path: Option<&Path>, args: &BuildArgs) -> Result<AppConfig> {
    let mut config = resolve_config(path)?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(config_path: Option<&Path>, args: &BuildArgs) -> Result<()> {
    let config = PipelineConfig::from(&merged_config(config_path, args)?);
    info!(
        source = %config.source_root.display(),
        dest = %config.destination_root.display(),
        strict = config.strict,
        "building examples"
    );

    let parser = Arc::new(HtmlSampleParser::new(&config.source_root));
    let sink = DirectorySink::new(&config.destination_root);
    let progress = CliProgress::new();

    let result = sampledocs_core::build(&config, parser, &sink, &progress).await;
    progress.finish();
    result?;
    Ok(())
}

async fn cmd_watch(
    config_path: Option<&Path>,
    args: &BuildArgs,
    debounce_ms: Option<u64>,
) -> Result<()> {
    let merged = merged_config(config_path, args)?;
    let debounce = Duration::from_millis(debounce_ms.unwrap_or(merged.build.watch_debounce_ms));
    let config = PipelineConfig::from(&merged);

    info!(
        source = %config.source_root.display(),
        dest = %config.destination_root.display(),
        debounce_ms = debounce.as_millis(),
        "watching examples"
    );

    let parser = Arc::new(HtmlSampleParser::new(&config.source_root));
    let sink = DirectorySink::new(&config.destination_root);
    let progress = CliProgress::new();
    let result =
        sampledocs_core::watch(&config, parser, &sink, &progress, debounce, shutdown_signal()).await;
    progress.finish();
    let cycles = result?;
    println!("Stopped after {cycles} build(s).");
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler, stop the process to end watch");
        std::future::pending::<()>().await;
    }
}

fn cmd_list(config_path: Option<&Path>, args: &BuildArgs) -> Result<()> {
    let config = PipelineConfig::from(&merged_config(config_path, args)?);
    let parser = HtmlSampleParser::new(&config.source_root);
    let checks = check_samples(&config, &parser)?;

    let mut failed = 0;
    for check in &checks {
        match &check.result {
            Ok(doc) => println!("ok     {}  ({}, {} sections)", check.path, doc.title, doc.sections.len()),
            Err(e) => {
                failed += 1;
                println!("error  {}  {e}", check.path);
            }
        }
    }
    println!();
    println!("  {} sample(s), {failed} with errors", checks.len());

    if failed > 0 {
        return Err(eyre!("{failed} sample(s) failed to parse"));
    }
    Ok(())
}

fn cmd_config_init(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(default_config_path);
    let path = init_config(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl BuildReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn run_started(&self, source_root: &Path) {
        self.spinner
            .set_message(format!("Scanning {}", source_root.display()));
    }

    fn item_started(&self, relative_path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Generating [{current}/{total}] {relative_path}"));
    }

    fn item_failed(&self, relative_path: &str, error: &SampleDocsError) {
        self.spinner
            .println(format!("  skipped {relative_path}: {error}"));
    }

    fn run_succeeded(&self, summary: &PipelineSummary) {
        self.spinner.println(format!(
            "  Generated {} sample(s), {} artifact(s) in {:.1}s",
            summary.generated,
            summary.artifacts_written,
            summary.elapsed.as_secs_f64()
        ));
        if !summary.skipped.is_empty() {
            self.spinner
                .println(format!("  Skipped {} sample(s):", summary.skipped.len()));
            for skipped in &summary.skipped {
                self.spinner.println(format!("    {}", skipped.path));
            }
        }
    }

    fn run_failed(&self, error: &SampleDocsError) {
        match error.failed_stage() {
            Some(stage) => self.spinner.println(format!("  Build failed during {stage}: {error}")),
            None => self.spinner.println(format!("  Build failed: {error}")),
        }
    }
}
