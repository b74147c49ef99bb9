//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use subjects_fast_converter::ConvertedFacet;
use subjects_fast_core::pipeline::{
    ProgressReporter, RefreshConfig, RefreshResult, select_facets,
};
use subjects_fast_downloader::{DownloadOptions, DownloadedArchive};
use subjects_fast_shared::{AppConfig, FacetTable, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// subjects-fast: FAST vocabularies as registry-ready YAML.
#[derive(Parser)]
#[command(
    name = "subjects-fast",
    version,
    about = "Download FAST MARCXML archives and convert them into YAML subject vocabularies.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.subjects-fast/subjects-fast.toml.
    #[arg(long, global = true, env = "SUBJECTS_FAST_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Fetch and extract the FAST MARCXML archives.
    Download {
        /// Download directory (defaults to [paths].download_dir).
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Restrict to these facets (repeatable), e.g. `--facet personal`.
        #[arg(short, long = "facet")]
        facets: Vec<String>,
    },

    /// Convert extracted MARCXML files into YAML vocabularies.
    Convert {
        /// Directory holding the extracted `.marcxml` files.
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory for `subjects_fast_*.yaml`.
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Restrict to these facets (repeatable).
        #[arg(short, long = "facet")]
        facets: Vec<String>,
    },

    /// Download, then convert.
    Refresh {
        /// Download directory.
        #[arg(short, long)]
        downloads: Option<PathBuf>,

        /// Output directory for `subjects_fast_*.yaml`.
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Restrict to these facets (repeatable).
        #[arg(short, long = "facet")]
        facets: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
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
        0 => "subjects_fast=info",
        1 => "subjects_fast=debug",
        _ => "subjects_fast=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Download { dir, facets } => cmd_download(config_path, dir, &facets).await,
        Command::Convert {
            source,
            target,
            facets,
        } => cmd_convert(config_path, source, target, &facets).await,
        Command::Refresh {
            downloads,
            target,
            facets,
        } => cmd_refresh(config_path, downloads, target, &facets).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load the config from `--config` if given, else the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

fn facet_table(config: &AppConfig, facets: &[String]) -> Result<FacetTable> {
    Ok(select_facets(config.facet_table()?, facets)?)
}

fn download_options(config: &AppConfig) -> DownloadOptions {
    DownloadOptions {
        timeout_secs: config.source.timeout_secs,
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_download(
    config_path: Option<&Path>,
    dir: Option<PathBuf>,
    facets: &[String],
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let table = facet_table(&config, facets)?;
    let dir = dir.unwrap_or_else(|| PathBuf::from(&config.paths.download_dir));

    info!(dir = %dir.display(), facets = table.facets().len(), "downloading archives");

    let archives =
        subjects_fast_downloader::download(&table, &dir, &download_options(&config)).await?;

    println!();
    println!("  Downloaded {} archive(s) into {}", archives.len(), dir.display());
    for archive in &archives {
        println!(
            "  {:<36} {:>12} bytes  sha256:{}",
            archive.zip_path.display(),
            archive.bytes,
            archive.sha256
        );
    }
    println!();

    Ok(())
}

async fn cmd_convert(
    config_path: Option<&Path>,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    facets: &[String],
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let table = facet_table(&config, facets)?;
    let source = source.unwrap_or_else(|| PathBuf::from(&config.paths.download_dir));
    let target = target.unwrap_or_else(|| PathBuf::from(&config.paths.vocabularies_dir));

    info!(
        source = %source.display(),
        target = %target.display(),
        "converting MARCXML"
    );

    let report = subjects_fast_converter::convert(&table, &source, &target)?;
    if !report.all_converted() {
        return Err(eyre!(
            "only {} of {} facets were converted",
            report.converted.len(),
            report.requested.len()
        ));
    }

    println!();
    for converted in &report.converted {
        println!(
            "  {:<14} {:>8} entries  {}",
            converted.facet,
            converted.entries,
            converted.output.display()
        );
    }
    println!("  Total: {} entries", report.total_entries());
    println!();

    Ok(())
}

async fn cmd_refresh(
    config_path: Option<&Path>,
    downloads: Option<PathBuf>,
    target: Option<PathBuf>,
    facets: &[String],
) -> Result<()> {
    let config = resolve_config(config_path)?;

    let refresh_config = RefreshConfig {
        table: facet_table(&config, facets)?,
        download_dir: downloads.unwrap_or_else(|| PathBuf::from(&config.paths.download_dir)),
        vocabularies_dir: target
            .unwrap_or_else(|| PathBuf::from(&config.paths.vocabularies_dir)),
        download: download_options(&config),
    };

    info!(
        base_url = %refresh_config.table.base_url(),
        downloads = %refresh_config.download_dir.display(),
        target = %refresh_config.vocabularies_dir.display(),
        "refreshing FAST vocabularies"
    );

    let reporter = CliProgress::new();
    let result = subjects_fast_core::pipeline::refresh(&refresh_config, &reporter).await;
    if result.is_err() {
        reporter.spinner.abandon();
    }
    let result = result?;

    println!();
    println!("  FAST vocabularies refreshed!");
    println!("  Archives: {}", result.archives.len());
    println!("  Entries:  {}", result.conversion.total_entries());
    println!("  Output:   {}", refresh_config.vocabularies_dir.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
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
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn archive_downloaded(&self, archive: &DownloadedArchive, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Downloaded [{current}/{total}] {}",
            archive.facet.zip_file_name()
        ));
    }

    fn facet_converted(&self, converted: &ConvertedFacet, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Converted [{current}/{total}] {} ({} entries)",
            converted.facet, converted.entries
        ));
    }

    fn done(&self, _result: &RefreshResult) {
        self.spinner.finish_and_clear();
    }
}
