//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use geoflow_core::{PipelineConfig, PipelineReport, StageProgress, run_pipeline};
use geoflow_shared::{AppConfig, DatasetLocation, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Geoflow — turn GEO series archives into tidy CSV tables.
#[derive(Parser)]
#[command(
    name = "geoflow",
    version,
    about = "Fetch, unpack, and tabulate GEO series supplementary archives.",
    long_about = None,
)]
pub(crate) struct Cli {
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
    /// Run the full pipeline for a dataset accession.
    Run {
        /// GEO series accession, e.g. GSE12345.
        dataset: String,

        /// Base directory for dataset output (defaults to config value).
        #[arg(short, long)]
        base_dir: Option<String>,

        /// GEO mirror base URL (defaults to config value).
        #[arg(long)]
        mirror: Option<String>,
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
    /// Write a default config file to ~/.geoflow/geoflow.toml.
    Init,
    /// Print the effective configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // EnvFilter directives match whole crate names, so cover every
    // geoflow_* crate at the chosen level.
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = ["shared", "fetch", "archive", "tables", "core", "cli"]
        .map(|c| format!("geoflow_{c}={level}"))
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            dataset,
            base_dir,
            mirror,
        } => cmd_run(&dataset, base_dir.as_deref(), mirror.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(dataset: &str, base_dir: Option<&str>, mirror: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let base_dir = resolve_base_dir(base_dir.unwrap_or(&config.defaults.base_dir))?;
    let mirror_raw = mirror.unwrap_or(&config.mirror.base_url);
    let mirror_base =
        Url::parse(mirror_raw).map_err(|e| eyre!("invalid mirror URL '{mirror_raw}': {e}"))?;

    let pipeline_config = PipelineConfig {
        location: DatasetLocation::new(dataset, base_dir),
        mirror_base,
        concurrency: config.defaults.concurrency as usize,
    };

    info!(dataset, "running pipeline");

    let reporter = CliProgress::new();
    let report = run_pipeline(&pipeline_config, &reporter).await?;
    reporter.finish();

    print_summary(dataset, &report);
    Ok(())
}

fn print_summary(dataset: &str, report: &PipelineReport) {
    println!();
    println!("  Dataset processed!");
    println!("  Accession: {dataset}");
    println!("  Executed:  {}", format_stages(&report.executed));
    println!("  Skipped:   {}", format_stages(&report.skipped));
    println!("  Output:    {}", report.trimmed_dir.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

fn format_stages(stages: &[&'static str]) -> String {
    if stages.is_empty() {
        "(none)".into()
    } else {
        stages.join(", ")
    }
}

/// Expand a leading `~/` against the home directory.
fn resolve_base_dir(raw: &str) -> Result<PathBuf> {
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| eyre!("cannot determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(raw))
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("wrote default config to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    println!("base_dir    = {}", config.defaults.base_dir);
    println!("concurrency = {}", config.defaults.concurrency);
    println!("mirror      = {}", config.mirror.base_url);
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
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl StageProgress for CliProgress {
    fn stage_started(&self, name: &str) {
        self.spinner.set_message(format!("Running stage: {name}"));
    }

    fn stage_skipped(&self, name: &str) {
        self.spinner
            .set_message(format!("Skipping stage (output exists): {name}"));
    }
}
