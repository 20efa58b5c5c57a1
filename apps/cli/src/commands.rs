//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use chapterbook_core::corpus::collect_corpus;
use chapterbook_core::pipeline::{self, BuildOutcome, ProgressReporter, SilentProgress};
use chapterbook_shared::{AppConfig, BuildConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Build a single-page offline reader from chapter files.
#[derive(Parser)]
#[command(
    name = "chapterbook",
    version,
    about = "Build a single self-contained reading page from a folder of chapter files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./chapterbook.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand; building is the default.
    #[command(subcommand)]
    pub command: Option<Command>,
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
    /// Build the reader page (the default when no subcommand is given).
    Build {
        /// Chapter directory (overrides config).
        #[arg(long)]
        chapters: Option<PathBuf>,

        /// Output HTML file (overrides config).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the chapters a build would include, in page order.
    List {
        /// Chapter directory (overrides config).
        #[arg(long)]
        chapters: Option<PathBuf>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
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
    /// Write ./chapterbook.toml with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "chapterbook=info",
        1 => "chapterbook=debug",
        _ => "chapterbook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        None => cmd_build(config_path, None, None),
        Some(Command::Build { chapters, out }) => cmd_build(config_path, chapters, out),
        Some(Command::List { chapters, json }) => cmd_list(config_path, chapters, json),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(
    config_path: Option<&Path>,
    chapters: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let app = load_config(config_path)?;
    let config = BuildConfig::resolve(&app, chapters, out)?;

    info!(
        chapters = %config.chapter_dir.display(),
        output = %config.output.display(),
        "building reader page"
    );

    let reporter = CliProgress::new();
    match pipeline::build(&config, &reporter)? {
        BuildOutcome::Built(report) => {
            println!(
                "生成 {} 章 -> {}",
                report.chapter_count,
                report.output_path.display()
            );
            info!(
                sha256 = %report.sha256,
                bytes = report.bytes_written,
                elapsed_ms = report.elapsed.as_millis(),
                "page written"
            );
        }
        BuildOutcome::NoChapters { chapter_dir } => {
            println!("没有找到章节文件！");
            info!(dir = %chapter_dir.display(), "nothing to build");
        }
    }

    Ok(())
}

fn cmd_list(config_path: Option<&Path>, chapters: Option<PathBuf>, json: bool) -> Result<()> {
    let app = load_config(config_path)?;
    let config = BuildConfig::resolve(&app, chapters, None)?;

    let corpus = collect_corpus(&config.chapter_dir, &config.chapter_pattern, &SilentProgress)?;
    let entries = corpus.nav_entries();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("没有找到章节文件！");
        return Ok(());
    }

    for (entry, chapter) in entries.iter().zip(corpus.chapters()) {
        println!(
            "{:>4}  {:>5}  {}  ({})",
            entry.index,
            entry.sequence_number,
            entry.short_title,
            chapter.source.display()
        );
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config(Path::new("."))?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
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

    fn chapter_extracted(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {title}"));
    }

    fn done(&self, _outcome: &BuildOutcome) {
        self.spinner.finish_and_clear();
    }
}
