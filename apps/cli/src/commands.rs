//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use civis_core::{IngestResult, ProgressReporter, ThemeBacklog};
use civis_shared::{AppConfig, IngestConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Civis: Chamber of Deputies roll-call dataset builder.
#[derive(Parser)]
#[command(
    name = "civis",
    version,
    about = "Build a motions/deputies/roll-calls dataset from the Chamber of Deputies web service.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.civis/civis.toml.
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

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
    /// Fetch propositions and votes for a year range and write the dataset.
    Ingest(IngestArgs),

    /// Report what the theme classifier still has to do.
    Themes {
        /// Motions directory to scan (defaults to the configured one).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags of `civis ingest`. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct IngestArgs {
    /// First year to gather (inclusive).
    #[arg(long, env = "YEAR_BEGIN")]
    pub begin: Option<i32>,

    /// Last year to gather (inclusive).
    #[arg(long, env = "YEAR_END")]
    pub end: Option<i32>,

    /// Maximum in-flight proposition fetches.
    #[arg(short, long, env = "API_CONCURRENCY")]
    pub concurrency: Option<u32>,

    /// Output root directory for the dataset.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Theme lookup table to apply.
    #[arg(long, conflicts_with = "no_themes")]
    pub themes: Option<PathBuf>,

    /// Do not apply any theme lookup table.
    #[arg(long)]
    pub no_themes: bool,
}

impl IngestArgs {
    /// Merge these flags over the loaded config.
    fn resolve(&self, mut app: AppConfig) -> IngestConfig {
        if let Some(begin) = self.begin {
            app.years.begin = begin;
        }
        if let Some(end) = self.end {
            app.years.end = end;
        }
        if let Some(concurrency) = self.concurrency {
            app.api.concurrency = concurrency;
        }
        if let Some(out) = &self.out {
            app.paths.output_dir = out.to_string_lossy().into_owned();
        }

        let mut config = IngestConfig::from(&app);
        if self.no_themes {
            config.themes_file = None;
        } else if let Some(themes) = &self.themes {
            config.themes_file = Some(themes.clone());
        }
        config
    }
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
        0 => "civis=info",
        1 => "civis=debug",
        _ => "civis=trace",
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
    let config_path = cli.config_file.as_deref();
    match cli.command {
        Command::Ingest(args) => cmd_ingest(config_path, &args).await,
        Command::Themes { dir } => cmd_themes(config_path, dir.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(config_path: Option<&Path>, args: &IngestArgs) -> Result<()> {
    let app = load_app_config(config_path)?;
    let config = args.resolve(app);
    config.validate()?;

    info!(
        begin = config.year_begin,
        end = config.year_end,
        concurrency = config.concurrency,
        "starting ingest"
    );

    let reporter = CliProgress::new()?;
    let result = civis_core::ingest(&config, &reporter).await?;

    // Print summary
    println!();
    println!("  Dataset written.");
    println!("  Run:         {}", result.run_id);
    println!(
        "  Years:       {}-{} ({} failed)",
        config.year_begin,
        config.year_end,
        result.failed_years()
    );
    println!("  Listed:      {}", result.listed_total);
    println!("  Unique:      {}", result.unique_propositions);
    println!("  Processed:   {}", result.processed);
    println!("  Duplicates:  {}", result.duplicates);
    println!("  Errors:      {}", result.errors);
    println!("  Motions:     {}", result.motions);
    println!("  Deputies:    {}", result.deputies);
    println!("  Roll calls:  {}", result.roll_calls);
    println!("  Output:      {}", config.output.motions_dir.display());
    println!("  Time:        {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_themes(config_path: Option<&Path>, dir: Option<&Path>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => {
            let app = load_app_config(config_path)?;
            IngestConfig::from(&app).output.motions_dir
        }
    };

    if !dir.is_dir() {
        return Err(eyre!(
            "motions directory '{}' does not exist; run `civis ingest` first",
            dir.display()
        ));
    }

    let backlog = ThemeBacklog::scan(&dir)?;

    println!();
    println!("  Motions scanned: {}", backlog.scanned);
    println!("  Individual themes ({}):", backlog.themes.len());
    for theme in &backlog.themes {
        println!("    - {theme}");
    }
    println!("  To narrow (multi-theme): {}", backlog.multi_themed.len());
    for entry in &backlog.multi_themed {
        println!("    {}  [{}]", entry.file, entry.candidates.join(" | "));
    }
    println!("  To classify (NO THEME):  {}", backlog.unthemed.len());
    println!("  Total pending:           {}", backlog.pending());
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
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
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn proposition_done(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching propositions [{current}/{total}]"));
    }

    fn done(&self, _result: &IngestResult) {
        self.spinner.finish_and_clear();
    }
}
