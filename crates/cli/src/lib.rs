mod check;
mod query;
mod scan;
mod schema;
mod stats;
mod view;

use clap::{Args, Parser, Subcommand};
use crumbtrail_core::{CancellationToken, Report, ScanConfig, Scanner};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "crumbtrail",
    version,
    about = "Extract, validate and query AI breadcrumb annotations",
    long_about = "Crumbtrail scans source trees for structured `KEY: value` breadcrumb comments \
                  (AI_PHASE, AI_STATUS, AI_DEPENDENCIES, ...), validates them per record and \
                  across the corpus, and reports the result as JSON, tables or diagnostics."
)]
pub struct Cli {
    /// Also log to stderr (the log file under ~/.crumbtrail/logs is always written)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that scans.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanOptions {
    /// JSON config file. Defaults to crumbtrail.json in the first scanned directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File extension to scan (repeatable). Replaces the configured list
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Stop after this many files, in sorted path order
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Follow symbolic links while walking
    #[arg(long)]
    pub follow_links: bool,
}

impl ScanOptions {
    /// defaults < config file < environment < flags
    pub fn resolve(&self, paths: &[PathBuf]) -> crumbtrail_core::Result<ScanConfig> {
        let base = match &self.config {
            Some(file) => ScanConfig::from_file(file)?,
            None => match paths.first() {
                Some(root) => ScanConfig::discover(config_root(root))?,
                None => ScanConfig::default(),
            },
        };
        let mut config = base.apply_env()?;

        if !self.extensions.is_empty() {
            config = config.with_extensions(self.extensions.iter().cloned());
        }
        if let Some(max) = self.max_files {
            config = config.with_max_files(Some(max));
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        config.include_hidden |= self.hidden;
        config.follow_links |= self.follow_links;
        Ok(config)
    }
}

fn config_root(path: &Path) -> &Path {
    if path.is_dir() {
        return path;
    }
    path.parent().unwrap_or(path)
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan files or directories and write the JSON report
    Scan {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        options: ScanOptions,
    },
    /// Print corpus statistics as tables
    Stats {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: ScanOptions,
    },
    /// Run a JSON query against a scanned tree
    #[command(
        long_about = "Scans PATH and executes a query, e.g. \
                      '{\"command\": \"phase\", \"phase\": \"MEMORY_MANAGER\", \"latest\": true}'. \
                      Run `crumbtrail schema --query` for every command and field."
    )]
    Query {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        #[arg(value_name = "JSON_QUERY")]
        query: String,

        /// Print matching records as a table instead of JSON
        #[arg(long)]
        table: bool,

        #[command(flatten)]
        options: ScanOptions,
    },
    /// Print diagnostics; exits with status 1 when any error is found
    Check {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Treat warnings as errors for the exit status
        #[arg(long)]
        strict: bool,

        /// Hide info-level diagnostics
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        options: ScanOptions,
    },
    /// Print the JSON Schema of the report (or of the query DSL)
    Schema {
        #[arg(long)]
        query: bool,
    },
}

pub fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = crumbtrail_core::logging::init_logging("cli", cli.verbose);

    match cli.command {
        Commands::Scan {
            paths,
            output,
            compact,
            options,
        } => {
            let report = scan_with_interrupt(&paths, &options)?;
            scan::run(&report, output.as_deref(), compact)
        }
        Commands::Stats { paths, options } => {
            let report = scan_with_interrupt(&paths, &options)?;
            stats::run(&report)
        }
        Commands::Query {
            path,
            query,
            table,
            options,
        } => {
            let query = query::parse(&query)?;
            let report = scan_with_interrupt(std::slice::from_ref(&path), &options)?;
            query::run(&report, &query, table)
        }
        Commands::Check {
            paths,
            strict,
            quiet,
            options,
        } => {
            let report = scan_with_interrupt(&paths, &options)?;
            check::run(&report, strict, quiet)
        }
        Commands::Schema { query } => schema::run(query),
    }
}

/// Runs the scan on a blocking thread; Ctrl-C cancels the files not yet
/// started and the partial report is still returned.
fn scan_with_interrupt(
    paths: &[PathBuf],
    options: &ScanOptions,
) -> Result<Report, Box<dyn std::error::Error>> {
    let config = options.resolve(paths)?;
    let token = CancellationToken::new();
    let scanner = Scanner::with_cancellation(config, token.clone());
    let paths = paths.to_vec();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut task = tokio::task::spawn_blocking(move || scanner.scan(&paths));
        let report = tokio::select! {
            joined = &mut task => joined??,
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => {
                        warn!("Interrupted, finishing files already in progress");
                        token.cancel();
                    }
                    Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
                }
                task.await??
            }
        };
        if report.is_cancelled() {
            info!("Returning partial report");
        }
        Ok::<Report, Box<dyn std::error::Error>>(report)
    })
}
