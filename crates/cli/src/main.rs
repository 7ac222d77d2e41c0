//! Container Resize Analyzer CLI
//!
//! A command-line tool for analyzing executed container resize actions:
//! per-workload change consolidation, duplicate cleanup, and time-bucketed
//! impact trends.

mod commands;
mod config;
mod output;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use analyzer_lib::DedupPolicy;

/// Container Resize Analyzer CLI
#[derive(Parser)]
#[command(name = "cra")]
#[command(author, version, about = "CLI for the Container Resize Analyzer", long_about = None)]
pub struct Cli {
    /// Output format for analysis results (defaults to table, or the
    /// configured default)
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze resize actions and report per-workload resource changes
    Analyze {
        /// Path to the resize action export CSV
        csv: PathBuf,

        /// Write the text report to a file in addition to stdout
        #[arg(long)]
        output_report: Option<PathBuf>,

        /// Export consolidated results to a CSV file
        #[arg(long)]
        output_csv: Option<PathBuf>,

        /// Show every workload in the detail table instead of the top 10
        #[arg(long)]
        show_all: bool,

        /// Print the per-workload action breakdown with raw CSV rows
        #[arg(long)]
        show_actions: bool,

        /// Filter by cluster, full or short name (repeatable)
        #[arg(long = "cluster")]
        clusters: Vec<String>,

        /// Filter by namespace, trailing '*' matches a prefix (repeatable)
        #[arg(long = "namespace")]
        namespaces: Vec<String>,

        /// Only include actions executed at or after this date
        /// (e.g. '01 Sep 2025 00:00' or '2025-09-01 00:00:00')
        #[arg(long)]
        from: Option<String>,

        /// Only include actions executed at or before this date
        #[arg(long)]
        to: Option<String>,

        /// Drop workloads with no activity inside the lookback window
        #[arg(long)]
        conservative: bool,

        /// Lookback window in days for --conservative (default 14, or the
        /// configured default)
        #[arg(long)]
        conservative_days: Option<u32>,
    },

    /// Remove consecutive duplicate actions and write a cleaned export
    Dedup {
        /// Path to the resize action export CSV
        input: PathBuf,

        /// Path for the cleaned CSV
        output: PathBuf,

        /// Write removed rows with their reasons to an audit CSV
        #[arg(long)]
        report: Option<PathBuf>,

        /// Discard every group that contains a duplicate pair
        #[arg(long)]
        conservative: bool,
    },

    /// Aggregate resize impact into fixed-duration time buckets
    Buckets {
        /// Path to the resize action export CSV
        csv: PathBuf,

        /// Output CSV path for the bucket series
        #[arg(long, short)]
        output: PathBuf,

        /// Write the bucket trend report to a file in addition to stdout
        #[arg(long)]
        report: Option<PathBuf>,

        /// Bucket duration (e.g. 7d, 24h, 30m, 1.5h, 2d 4h)
        #[arg(long, default_value = "7d")]
        bucket_size: String,

        /// Filter by cluster, full or short name (repeatable)
        #[arg(long = "cluster")]
        clusters: Vec<String>,

        /// Run a dedup pass inside each bucket before analysis
        #[arg(long, value_enum)]
        dedup: Option<DedupArg>,
    },
}

/// Dedup policy selector for `--dedup`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DedupArg {
    Standard,
    Conservative,
}

impl From<DedupArg> for DedupPolicy {
    fn from(arg: DedupArg) -> Self {
        match arg {
            DedupArg::Standard => DedupPolicy::Standard,
            DedupArg::Conservative => DedupPolicy::Conservative,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            csv,
            output_report,
            output_csv,
            show_all,
            show_actions,
            clusters,
            namespaces,
            from,
            to,
            conservative,
            conservative_days,
        } => commands::analyze::run(commands::analyze::AnalyzeArgs {
            csv,
            output_report,
            output_csv,
            show_all,
            show_actions,
            clusters,
            namespaces,
            from,
            to,
            conservative,
            conservative_days,
            format: cli.format,
        }),
        Commands::Dedup {
            input,
            output,
            report,
            conservative,
        } => commands::dedup::run(&input, &output, report.as_deref(), conservative),
        Commands::Buckets {
            csv,
            output,
            report,
            bucket_size,
            clusters,
            dedup,
        } => commands::buckets::run(commands::buckets::BucketsArgs {
            csv,
            output,
            report,
            bucket_size,
            clusters,
            dedup: dedup.map(DedupPolicy::from),
        }),
    }
}
