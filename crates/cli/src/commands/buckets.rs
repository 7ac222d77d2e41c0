//! The buckets subcommand: time-bucketed impact trends

use analyzer_lib::export::write_buckets_csv;
use analyzer_lib::{
    analyze_buckets, load_actions, parse_bucket_duration, BucketConfig, DedupPolicy, LoadFilter,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::output::{print_success, print_warning};
use crate::report::render_bucket_report;

pub struct BucketsArgs {
    pub csv: PathBuf,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
    pub bucket_size: String,
    pub clusters: Vec<String>,
    pub dedup: Option<DedupPolicy>,
}

pub fn run(args: BucketsArgs) -> Result<()> {
    // Validate the duration expression before touching the data.
    let duration = parse_bucket_duration(&args.bucket_size)?;

    let config = Config::load().unwrap_or_default();
    let clusters = if args.clusters.is_empty() {
        config.default_clusters
    } else {
        args.clusters
    };
    let filter = LoadFilter {
        clusters,
        ..LoadFilter::default()
    };

    let loaded = load_actions(&args.csv, &filter, true)?;
    if loaded.actions.is_empty() {
        print_warning("No valid actions matched the filters; nothing to bucket");
        return Ok(());
    }

    let mut bucket_config = BucketConfig::new(duration);
    bucket_config.dedup = args.dedup;
    let buckets = analyze_buckets(&loaded.actions, &bucket_config)?;

    write_buckets_csv(&args.output, &buckets)?;
    print_success(&format!(
        "Bucket series written to {} ({} buckets)",
        args.output.display(),
        buckets.len()
    ));

    let report = render_bucket_report(&buckets);
    println!("{report}");

    if let Some(path) = &args.report {
        std::fs::write(path, &report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        print_success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}
