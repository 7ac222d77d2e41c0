//! The analyze subcommand: end-to-end change consolidation

use analyzer_lib::grouping::group_sorted;
use analyzer_lib::ingest::parse_filter_timestamp;
use analyzer_lib::{
    analyze_changes, apply_recency_filter, cutoff_from, load_actions, sort_by_vcpu_request_change,
    GroupKey, LoadFilter,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::output::{print_info, print_success, resolve_format, OutputFormat};
use crate::report::{render_actions_report, render_analysis_report, AnalysisContext};

const DEFAULT_LOOKBACK_DAYS: u32 = 14;

pub struct AnalyzeArgs {
    pub csv: PathBuf,
    pub output_report: Option<PathBuf>,
    pub output_csv: Option<PathBuf>,
    pub show_all: bool,
    pub show_actions: bool,
    pub clusters: Vec<String>,
    pub namespaces: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub conservative: bool,
    pub conservative_days: Option<u32>,
    pub format: Option<OutputFormat>,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let config = Config::load().unwrap_or_default();

    // Argument errors are fatal before any data is read.
    let from = args
        .from
        .as_deref()
        .map(parse_filter_timestamp)
        .transpose()?;
    let to = args.to.as_deref().map(parse_filter_timestamp).transpose()?;

    let clusters = if args.clusters.is_empty() {
        config.default_clusters.clone()
    } else {
        args.clusters
    };
    let filter = LoadFilter {
        clusters,
        namespaces: args.namespaces,
        from,
        to,
    };

    let format = resolve_format(args.format, config.default_format.as_deref());
    let loaded = load_actions(&args.csv, &filter, true)?;
    let stats = loaded.stats;

    let recency_days = args.conservative.then(|| {
        args.conservative_days
            .or(config.default_lookback_days)
            .unwrap_or(DEFAULT_LOOKBACK_DAYS)
    });

    let ctx = AnalysisContext {
        source: &args.csv,
        filter: &filter,
        stats: &stats,
        recency_days,
        show_all: args.show_all,
    };

    // Built from the pre-grouping action list: the breakdown shows every
    // action that feeds the calculations, retries included.
    let actions_report = args
        .show_actions
        .then(|| render_actions_report(&loaded.actions, &ctx));

    let mut groups = group_sorted(loaded.actions, GroupKey::of);
    if let Some(days) = recency_days {
        let reference = to.unwrap_or_else(|| chrono::Local::now().naive_local());
        groups = apply_recency_filter(groups, cutoff_from(reference, days));
    }

    let mut results = analyze_changes(&groups);
    sort_by_vcpu_request_change(&mut results);

    let report = render_analysis_report(&results, &ctx);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => println!("{report}"),
    }

    if let Some(text) = &actions_report {
        println!("{text}");
    }

    if let Some(path) = &args.output_report {
        std::fs::write(path, &report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        print_success(&format!("Report written to {}", path.display()));
    }

    if let Some(path) = &args.output_csv {
        analyzer_lib::export::write_results_csv(path, &results)?;
        print_success(&format!(
            "Results exported to {} ({} workloads)",
            path.display(),
            results.len()
        ));
    }

    if results.is_empty() {
        print_info("No workloads matched the filters");
    }

    Ok(())
}
