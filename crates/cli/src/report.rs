//! Text report rendering
//!
//! Builds the human-readable analysis and bucket-trend reports as plain
//! strings so they can go to stdout and to `--output-report` files
//! identically.

use analyzer_lib::export::KB_PER_GIB;
use analyzer_lib::{
    short_cluster_name, ActionRecord, Commodity, ConsolidatedResult, LoadFilter, LoadStats,
    TimeBucketResult, WorkloadIdentity,
};
use std::collections::BTreeMap;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::output::{format_memory_gib, format_millicores, format_pct};

const SEPARATOR: &str =
    "================================================================================";

/// Everything the analysis report header needs besides the results.
pub struct AnalysisContext<'a> {
    pub source: &'a Path,
    pub filter: &'a LoadFilter,
    pub stats: &'a LoadStats,
    /// Lookback days when the recency filter was applied.
    pub recency_days: Option<u32>,
    pub show_all: bool,
}

/// Row for the workload detail table
#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Workload")]
    workload: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
    #[tabled(rename = "VCPUReq Δ")]
    vcpu_request: String,
    #[tabled(rename = "VCPU Δ")]
    vcpu: String,
    #[tabled(rename = "VMemReq Δ")]
    vmem_request: String,
    #[tabled(rename = "VMem Δ")]
    vmem: String,
    #[tabled(rename = "Days")]
    days: String,
}

impl ResultRow {
    fn from_result(result: &ConsolidatedResult) -> Self {
        Self {
            cluster: short_cluster_name(&result.cluster).to_string(),
            namespace: result.namespace.clone(),
            workload: format!("{}/{}", result.workload_kind, result.workload_name),
            container: result.container_spec.clone(),
            replicas: result.replicas.to_string(),
            vcpu_request: format_change(result, &Commodity::VCpuRequest),
            vcpu: format_change(result, &Commodity::VCpu),
            vmem_request: format_change(result, &Commodity::VMemRequest),
            vmem: format_change(result, &Commodity::VMem),
            days: result.time_span_days.to_string(),
        }
    }
}

/// Row for the bucket trend table
#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "VCPU (mc)")]
    vcpu: String,
    #[tabled(rename = "VCPUReq (mc)")]
    vcpu_request: String,
    #[tabled(rename = "VMem (GiB)")]
    vmem: String,
    #[tabled(rename = "VMemReq (GiB)")]
    vmem_request: String,
}

fn format_change(result: &ConsolidatedResult, commodity: &Commodity) -> String {
    if !result.changes.contains_key(commodity) {
        return "-".to_string();
    }
    let pct = format_pct(result.change_pct_for(commodity));
    format!("{} ({})", format_total(commodity, result.change_for(commodity)), pct)
}

fn format_total(commodity: &Commodity, total: f64) -> String {
    if commodity.is_memory() {
        format_memory_gib(total)
    } else {
        format_millicores(total)
    }
}

fn filter_lines(filter: &LoadFilter, recency_days: Option<u32>) -> Vec<String> {
    let mut lines = Vec::new();
    if !filter.clusters.is_empty() {
        lines.push(format!("  Clusters: {}", filter.clusters.join(", ")));
    }
    if !filter.namespaces.is_empty() {
        lines.push(format!("  Namespaces: {}", filter.namespaces.join(", ")));
    }
    match (filter.from, filter.to) {
        (Some(from), Some(to)) => lines.push(format!(
            "  Window: {} to {}",
            from.format("%Y-%m-%d %H:%M"),
            to.format("%Y-%m-%d %H:%M")
        )),
        (Some(from), None) => lines.push(format!("  From: {}", from.format("%Y-%m-%d %H:%M"))),
        (None, Some(to)) => lines.push(format!("  To: {}", to.format("%Y-%m-%d %H:%M"))),
        (None, None) => {}
    }
    if let Some(days) = recency_days {
        lines.push(format!("  Recency filter: {}-day lookback", days));
    }
    if lines.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines
}

/// Render the full analysis report.
pub fn render_analysis_report(results: &[ConsolidatedResult], ctx: &AnalysisContext) -> String {
    let mut out = String::new();

    out.push_str(SEPARATOR);
    out.push_str("\n CONTAINER RESIZE ANALYSIS REPORT\n");
    out.push_str(&format!(" Source: {}\n", ctx.source.display()));
    out.push_str(SEPARATOR);
    out.push('\n');

    out.push_str("\nFilters:\n");
    for line in filter_lines(ctx.filter, ctx.recency_days) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!(
        "\nLoad statistics: {} rows read, {} short, {} invalid, {} filtered out\n",
        ctx.stats.rows_read, ctx.stats.rows_short, ctx.stats.rows_invalid, ctx.stats.rows_filtered
    ));

    if results.is_empty() {
        out.push_str("\nNo results to report: no workloads matched the filters.\n");
        return out;
    }

    out.push_str(&format!("\nWorkloads analyzed: {}\n", results.len()));

    out.push_str("\nImpact by commodity:\n");
    for commodity in &Commodity::REPORTED {
        let mut increased = 0usize;
        let mut decreased = 0usize;
        let mut total = 0.0;
        for result in results {
            if !result.changes.contains_key(commodity) {
                continue;
            }
            let change = result.change_for(commodity);
            if change > 0.0 {
                increased += 1;
            } else if change < 0.0 {
                decreased += 1;
            }
            total += change;
        }
        out.push_str(&format!(
            "  {:<12} {} up, {} down, net {}\n",
            commodity.to_string(),
            increased,
            decreased,
            format_total(commodity, total)
        ));
    }

    let shown = if ctx.show_all {
        results.len()
    } else {
        results.len().min(10)
    };
    if ctx.show_all {
        out.push_str("\nAll workloads by VCPURequest change:\n");
    } else {
        out.push_str(&format!(
            "\nTop {} workloads by VCPURequest change (use --show-all for all {}):\n",
            shown,
            results.len()
        ));
    }

    let rows: Vec<ResultRow> = results[..shown].iter().map(ResultRow::from_result).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    out.push_str(&table);
    out.push('\n');

    out
}

/// Render the bucket-by-bucket trend report with totals across all buckets.
pub fn render_bucket_report(buckets: &[TimeBucketResult]) -> String {
    let mut out = String::new();

    out.push_str(SEPARATOR);
    out.push_str("\n TIME BUCKET TREND REPORT\n");
    out.push_str(SEPARATOR);
    out.push('\n');

    out.push_str(&format!("\nBuckets: {}\n\n", buckets.len()));

    let rows: Vec<BucketRow> = buckets
        .iter()
        .map(|bucket| BucketRow {
            from: bucket.from.format("%Y-%m-%d %H:%M").to_string(),
            to: bucket.to.format("%Y-%m-%d %H:%M").to_string(),
            vcpu: format!("{:+.0}", bucket.total_for(&Commodity::VCpu)),
            vcpu_request: format!("{:+.0}", bucket.total_for(&Commodity::VCpuRequest)),
            vmem: format!("{:+.2}", bucket.total_for(&Commodity::VMem) / KB_PER_GIB),
            vmem_request: format!(
                "{:+.2}",
                bucket.total_for(&Commodity::VMemRequest) / KB_PER_GIB
            ),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    out.push_str(&table);
    out.push('\n');

    out.push_str("\nTotals across all buckets:\n");
    for commodity in &Commodity::REPORTED {
        let total: f64 = buckets.iter().map(|bucket| bucket.total_for(commodity)).sum();
        out.push_str(&format!(
            "  {:<12} {}\n",
            commodity.to_string(),
            format_total(commodity, total)
        ));
    }

    out
}

/// Render the per-workload action breakdown: every action that feeds the
/// change calculations, grouped by workload and commodity, with the raw
/// CSV rows for audit.
pub fn render_actions_report(actions: &[ActionRecord], ctx: &AnalysisContext) -> String {
    let mut out = String::new();

    out.push_str(SEPARATOR);
    out.push_str("\n ACTIONS USED FOR CHANGE CALCULATIONS\n");
    out.push_str(SEPARATOR);
    out.push('\n');

    if actions.is_empty() {
        out.push_str("\nNo actions available to display.\n");
        return out;
    }

    out.push_str(&format!("\nTotal actions: {}\n", actions.len()));
    out.push_str("\nFilters:\n");
    for line in filter_lines(ctx.filter, ctx.recency_days) {
        out.push_str(&line);
        out.push('\n');
    }

    let mut workloads: BTreeMap<WorkloadIdentity, Vec<&ActionRecord>> = BTreeMap::new();
    for action in actions {
        let identity = WorkloadIdentity {
            cluster: action.cluster.clone(),
            namespace: action.namespace.clone(),
            workload_kind: action.workload_kind(),
            workload_name: action.workload_name.clone(),
        };
        workloads.entry(identity).or_default().push(action);
    }

    out.push_str("\nBreakdown by workload:\n");
    for (identity, mut workload_actions) in workloads {
        workload_actions.sort_by_key(|action| action.execution_datetime);

        out.push_str(&format!(
            "\n{}: {}\n",
            identity.workload_kind, identity.workload_name
        ));
        out.push_str(&format!(
            "  Cluster: {}\n",
            short_cluster_name(&identity.cluster)
        ));
        out.push_str(&format!("  Namespace: {}\n", identity.namespace));
        out.push_str(&format!("  Actions: {}\n", workload_actions.len()));

        let mut by_commodity: BTreeMap<&Commodity, Vec<&ActionRecord>> = BTreeMap::new();
        for &action in &workload_actions {
            by_commodity.entry(&action.commodity).or_default().push(action);
        }

        for (commodity, commodity_actions) in by_commodity {
            // Chronological order is inherited from the workload sort.
            let oldest = commodity_actions[0];
            let newest = commodity_actions[commodity_actions.len() - 1];

            out.push_str(&format!("    {}:\n", commodity));
            out.push_str(&format!("      Container: {}\n", oldest.container_spec));
            out.push_str(&format!("      Actions: {}\n", commodity_actions.len()));
            out.push_str(&format!(
                "      Time span: {} -> {}\n",
                oldest.execution_datetime.format("%d %b %Y %H:%M"),
                newest.execution_datetime.format("%d %b %Y %H:%M")
            ));
            out.push_str(&format!(
                "      Value change: {:.2} -> {:.2} {}\n",
                oldest.current_value, newest.new_value, oldest.units
            ));
            out.push_str(&format!(
                "      Replicas: {} -> {}\n",
                oldest.replicas.unwrap_or(0),
                newest.replicas.unwrap_or(0)
            ));
            let impact = newest.new_value * newest.replicas.unwrap_or(0) as f64
                - oldest.current_value * oldest.replicas.unwrap_or(0) as f64;
            out.push_str(&format!(
                "      Total impact change: {:+.2} {}\n",
                impact, oldest.units
            ));

            if commodity_actions.len() > 2 {
                out.push_str("      Individual actions:\n");
                for (index, action) in commodity_actions.iter().enumerate() {
                    out.push_str(&format!(
                        "        {}. {}: {:.2} -> {:.2} {} (replicas: {})\n",
                        index + 1,
                        action.execution_datetime.format("%d %b %Y %H:%M"),
                        action.current_value,
                        action.new_value,
                        action.units,
                        action.replicas.unwrap_or(0)
                    ));
                }
            }

            out.push_str("      Raw CSV actions:\n");
            for action in &commodity_actions {
                out.push_str(&format!("        {}\n", action.original_row.join(",")));
            }
        }
    }

    out.push_str("\nSummary by commodity:\n");
    let mut commodity_summary: BTreeMap<&Commodity, Vec<&ActionRecord>> = BTreeMap::new();
    for action in actions {
        commodity_summary.entry(&action.commodity).or_default().push(action);
    }
    for (commodity, mut commodity_actions) in commodity_summary {
        commodity_actions.sort_by_key(|action| action.execution_datetime);
        let workloads: std::collections::BTreeSet<_> = commodity_actions
            .iter()
            .map(|action| (&action.cluster, &action.namespace, &action.workload_name))
            .collect();
        out.push_str(&format!(
            "  {}: {} actions, {} workloads, {} -> {}\n",
            commodity,
            commodity_actions.len(),
            workloads.len(),
            commodity_actions[0].execution_datetime.format("%d %b %Y %H:%M"),
            commodity_actions[commodity_actions.len() - 1]
                .execution_datetime
                .format("%d %b %Y %H:%M")
        ));
    }

    out.push_str("\nAll raw actions (CSV format, chronological):\n");
    let mut sorted: Vec<&ActionRecord> = actions.iter().collect();
    sorted.sort_by_key(|action| action.execution_datetime);
    for action in sorted {
        out.push_str(&format!("  {}\n", action.original_row.join(",")));
    }

    out
}
