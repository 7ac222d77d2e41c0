//! CSV writers for the four output files
//!
//! Cleaned exports re-emit the original rows untouched; the analysis and
//! bucket exports render computed values (memory in GiB, CPU in raw
//! millicores).

use crate::dedup::RemovedAction;
use crate::error::{AnalyzerError, Result};
use crate::models::{ActionRecord, Commodity, ConsolidatedResult, TimeBucketResult};
use std::path::Path;

/// KB per GiB: the export carries memory values in KB.
pub const KB_PER_GIB: f64 = 1_048_576.0;

const RESULT_HEADERS: [&str; 18] = [
    "cluster",
    "namespace",
    "workload_kind",
    "workload_name",
    "container_spec",
    "replicas",
    "VCPU_change_mc",
    "VCPU_change_pct",
    "VCPURequest_change_mc",
    "VCPURequest_change_pct",
    "VMem_change_GiB",
    "VMem_change_pct",
    "VMemRequest_change_GiB",
    "VMemRequest_change_pct",
    "oldest_date",
    "newest_date",
    "time_span_days",
    "total_absolute_impact",
];

const BUCKET_HEADERS: [&str; 6] = ["from", "to", "VCPU", "VCPURequest", "VMem", "VMemRequest"];

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).map_err(|source| AnalyzerError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_error(path: &Path) -> impl FnOnce(csv::Error) -> AnalyzerError + '_ {
    move |source| AnalyzerError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Write a cleaned action export: the input schema verbatim, rows re-sorted
/// by execution time.
pub fn write_cleaned_csv(path: &Path, headers: &[String], actions: &[ActionRecord]) -> Result<()> {
    let mut sorted: Vec<&ActionRecord> = actions.iter().collect();
    sorted.sort_by_key(|action| action.execution_datetime);

    let mut writer = open_writer(path)?;
    writer.write_record(headers).map_err(write_error(path))?;
    for action in sorted {
        writer
            .write_record(&action.original_row)
            .map_err(write_error(path))?;
    }
    writer
        .flush()
        .map_err(|source| AnalyzerError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    tracing::info!(path = %path.display(), rows = actions.len(), "wrote cleaned data");
    Ok(())
}

/// Write the duplicates audit: the input schema plus a trailing
/// `duplicate_reason` column.
pub fn write_duplicates_csv(
    path: &Path,
    headers: &[String],
    removed: &[RemovedAction],
) -> Result<()> {
    let mut writer = open_writer(path)?;

    let mut extended: Vec<String> = headers.to_vec();
    extended.push("duplicate_reason".to_string());
    writer.write_record(&extended).map_err(write_error(path))?;

    for removal in removed {
        let mut row = removal.record.original_row.clone();
        row.push(removal.reason.clone());
        writer.write_record(&row).map_err(write_error(path))?;
    }
    writer
        .flush()
        .map_err(|source| AnalyzerError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    tracing::info!(path = %path.display(), rows = removed.len(), "wrote duplicates report");
    Ok(())
}

/// Write consolidated analysis results.
pub fn write_results_csv(path: &Path, results: &[ConsolidatedResult]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer
        .write_record(RESULT_HEADERS)
        .map_err(write_error(path))?;

    for result in results {
        let row = [
            result.cluster.clone(),
            result.namespace.clone(),
            result.workload_kind.to_string(),
            result.workload_name.clone(),
            result.container_spec.clone(),
            result.replicas.to_string(),
            result.change_for(&Commodity::VCpu).to_string(),
            result.change_pct_for(&Commodity::VCpu).to_string(),
            result.change_for(&Commodity::VCpuRequest).to_string(),
            result.change_pct_for(&Commodity::VCpuRequest).to_string(),
            (result.change_for(&Commodity::VMem) / KB_PER_GIB).to_string(),
            result.change_pct_for(&Commodity::VMem).to_string(),
            (result.change_for(&Commodity::VMemRequest) / KB_PER_GIB).to_string(),
            result.change_pct_for(&Commodity::VMemRequest).to_string(),
            result.oldest_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            result.newest_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            result.time_span_days.to_string(),
            result.total_absolute_impact.to_string(),
        ];
        writer.write_record(&row).map_err(write_error(path))?;
    }
    writer
        .flush()
        .map_err(|source| AnalyzerError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    tracing::info!(path = %path.display(), rows = results.len(), "exported analysis results");
    Ok(())
}

/// Write the time-bucket series: one row per generated bucket.
pub fn write_buckets_csv(path: &Path, buckets: &[TimeBucketResult]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer
        .write_record(BUCKET_HEADERS)
        .map_err(write_error(path))?;

    for bucket in buckets {
        let row = [
            bucket.from.format("%Y-%m-%d %H:%M").to_string(),
            bucket.to.format("%Y-%m-%d %H:%M").to_string(),
            format!("{:.0}", bucket.total_for(&Commodity::VCpu)),
            format!("{:.0}", bucket.total_for(&Commodity::VCpuRequest)),
            format!("{:.2}", bucket.total_for(&Commodity::VMem) / KB_PER_GIB),
            format!(
                "{:.2}",
                bucket.total_for(&Commodity::VMemRequest) / KB_PER_GIB
            ),
        ];
        writer.write_record(&row).map_err(write_error(path))?;
    }
    writer
        .flush()
        .map_err(|source| AnalyzerError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    tracing::info!(path = %path.display(), rows = buckets.len(), "exported time buckets");
    Ok(())
}
