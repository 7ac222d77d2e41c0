//! Action ingest from the 21-column CSV export
//!
//! This module turns raw export rows into typed [`ActionRecord`]s, applying
//! the validity invariant and the load-time filtering surface (clusters,
//! namespaces, inclusive time window). Malformed rows are skipped with a
//! warning; only missing or unreadable files are fatal.

mod filter;
mod row;

pub use filter::{short_cluster_name, LoadFilter, CLUSTER_PREFIX};
pub use row::{parse_filter_timestamp, parse_timestamp};

use crate::error::{AnalyzerError, Result};
use crate::models::ActionRecord;
use row::RowSkip;
use std::path::Path;

/// Number of columns the export schema carries.
pub const EXPECTED_COLUMNS: usize = 21;

/// Counters describing one load pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
    /// Data rows read (header excluded).
    pub rows_read: usize,
    /// Rows skipped for having fewer than the expected columns.
    pub rows_short: usize,
    /// Rows dropped by the validity invariant.
    pub rows_invalid: usize,
    /// Valid rows excluded by the cluster/namespace/time filters.
    pub rows_filtered: usize,
}

/// A parsed action set together with the input header row and load counters.
#[derive(Debug, Clone)]
pub struct LoadedActions {
    pub actions: Vec<ActionRecord>,
    /// Original header row, preserved verbatim for re-export.
    pub headers: Vec<String>,
    pub stats: LoadStats,
}

/// Load and parse an action export.
///
/// `require_replicas` selects the validity level: the change-computation
/// path needs a replica count on every record, the dedup path does not.
pub fn load_actions(
    path: &Path,
    filter: &LoadFilter,
    require_replicas: bool,
) -> Result<LoadedActions> {
    if !path.exists() {
        return Err(AnalyzerError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(path = %path.display(), "loading action data");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| AnalyzerError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(header) => header
            .map_err(|source| AnalyzerError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    let mut actions = Vec::new();
    let mut stats = LoadStats::default();

    // Header is line 1; data rows start at line 2.
    for (idx, record) in records.enumerate() {
        let row_num = idx + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(row = row_num, error = %err, "error reading row, skipping");
                stats.rows_invalid += 1;
                continue;
            }
        };
        stats.rows_read += 1;

        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        let action = match row::parse_row(&fields, require_replicas) {
            Ok(action) => action,
            Err(RowSkip::ShortRow { columns }) => {
                tracing::warn!(row = row_num, columns, "row has insufficient columns, skipping");
                stats.rows_short += 1;
                continue;
            }
            Err(skip) => {
                tracing::debug!(row = row_num, reason = %skip, "row failed validity check");
                stats.rows_invalid += 1;
                continue;
            }
        };

        if !filter.matches(&action) {
            stats.rows_filtered += 1;
            continue;
        }

        actions.push(action);
    }

    tracing::info!(
        loaded = actions.len(),
        rows_read = stats.rows_read,
        short = stats.rows_short,
        invalid = stats.rows_invalid,
        filtered = stats.rows_filtered,
        "loaded valid action records"
    );

    Ok(LoadedActions {
        actions,
        headers,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "date_created,name,cluster,replicas,namespace,container_spec,commodity,resize_direction,current_value,new_value,change,units,action_description,action_category,risk_description,action_mode,user_account,execution_datetime,execution_status,execution_error,tags";

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn row(workload: &str, status: &str, when: &str) -> String {
        format!(
            "01 Sep 2025 10:00,{workload},Kubernetes-prod,3,shop,api,VCPU,UP,400,800,+400,mc,\
             Resize Deployment {workload},Efficiency,risk,MANUAL,admin,{when},{status},,"
        )
    }

    #[test]
    fn test_load_valid_rows() {
        let file = write_csv(&[
            &row("api", "SUCCEEDED", "16 Sep 2025 09:40"),
            &row("web", "SUCCEEDED", "2025-09-17 10:00:00"),
        ]);
        let loaded = load_actions(file.path(), &LoadFilter::default(), true).unwrap();
        assert_eq!(loaded.actions.len(), 2);
        assert_eq!(loaded.headers.len(), EXPECTED_COLUMNS);
        assert_eq!(loaded.actions[0].workload_name, "api");
        assert_eq!(loaded.actions[0].current_value, 400.0);
        assert_eq!(loaded.actions[0].replicas, Some(3));
    }

    #[test]
    fn test_non_succeeded_rows_dropped() {
        let file = write_csv(&[
            &row("api", "SUCCEEDED", "16 Sep 2025 09:40"),
            &row("web", "FAILED", "16 Sep 2025 10:00"),
            &row("job", "IN_PROGRESS", "16 Sep 2025 11:00"),
        ]);
        let loaded = load_actions(file.path(), &LoadFilter::default(), true).unwrap();
        assert_eq!(loaded.actions.len(), 1);
        assert_eq!(loaded.stats.rows_invalid, 2);
    }

    #[test]
    fn test_short_rows_skipped_not_fatal() {
        let file = write_csv(&[
            "just,a,few,columns",
            &row("api", "SUCCEEDED", "16 Sep 2025 09:40"),
        ]);
        let loaded = load_actions(file.path(), &LoadFilter::default(), true).unwrap();
        assert_eq!(loaded.actions.len(), 1);
        assert_eq!(loaded.stats.rows_short, 1);
    }

    #[test]
    fn test_unparsable_timestamp_invalidates_record() {
        let file = write_csv(&[&row("api", "SUCCEEDED", "not a date")]);
        let loaded = load_actions(file.path(), &LoadFilter::default(), true).unwrap();
        assert!(loaded.actions.is_empty());
        assert_eq!(loaded.stats.rows_invalid, 1);
    }

    #[test]
    fn test_replicas_only_required_on_analysis_path() {
        let line = "01 Sep 2025 10:00,api,Kubernetes-prod,,shop,api,VCPU,UP,400,800,+400,mc,\
                    Resize Deployment api,Efficiency,risk,MANUAL,admin,16 Sep 2025 09:40,SUCCEEDED,,";
        let file = write_csv(&[line]);

        let analysis = load_actions(file.path(), &LoadFilter::default(), true).unwrap();
        assert!(analysis.actions.is_empty());

        let dedup = load_actions(file.path(), &LoadFilter::default(), false).unwrap();
        assert_eq!(dedup.actions.len(), 1);
        assert_eq!(dedup.actions[0].replicas, None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_actions(
            Path::new("/nonexistent/actions.csv"),
            &LoadFilter::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzerError::FileNotFound { .. }));
    }

    #[test]
    fn test_original_row_retained_verbatim() {
        let line = row("api", "SUCCEEDED", "16 Sep 2025 09:40");
        let file = write_csv(&[&line]);
        let loaded = load_actions(file.path(), &LoadFilter::default(), true).unwrap();
        let expected: Vec<String> = line.split(',').map(str::to_string).collect();
        assert_eq!(loaded.actions[0].original_row, expected);
    }
}
