//! Row-level parsing and normalization

use super::EXPECTED_COLUMNS;
use crate::error::{AnalyzerError, Result};
use crate::models::{ActionRecord, Commodity};
use chrono::NaiveDateTime;
use std::fmt;

/// Execution status that makes a record analytically valid.
const STATUS_SUCCEEDED: &str = "SUCCEEDED";

/// Timestamp formats accepted by the export, tried in order.
const TIMESTAMP_FORMATS: [&str; 2] = ["%d %b %Y %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Why a row was not turned into an [`ActionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowSkip {
    ShortRow { columns: usize },
    NotSucceeded,
    MissingValue,
    MissingTimestamp,
    MissingReplicas,
}

impl fmt::Display for RowSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSkip::ShortRow { columns } => write!(f, "only {} columns", columns),
            RowSkip::NotSucceeded => f.write_str("execution status is not SUCCEEDED"),
            RowSkip::MissingValue => f.write_str("current or new value missing"),
            RowSkip::MissingTimestamp => f.write_str("execution timestamp missing or unparsable"),
            RowSkip::MissingReplicas => f.write_str("replica count missing or unparsable"),
        }
    }
}

/// Parse an execution timestamp, trying each accepted format in order.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parse a user-provided filter date. Unlike row timestamps, a bad value
/// here is an argument error and fatal before any data is read.
pub fn parse_filter_timestamp(value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).ok_or_else(|| AnalyzerError::InvalidDate {
        input: value.to_string(),
    })
}

fn parse_float(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}

fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}

/// Turn one raw row into a validated [`ActionRecord`].
///
/// Never mutates invalid data into shape: any violation of the validity
/// invariant rejects the whole row.
pub(crate) fn parse_row(
    fields: &[String],
    require_replicas: bool,
) -> std::result::Result<ActionRecord, RowSkip> {
    if fields.len() < EXPECTED_COLUMNS {
        return Err(RowSkip::ShortRow {
            columns: fields.len(),
        });
    }

    if fields[18] != STATUS_SUCCEEDED {
        return Err(RowSkip::NotSucceeded);
    }

    let current_value = parse_float(&fields[8]).ok_or(RowSkip::MissingValue)?;
    let new_value = parse_float(&fields[9]).ok_or(RowSkip::MissingValue)?;
    let execution_datetime = parse_timestamp(&fields[17]).ok_or(RowSkip::MissingTimestamp)?;

    let replicas = parse_int(&fields[3]);
    if require_replicas && replicas.is_none() {
        return Err(RowSkip::MissingReplicas);
    }

    Ok(ActionRecord {
        date_created: fields[0].clone(),
        workload_name: fields[1].clone(),
        cluster: fields[2].clone(),
        replicas,
        namespace: fields[4].clone(),
        container_spec: fields[5].clone(),
        commodity: Commodity::parse(&fields[6]),
        resize_direction: fields[7].clone(),
        current_value,
        new_value,
        change: fields[10].clone(),
        units: fields[11].clone(),
        action_description: fields[12].clone(),
        action_category: fields[13].clone(),
        risk_description: fields[14].clone(),
        action_mode: fields[15].clone(),
        user_account: fields[16].clone(),
        execution_datetime,
        execution_status: fields[18].clone(),
        execution_error: fields[19].clone(),
        tags: fields[20].clone(),
        original_row: fields.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_formats() {
        let primary = parse_timestamp("16 Sep 2025 09:40").unwrap();
        assert_eq!(primary.format("%Y-%m-%d %H:%M").to_string(), "2025-09-16 09:40");

        let fallback = parse_timestamp("2025-09-16 09:40:00").unwrap();
        assert_eq!(primary, fallback.with_second(0).unwrap());

        assert!(parse_timestamp("  16 Sep 2025 09:40  ").is_some());
        assert!(parse_timestamp("16/09/2025").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_parse_filter_timestamp_error() {
        let err = parse_filter_timestamp("next tuesday").unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn test_numeric_field_parsing() {
        assert_eq!(parse_float("400"), Some(400.0));
        assert_eq!(parse_float(" 12.5 "), Some(12.5));
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_int("3"), Some(3));
        assert_eq!(parse_int("3.5"), None);
        assert_eq!(parse_int(""), None);
    }
}
