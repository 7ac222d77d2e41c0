//! Time-bucket trend analysis
//!
//! Tiles the data's full time range into fixed-duration windows and re-runs
//! the consolidation pipeline independently inside each window, producing a
//! per-commodity impact time series.

use crate::changes::analyze_changes;
use crate::dedup::{dedup_actions, DedupPolicy};
use crate::error::{AnalyzerError, Result};
use crate::grouping::group_sorted;
use crate::models::{ActionRecord, Commodity, GroupKey, TimeBucketResult};
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;

/// Bucket analysis parameters.
#[derive(Debug, Clone)]
pub struct BucketConfig {
    pub duration: Duration,
    /// Optional per-window dedup pass before grouping. `None` analyzes the
    /// windows as-is.
    pub dedup: Option<DedupPolicy>,
}

impl BucketConfig {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            dedup: None,
        }
    }
}

/// Parse a flexible duration expression (`7d`, `24h`, `30m`, `2h 30m`).
///
/// Falls back to a single fractional term (`1.5h`) which humantime's
/// grammar rejects.
pub fn parse_bucket_duration(input: &str) -> Result<Duration> {
    let invalid = || AnalyzerError::InvalidDuration {
        input: input.to_string(),
    };

    let duration = match humantime::parse_duration(input.trim()) {
        Ok(duration) => duration,
        Err(_) => parse_fractional_duration(input.trim()).ok_or_else(invalid)?,
    };

    let duration = Duration::from_std(duration).map_err(|_| invalid())?;
    if duration <= Duration::zero() {
        return Err(invalid());
    }
    Ok(duration)
}

/// Parse `<float><unit>` with unit one of s/m/h/d, e.g. `1.5h` or `0.5 d`.
fn parse_fractional_duration(input: &str) -> Option<std::time::Duration> {
    let split = input
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .filter(|&idx| idx > 0)?;
    let (number, unit) = input.split_at(split);
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let unit_secs = match unit.trim() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        "d" | "day" | "days" => 86400.0,
        _ => return None,
    };
    Some(std::time::Duration::from_secs_f64(value * unit_secs))
}

/// Tile `[start, end]` into consecutive windows of `duration`, clipping the
/// final window to end exactly at `end`.
pub fn generate_buckets(
    start: NaiveDateTime,
    end: NaiveDateTime,
    duration: Duration,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut buckets = Vec::new();
    let mut current_start = start;
    while current_start < end {
        let current_end = (current_start + duration).min(end);
        buckets.push((current_start, current_end));
        current_start = current_end;
    }
    buckets
}

/// Run the bucketed trend analysis over a valid action set.
///
/// Each window is analyzed independently over the actions whose execution
/// time falls in `[start, end]` — inclusive on BOTH ends, so an action
/// exactly on a shared boundary counts in both adjacent buckets. That
/// matches the historical behavior and is deliberate.
///
/// Every generated bucket yields exactly one result; windows without
/// qualifying actions produce zero-valued rows.
pub fn analyze_buckets(
    actions: &[ActionRecord],
    config: &BucketConfig,
) -> Result<Vec<TimeBucketResult>> {
    let min_time = actions
        .iter()
        .map(|action| action.execution_datetime)
        .min()
        .ok_or(AnalyzerError::NoData)?;
    let max_time = actions
        .iter()
        .map(|action| action.execution_datetime)
        .max()
        .ok_or(AnalyzerError::NoData)?;

    tracing::info!(
        from = %min_time.format("%Y-%m-%d %H:%M"),
        to = %max_time.format("%Y-%m-%d %H:%M"),
        "analyzing time range"
    );

    let buckets = generate_buckets(min_time, max_time, config.duration);
    tracing::info!(buckets = buckets.len(), "generated time buckets");

    let mut results = Vec::with_capacity(buckets.len());
    for (index, (start, end)) in buckets.iter().enumerate() {
        tracing::debug!(
            bucket = index + 1,
            total = buckets.len(),
            from = %start.format("%Y-%m-%d"),
            to = %end.format("%Y-%m-%d"),
            "analyzing bucket"
        );
        results.push(analyze_window(actions, *start, *end, config.dedup));
    }

    Ok(results)
}

fn analyze_window(
    actions: &[ActionRecord],
    start: NaiveDateTime,
    end: NaiveDateTime,
    dedup: Option<DedupPolicy>,
) -> TimeBucketResult {
    let mut window: Vec<ActionRecord> = actions
        .iter()
        .filter(|action| action.execution_datetime >= start && action.execution_datetime <= end)
        .cloned()
        .collect();

    let mut totals: BTreeMap<Commodity, f64> = Commodity::REPORTED
        .iter()
        .map(|commodity| (commodity.clone(), 0.0))
        .collect();

    if window.is_empty() {
        return TimeBucketResult {
            from: start,
            to: end,
            totals,
        };
    }

    if let Some(policy) = dedup {
        window = dedup_actions(window, policy).kept;
    }

    let groups = group_sorted(window, GroupKey::of);
    for result in analyze_changes(&groups) {
        for commodity in &Commodity::REPORTED {
            *totals.entry(commodity.clone()).or_insert(0.0) += result.change_for(commodity);
        }
    }

    TimeBucketResult {
        from: start,
        to: end,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{action, ts};

    #[test]
    fn test_parse_duration_expressions() {
        assert_eq!(parse_bucket_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_bucket_duration("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_bucket_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(
            parse_bucket_duration("2h 30m").unwrap(),
            Duration::minutes(150)
        );
        assert_eq!(
            parse_bucket_duration("2d 4h").unwrap(),
            Duration::hours(52)
        );
        assert_eq!(
            parse_bucket_duration("1.5h").unwrap(),
            Duration::minutes(90)
        );
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_bucket_duration("fortnight-ish").is_err());
        assert!(parse_bucket_duration("").is_err());
        assert!(parse_bucket_duration("0s").is_err());
        let err = parse_bucket_duration("7x").unwrap_err();
        assert!(err.to_string().contains("7x"));
    }

    #[test]
    fn test_bucket_coverage() {
        // 10 days with 3-day buckets: 4 buckets, last one spanning 1 day,
        // contiguous and non-overlapping except at shared boundaries.
        let start = ts("2025-09-01 00:00:00");
        let end = ts("2025-09-11 00:00:00");
        let buckets = generate_buckets(start, end, Duration::days(3));
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0], (start, ts("2025-09-04 00:00:00")));
        assert_eq!(buckets[3], (ts("2025-09-10 00:00:00"), end));
        assert_eq!(buckets[3].1 - buckets[3].0, Duration::days(1));
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_exact_multiple_has_no_short_bucket() {
        let buckets = generate_buckets(
            ts("2025-09-01 00:00:00"),
            ts("2025-09-15 00:00:00"),
            Duration::days(7),
        );
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].1 - buckets[1].0, Duration::days(7));
    }

    #[test]
    fn test_empty_window_produces_zero_row() {
        // Actions on day 1 and day 7 with 2-day buckets leave middle
        // windows empty; they must still appear as zero rows.
        let actions = vec![
            action("api", Commodity::VCpu, 400.0, 800.0, 2, "2025-09-01 00:00:00"),
            action("api", Commodity::VCpu, 800.0, 1200.0, 2, "2025-09-07 00:00:00"),
        ];
        let config = BucketConfig::new(Duration::days(2));
        let results = analyze_buckets(&actions, &config).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].total_for(&Commodity::VCpu), 0.0);
        for result in &results {
            assert_eq!(result.totals.len(), Commodity::REPORTED.len());
        }
    }

    #[test]
    fn test_windows_analyzed_independently() {
        let actions = vec![
            action("api", Commodity::VCpu, 400.0, 800.0, 2, "2025-09-01 00:00:00"),
            action("api", Commodity::VCpu, 800.0, 1200.0, 2, "2025-09-07 00:00:00"),
        ];
        let config = BucketConfig::new(Duration::days(2));
        let results = analyze_buckets(&actions, &config).unwrap();
        // Each window sees only its own action: (800-400)*2 then (1200-800)*2.
        assert_eq!(results[0].total_for(&Commodity::VCpu), 800.0);
        assert_eq!(results[2].total_for(&Commodity::VCpu), 800.0);
    }

    #[test]
    fn test_boundary_action_counts_in_both_buckets() {
        // Inclusive-inclusive window boundaries: an action exactly on a
        // shared boundary is double counted. Preserved behavior, not a bug.
        let actions = vec![
            action("api", Commodity::VCpu, 400.0, 800.0, 1, "2025-09-01 00:00:00"),
            action("api", Commodity::VCpu, 100.0, 150.0, 1, "2025-09-03 00:00:00"),
            action("api", Commodity::VCpu, 800.0, 1200.0, 1, "2025-09-05 00:00:00"),
        ];
        let config = BucketConfig::new(Duration::days(2));
        let results = analyze_buckets(&actions, &config).unwrap();
        assert_eq!(results.len(), 2);
        // The 09-03 action lands in both windows.
        assert_eq!(results[0].total_for(&Commodity::VCpu), 150.0 - 400.0);
        assert_eq!(results[1].total_for(&Commodity::VCpu), 1200.0 - 100.0);
    }

    #[test]
    fn test_empty_action_set_is_no_data() {
        let config = BucketConfig::new(Duration::days(7));
        let err = analyze_buckets(&[], &config).unwrap_err();
        assert!(matches!(err, AnalyzerError::NoData));
    }

    #[test]
    fn test_per_window_dedup_opt_in() {
        let actions = vec![
            action("api", Commodity::VCpu, 400.0, 800.0, 1, "2025-09-01 00:00:00"),
            action("api", Commodity::VCpu, 400.0, 800.0, 1, "2025-09-01 06:00:00"),
            action("api", Commodity::VCpu, 800.0, 1200.0, 1, "2025-09-01 12:00:00"),
        ];
        let mut config = BucketConfig::new(Duration::days(2));
        let plain = analyze_buckets(&actions, &config).unwrap();
        // Without dedup the retry is invisible to the oldest/newest pick.
        assert_eq!(plain[0].total_for(&Commodity::VCpu), 800.0);

        config.dedup = Some(DedupPolicy::Standard);
        let deduped = analyze_buckets(&actions, &config).unwrap();
        assert_eq!(deduped[0].total_for(&Commodity::VCpu), 800.0);

        // Conservative dedup discards the whole retry-tainted group.
        config.dedup = Some(DedupPolicy::Conservative);
        let conservative = analyze_buckets(&actions, &config).unwrap();
        assert_eq!(conservative[0].total_for(&Commodity::VCpu), 0.0);
    }
}
