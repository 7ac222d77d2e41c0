//! Recency ("conservative") filter over analysis groups
//!
//! Decides per workload whether it showed any activity in a trailing
//! window, and prunes every group of a workload that did not. Deliberately
//! coarser than the analysis grouping key: one active container/commodity
//! combination rescues all of its workload's groups.

use crate::models::{ActionRecord, GroupKey, WorkloadIdentity};
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;

/// Compute the activity cutoff: `reference` minus `lookback_days`.
///
/// The reference instant (the `--to` date, or the caller's "now") is passed
/// in explicitly; the library never reads the clock itself. A zero lookback
/// makes the cutoff the reference instant.
pub fn cutoff_from(reference: NaiveDateTime, lookback_days: u32) -> NaiveDateTime {
    reference - Duration::days(i64::from(lookback_days))
}

/// Drop every group belonging to a workload with no action at or after
/// `cutoff` in ANY of its (container, commodity) subgroups.
pub fn apply_recency_filter(
    groups: BTreeMap<GroupKey, Vec<ActionRecord>>,
    cutoff: NaiveDateTime,
) -> BTreeMap<GroupKey, Vec<ActionRecord>> {
    let mut workload_active: BTreeMap<WorkloadIdentity, bool> = BTreeMap::new();
    for (key, actions) in &groups {
        let has_recent = actions
            .iter()
            .any(|action| action.execution_datetime >= cutoff);
        let entry = workload_active.entry(key.workload_identity()).or_insert(false);
        *entry = *entry || has_recent;
    }

    let total_groups = groups.len();
    let total_workloads = workload_active.len();
    let active_workloads = workload_active.values().filter(|active| **active).count();

    let filtered: BTreeMap<GroupKey, Vec<ActionRecord>> = groups
        .into_iter()
        .filter(|(key, _)| {
            workload_active
                .get(&key.workload_identity())
                .copied()
                .unwrap_or(false)
        })
        .collect();

    tracing::info!(
        cutoff = %cutoff.format("%d %b %Y %H:%M"),
        groups_before = total_groups,
        groups_after = filtered.len(),
        workloads = total_workloads,
        active_workloads,
        "applied recency filter"
    );

    filtered
}
