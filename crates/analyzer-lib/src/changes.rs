//! Change computation engine
//!
//! Consolidates per-commodity action groups into one result per
//! workload/container: oldest-vs-newest value change per commodity,
//! normalized to the workload's current replica count.

use crate::models::{
    ActionRecord, Commodity, CommodityChange, ConsolidatedResult, GroupKey, ReplicaSpan,
    WorkloadKey,
};
use std::collections::BTreeMap;

/// Consolidate analysis groups into one result per workload/container.
///
/// Records must come from the analysis ingest path, which guarantees a
/// replica count on every record.
///
/// The workload-level oldest and newest actions are found across ALL
/// commodities ("first ever" and "last ever" for the workload, not per
/// commodity); the newest action's replica count scales both endpoints of
/// every commodity's impact so the comparison reflects today's scale.
pub fn analyze_changes(groups: &BTreeMap<GroupKey, Vec<ActionRecord>>) -> Vec<ConsolidatedResult> {
    let mut workloads: BTreeMap<WorkloadKey, BTreeMap<Commodity, &[ActionRecord]>> =
        BTreeMap::new();
    for (key, actions) in groups {
        if actions.is_empty() {
            continue;
        }
        workloads
            .entry(key.workload_key())
            .or_default()
            .insert(key.commodity.clone(), actions.as_slice());
    }

    tracing::info!(
        groups = groups.len(),
        workloads = workloads.len(),
        "analyzing commodity changes"
    );

    let mut results = Vec::with_capacity(workloads.len());

    for (workload_key, commodity_actions) in workloads {
        // First minimum and last maximum, the endpoints a stable
        // chronological sort would yield.
        let mut workload_oldest: Option<&ActionRecord> = None;
        let mut workload_newest: Option<&ActionRecord> = None;
        for action in commodity_actions.values().flat_map(|a| a.iter()) {
            if workload_oldest
                .map(|oldest| action.execution_datetime < oldest.execution_datetime)
                .unwrap_or(true)
            {
                workload_oldest = Some(action);
            }
            if workload_newest
                .map(|newest| action.execution_datetime >= newest.execution_datetime)
                .unwrap_or(true)
            {
                workload_newest = Some(action);
            }
        }
        let (workload_oldest, workload_newest) = match (workload_oldest, workload_newest) {
            (Some(oldest), Some(newest)) => (oldest, newest),
            // Empty groups were skipped above; a WorkloadKey always has
            // at least one action.
            _ => continue,
        };

        let replicas =
            ReplicaSpan::from_endpoints(workload_oldest.replicas, workload_newest.replicas);
        let scale = workload_newest.replicas.unwrap_or(0) as f64;

        let mut changes = BTreeMap::new();
        let mut total_absolute_impact = 0.0;
        let mut earliest = workload_oldest.execution_datetime;
        let mut latest = workload_newest.execution_datetime;

        for (commodity, actions) in &commodity_actions {
            // Groups arrive chronologically sorted; a single-action group
            // serves as both its own oldest and newest observation.
            let oldest = match actions.first() {
                Some(action) => action,
                None => continue,
            };
            let newest = match actions.last() {
                Some(action) => action,
                None => continue,
            };

            earliest = earliest.min(oldest.execution_datetime);
            latest = latest.max(newest.execution_datetime);

            let oldest_total = oldest.current_value * scale;
            let newest_total = newest.new_value * scale;
            let change = newest_total - oldest_total;
            let change_pct = if oldest_total != 0.0 {
                change / oldest_total * 100.0
            } else {
                0.0
            };

            total_absolute_impact += change.abs();
            changes.insert(
                commodity.clone(),
                CommodityChange {
                    change,
                    change_pct,
                    units: oldest.units.clone(),
                },
            );
        }

        results.push(ConsolidatedResult {
            cluster: workload_key.cluster,
            namespace: workload_key.namespace,
            workload_kind: workload_key.workload_kind,
            workload_name: workload_key.workload_name,
            container_spec: workload_key.container_spec,
            replicas,
            changes,
            oldest_date: earliest,
            newest_date: latest,
            time_span_days: (latest - earliest).num_days(),
            total_absolute_impact,
        });
    }

    results
}

/// Rank results by absolute VCPURequest change, descending. This is the
/// report and export ordering.
pub fn sort_by_vcpu_request_change(results: &mut [ConsolidatedResult]) {
    results.sort_by(|a, b| {
        let a_change = a.change_for(&Commodity::VCpuRequest).abs();
        let b_change = b.change_for(&Commodity::VCpuRequest).abs();
        b_change
            .partial_cmp(&a_change)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
