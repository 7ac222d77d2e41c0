//! Removal of repeated/ineffective retry actions
//!
//! Actions are grouped by their retry lineage (cluster, namespace, workload,
//! container spec, commodity) and scanned chronologically. Two policies:
//!
//! - **Standard**: drop an action whose current value equals the previous
//!   kept action's current value (new value is not compared); a group whose
//!   members never diverge from the first current value is retry noise and
//!   is dropped whole.
//! - **Conservative**: any consecutive pair with equal current AND new
//!   value invalidates the entire group as evidence of an ineffective
//!   action, so all of its members are dropped.

use crate::grouping::group_sorted;
use crate::models::{ActionRecord, DedupKey};

/// Deduplication stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Keep the first occurrence of each duplicate run.
    #[default]
    Standard,
    /// Discard entire groups that contain any retry signature.
    Conservative,
}

/// One removed action together with the audit reason.
#[derive(Debug, Clone)]
pub struct RemovedAction {
    pub record: ActionRecord,
    pub reason: String,
}

/// Result of one dedup pass.
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Surviving actions, re-sorted by execution time across all groups.
    pub kept: Vec<ActionRecord>,
    /// Removed actions with audit reasons, in group order.
    pub removed: Vec<RemovedAction>,
    /// Number of retry-lineage groups seen.
    pub group_count: usize,
    /// Groups whose every member was removed.
    pub groups_fully_removed: usize,
}

impl DedupOutcome {
    /// Share of the input removed as duplicates. Defined as 0 for an empty
    /// input set.
    pub fn duplicate_percentage(&self) -> f64 {
        let total = self.kept.len() + self.removed.len();
        if total == 0 {
            0.0
        } else {
            self.removed.len() as f64 / total as f64 * 100.0
        }
    }
}

/// Run one dedup pass over a set of valid actions.
pub fn dedup_actions(actions: Vec<ActionRecord>, policy: DedupPolicy) -> DedupOutcome {
    let groups = group_sorted(actions, DedupKey::of);

    let mut outcome = DedupOutcome {
        group_count: groups.len(),
        ..Default::default()
    };

    tracing::info!(
        groups = outcome.group_count,
        policy = ?policy,
        "identifying and removing duplicate actions"
    );

    for (key, group) in groups {
        match policy {
            DedupPolicy::Conservative => dedup_conservative(&key, group, &mut outcome),
            DedupPolicy::Standard => dedup_standard(&key, group, &mut outcome),
        }
    }

    outcome
        .kept
        .sort_by_key(|record| record.execution_datetime);

    tracing::info!(
        kept = outcome.kept.len(),
        removed = outcome.removed.len(),
        duplicate_pct = format!("{:.1}", outcome.duplicate_percentage()),
        "dedup pass complete"
    );

    outcome
}

fn conservative_reason(record: &ActionRecord) -> String {
    format!(
        "Conservative mode removal: group had duplicates ({}→{})",
        record.current_value, record.new_value
    )
}

fn standard_reason(record: &ActionRecord) -> String {
    format!(
        "Consecutive duplicate: {}→{}",
        record.current_value, record.new_value
    )
}

fn dedup_conservative(key: &DedupKey, group: Vec<ActionRecord>, outcome: &mut DedupOutcome) {
    let has_retry_pair = group.windows(2).any(|pair| {
        pair[0].current_value == pair[1].current_value
            && pair[0].new_value == pair[1].new_value
    });

    if has_retry_pair {
        tracing::info!(
            group = %key,
            removed = group.len(),
            "conservative mode: group has retry pair, removing all actions"
        );
        outcome.groups_fully_removed += 1;
        for record in group {
            outcome.removed.push(RemovedAction {
                reason: conservative_reason(&record),
                record,
            });
        }
    } else {
        outcome.kept.extend(group);
    }
}

fn dedup_standard(key: &DedupKey, group: Vec<ActionRecord>, outcome: &mut DedupOutcome) {
    // A multi-action group whose current value never diverges from the
    // first action's is pure retry noise: remove it whole, first included.
    let duplicates_only = group.len() > 1
        && group
            .iter()
            .all(|record| record.current_value == group[0].current_value);
    if duplicates_only {
        tracing::info!(
            group = %key,
            removed = group.len(),
            "group contains only duplicates, removing all actions"
        );
        outcome.groups_fully_removed += 1;
        for record in group {
            outcome.removed.push(RemovedAction {
                reason: standard_reason(&record),
                record,
            });
        }
        return;
    }

    let mut kept: Vec<ActionRecord> = Vec::new();
    let mut removed: Vec<ActionRecord> = Vec::new();

    for record in &group {
        let is_duplicate = kept
            .last()
            .map(|prev| prev.current_value == record.current_value)
            .unwrap_or(false);
        if is_duplicate {
            removed.push(record.clone());
        } else {
            kept.push(record.clone());
        }
    }

    // Post-pass corrections, separate from the main loop above. These are
    // tagged edge cases, not general rules:
    // 1. A group must never come out empty.
    // 2. A multi-action group that collapsed to a single survivor keeps the
    //    chronologically last original action as well, preserving an
    //    endpoint for later oldest-vs-newest comparison.
    if kept.is_empty() {
        if let Some(first) = group.first() {
            tracing::warn!(group = %key, "group had no unique actions, keeping first action");
            kept.push(first.clone());
            if let Some(pos) = removed.iter().position(|record| record == first) {
                removed.remove(pos);
            }
        }
    } else if kept.len() == 1 && group.len() > 1 {
        if let Some(last) = group.last() {
            if !kept.contains(last) {
                kept.push(last.clone());
                if let Some(pos) = removed.iter().position(|record| record == last) {
                    removed.remove(pos);
                }
            }
        }
    }

    if !removed.is_empty() {
        tracing::info!(
            group = %key,
            removed = removed.len(),
            kept = kept.len(),
            "removed consecutive duplicates"
        );
    }

    outcome.kept.extend(kept);
    for record in removed {
        outcome.removed.push(RemovedAction {
            reason: standard_reason(&record),
            record,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Commodity;
    use crate::testutil::action;

    fn vcpu(current: f64, new: f64, when: &str) -> ActionRecord {
        action("api", Commodity::VCpu, current, new, 3, when)
    }

    #[test]
    fn test_standard_keeps_first_of_duplicate_run() {
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            vcpu(400.0, 900.0, "2025-09-02 10:00:00"),
            vcpu(800.0, 1200.0, "2025-09-03 10:00:00"),
        ];
        let outcome = dedup_actions(actions, DedupPolicy::Standard);
        // Second action repeats the first's current value; the differing
        // new value does not matter.
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(outcome.removed[0].record.new_value, 900.0);
        assert!(outcome.removed[0].reason.contains("Consecutive duplicate"));
    }

    #[test]
    fn test_standard_removes_duplicate_only_group_entirely() {
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            vcpu(400.0, 800.0, "2025-09-02 10:00:00"),
            vcpu(400.0, 600.0, "2025-09-03 10:00:00"),
        ];
        let outcome = dedup_actions(actions, DedupPolicy::Standard);
        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.removed.len(), 3);
        assert_eq!(outcome.groups_fully_removed, 1);
    }

    #[test]
    fn test_standard_singleton_group_survives() {
        let actions = vec![vcpu(400.0, 800.0, "2025-09-01 10:00:00")];
        let outcome = dedup_actions(actions, DedupPolicy::Standard);
        assert_eq!(outcome.kept.len(), 1);
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn test_standard_idempotent() {
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            vcpu(400.0, 800.0, "2025-09-02 10:00:00"),
            vcpu(800.0, 1200.0, "2025-09-03 10:00:00"),
            vcpu(1200.0, 1000.0, "2025-09-04 10:00:00"),
        ];
        let first = dedup_actions(actions, DedupPolicy::Standard);
        let second = dedup_actions(first.kept.clone(), DedupPolicy::Standard);
        assert!(second.removed.is_empty());
        assert_eq!(second.kept, first.kept);
    }

    #[test]
    fn test_conservative_discards_whole_group_on_retry_pair() {
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            vcpu(400.0, 800.0, "2025-09-02 10:00:00"),
            vcpu(800.0, 1200.0, "2025-09-03 10:00:00"),
        ];
        let outcome = dedup_actions(actions, DedupPolicy::Conservative);
        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.removed.len(), 3);
        assert_eq!(outcome.groups_fully_removed, 1);
        assert!(outcome.removed[0].reason.contains("Conservative mode removal"));
    }

    #[test]
    fn test_conservative_requires_equal_new_value() {
        // Same current value, different new values: not a retry signature.
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            vcpu(400.0, 900.0, "2025-09-02 10:00:00"),
        ];
        let outcome = dedup_actions(actions, DedupPolicy::Conservative);
        assert_eq!(outcome.kept.len(), 2);
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn test_conservative_superset_of_standard_on_duplicate_pairs() {
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            vcpu(400.0, 800.0, "2025-09-02 10:00:00"),
            vcpu(800.0, 1200.0, "2025-09-03 10:00:00"),
        ];
        let standard = dedup_actions(actions.clone(), DedupPolicy::Standard);
        let conservative = dedup_actions(actions, DedupPolicy::Conservative);
        for removed in &standard.removed {
            assert!(conservative
                .removed
                .iter()
                .any(|r| r.record == removed.record));
        }
        assert!(conservative.removed.len() >= standard.removed.len());
    }

    #[test]
    fn test_groups_deduplicated_independently() {
        let mut other = action("web", Commodity::VCpu, 400.0, 800.0, 2, "2025-09-01 11:00:00");
        other.container_spec = "web".to_string();
        let actions = vec![
            vcpu(400.0, 800.0, "2025-09-01 10:00:00"),
            other,
            vcpu(800.0, 1200.0, "2025-09-02 10:00:00"),
        ];
        // web's 400 does not shadow api's 800: different lineage.
        let outcome = dedup_actions(actions, DedupPolicy::Standard);
        assert_eq!(outcome.kept.len(), 3);
    }

    #[test]
    fn test_kept_output_sorted_by_execution_time() {
        let mut late = action("web", Commodity::VCpu, 100.0, 200.0, 2, "2025-09-05 10:00:00");
        late.container_spec = "web".to_string();
        let actions = vec![late, vcpu(400.0, 800.0, "2025-09-01 10:00:00")];
        let outcome = dedup_actions(actions, DedupPolicy::Standard);
        assert_eq!(outcome.kept[0].workload_name, "api");
        assert_eq!(outcome.kept[1].workload_name, "web");
    }

    #[test]
    fn test_empty_input_duplicate_percentage_defined() {
        let outcome = dedup_actions(Vec::new(), DedupPolicy::Standard);
        assert_eq!(outcome.duplicate_percentage(), 0.0);
        assert!(outcome.kept.is_empty());
    }
}
