//! Grouping engine: partition a record stream by key and sort chronologically

use crate::models::ActionRecord;
use std::collections::BTreeMap;

/// Partition records by `key_fn` and sort each group by execution time.
///
/// Pure and deterministic: the sort is stable, so records sharing a
/// timestamp keep their relative input order, and `BTreeMap` keys make
/// group iteration order independent of input order. Every input record
/// lands in exactly one group.
pub fn group_sorted<K, F>(
    records: impl IntoIterator<Item = ActionRecord>,
    key_fn: F,
) -> BTreeMap<K, Vec<ActionRecord>>
where
    K: Ord,
    F: Fn(&ActionRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<ActionRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(key_fn(&record)).or_default().push(record);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|record| record.execution_datetime);
    }
    groups
}
