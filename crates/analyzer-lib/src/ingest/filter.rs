//! Load-time filtering surface: clusters, namespaces, time window

use crate::models::ActionRecord;
use chrono::NaiveDateTime;

/// Cluster ids in the export carry this prefix; filters and display accept
/// the short form without it.
pub const CLUSTER_PREFIX: &str = "Kubernetes-";

/// Filters applied while loading an export. Empty filter lists include
/// everything; the time window is inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct LoadFilter {
    pub clusters: Vec<String>,
    pub namespaces: Vec<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl LoadFilter {
    pub fn matches(&self, record: &ActionRecord) -> bool {
        self.matches_cluster(&record.cluster)
            && self.matches_namespace(&record.namespace)
            && self.matches_window(record.execution_datetime)
    }

    /// Exact match on the full cluster name or its short form.
    fn matches_cluster(&self, cluster: &str) -> bool {
        if self.clusters.is_empty() {
            return true;
        }
        let short = short_cluster_name(cluster);
        self.clusters
            .iter()
            .any(|filter| filter == cluster || filter == short)
    }

    /// Exact match, or prefix match for patterns with a trailing `*`.
    fn matches_namespace(&self, namespace: &str) -> bool {
        if self.namespaces.is_empty() {
            return true;
        }
        self.namespaces.iter().any(|pattern| {
            match pattern.strip_suffix('*') {
                Some(prefix) => namespace.starts_with(prefix),
                None => namespace == pattern,
            }
        })
    }

    fn matches_window(&self, when: NaiveDateTime) -> bool {
        if let Some(from) = self.from {
            if when < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if when > to {
                return false;
            }
        }
        true
    }
}

/// Strip the `Kubernetes-` prefix for display and short-name matching.
pub fn short_cluster_name(cluster: &str) -> &str {
    cluster.strip_prefix(CLUSTER_PREFIX).unwrap_or(cluster)
}
