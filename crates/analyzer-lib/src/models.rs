//! Core data models for the resize action analyzer

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One executed resize action, parsed from a 21-column export row.
///
/// Only records that passed the validity invariant exist as `ActionRecord`s:
/// execution status `SUCCEEDED`, with current value, new value, and execution
/// timestamp all present. The analysis ingest path additionally requires a
/// replica count; the dedup path does not, so `replicas` stays optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub date_created: String,
    pub workload_name: String,
    pub cluster: String,
    pub replicas: Option<i64>,
    pub namespace: String,
    pub container_spec: String,
    pub commodity: Commodity,
    pub resize_direction: String,
    pub current_value: f64,
    pub new_value: f64,
    pub change: String,
    pub units: String,
    pub action_description: String,
    pub action_category: String,
    pub risk_description: String,
    pub action_mode: String,
    pub user_account: String,
    pub execution_datetime: NaiveDateTime,
    pub execution_status: String,
    pub execution_error: String,
    pub tags: String,
    /// Original row retained verbatim for lossless re-export.
    pub original_row: Vec<String>,
}

impl ActionRecord {
    /// Workload kind inferred from the free-text action description.
    pub fn workload_kind(&self) -> WorkloadKind {
        WorkloadKind::infer(&self.action_description)
    }
}

/// A measured/allocatable resource dimension.
///
/// The four unit variants are the reported kinds; anything else the export
/// produces is carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Commodity {
    VCpu,
    VCpuRequest,
    VMem,
    VMemRequest,
    Other(String),
}

impl Commodity {
    /// The commodity kinds that appear as columns in reports and exports.
    pub const REPORTED: [Commodity; 4] = [
        Commodity::VCpu,
        Commodity::VCpuRequest,
        Commodity::VMem,
        Commodity::VMemRequest,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "VCPU" => Commodity::VCpu,
            "VCPURequest" => Commodity::VCpuRequest,
            "VMem" => Commodity::VMem,
            "VMemRequest" => Commodity::VMemRequest,
            other => Commodity::Other(other.to_string()),
        }
    }

    /// Memory commodities are exported in KB and rendered in GiB.
    pub fn is_memory(&self) -> bool {
        matches!(self, Commodity::VMem | Commodity::VMemRequest)
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commodity::VCpu => f.write_str("VCPU"),
            Commodity::VCpuRequest => f.write_str("VCPURequest"),
            Commodity::VMem => f.write_str("VMem"),
            Commodity::VMemRequest => f.write_str("VMemRequest"),
            Commodity::Other(name) => f.write_str(name),
        }
    }
}

impl std::str::FromStr for Commodity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Commodity::parse(s))
    }
}

impl Serialize for Commodity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Commodity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Commodity::parse(&s))
    }
}

/// The controller kind owning a workload's container specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    WorkloadController,
}

impl WorkloadKind {
    /// Infer the workload kind from free-text by keyword match.
    ///
    /// Precedence is fixed (Deployment > StatefulSet > DaemonSet >
    /// ReplicaSet > WorkloadController); changing it changes grouping.
    pub fn infer(description: &str) -> Self {
        let description = description.to_lowercase();
        if description.contains("deployment") {
            WorkloadKind::Deployment
        } else if description.contains("statefulset") {
            WorkloadKind::StatefulSet
        } else if description.contains("daemonset") {
            WorkloadKind::DaemonSet
        } else if description.contains("replicaset") {
            WorkloadKind::ReplicaSet
        } else {
            WorkloadKind::WorkloadController
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::ReplicaSet => "ReplicaSet",
            WorkloadKind::WorkloadController => "WorkloadController",
        };
        f.write_str(s)
    }
}

/// Finest-grained retry lineage: the deduplication grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DedupKey {
    pub cluster: String,
    pub namespace: String,
    pub workload_name: String,
    pub container_spec: String,
    pub commodity: Commodity,
}

impl DedupKey {
    pub fn of(record: &ActionRecord) -> Self {
        Self {
            cluster: record.cluster.clone(),
            namespace: record.namespace.clone(),
            workload_name: record.workload_name.clone(),
            container_spec: record.container_spec.clone(),
            commodity: record.commodity.clone(),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.cluster, self.namespace, self.workload_name, self.container_spec, self.commodity
        )
    }
}

/// Analysis grouping key: the dedup key plus the inferred workload kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub cluster: String,
    pub namespace: String,
    pub workload_kind: WorkloadKind,
    pub workload_name: String,
    pub container_spec: String,
    pub commodity: Commodity,
}

impl GroupKey {
    pub fn of(record: &ActionRecord) -> Self {
        Self {
            cluster: record.cluster.clone(),
            namespace: record.namespace.clone(),
            workload_kind: record.workload_kind(),
            workload_name: record.workload_name.clone(),
            container_spec: record.container_spec.clone(),
            commodity: record.commodity.clone(),
        }
    }

    /// Consolidation key spanning all commodities for one workload/container.
    pub fn workload_key(&self) -> WorkloadKey {
        WorkloadKey {
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
            workload_kind: self.workload_kind,
            workload_name: self.workload_name.clone(),
            container_spec: self.container_spec.clone(),
        }
    }

    /// Workload identity used by the recency filter; deliberately coarser
    /// than the grouping key (no container spec, no commodity).
    pub fn workload_identity(&self) -> WorkloadIdentity {
        WorkloadIdentity {
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
            workload_kind: self.workload_kind,
            workload_name: self.workload_name.clone(),
        }
    }
}

/// Consolidation unit: one workload/container across all its commodities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkloadKey {
    pub cluster: String,
    pub namespace: String,
    pub workload_kind: WorkloadKind,
    pub workload_name: String,
    pub container_spec: String,
}

/// Workload-level identity for the recency filter (no container spec).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkloadIdentity {
    pub cluster: String,
    pub namespace: String,
    pub workload_kind: WorkloadKind,
    pub workload_name: String,
}

/// Replica count resolved across a workload's oldest and newest actions.
///
/// Descriptive only; the impact math always uses the newest action's count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaSpan {
    Constant(i64),
    Changed { from: i64, to: i64 },
}

impl ReplicaSpan {
    pub fn from_endpoints(oldest: Option<i64>, newest: Option<i64>) -> Self {
        let from = oldest.unwrap_or(0);
        let to = newest.unwrap_or(0);
        if from == to {
            ReplicaSpan::Constant(to)
        } else {
            ReplicaSpan::Changed { from, to }
        }
    }
}

impl fmt::Display for ReplicaSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicaSpan::Constant(n) => write!(f, "{}", n),
            ReplicaSpan::Changed { from, to } => write!(f, "{}→{}", from, to),
        }
    }
}

impl Serialize for ReplicaSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-commodity change for one consolidated workload/container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityChange {
    /// Net impact: value delta scaled by the workload's newest replica count.
    pub change: f64,
    pub change_pct: f64,
    pub units: String,
}

/// One workload/container's consolidated summary across all its commodities.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedResult {
    pub cluster: String,
    pub namespace: String,
    pub workload_kind: WorkloadKind,
    pub workload_name: String,
    pub container_spec: String,
    pub replicas: ReplicaSpan,
    pub changes: BTreeMap<Commodity, CommodityChange>,
    pub oldest_date: NaiveDateTime,
    pub newest_date: NaiveDateTime,
    pub time_span_days: i64,
    /// Sum of absolute per-commodity impacts, used for ranking.
    pub total_absolute_impact: f64,
}

impl ConsolidatedResult {
    pub fn change_for(&self, commodity: &Commodity) -> f64 {
        self.changes.get(commodity).map(|c| c.change).unwrap_or(0.0)
    }

    pub fn change_pct_for(&self, commodity: &Commodity) -> f64 {
        self.changes
            .get(commodity)
            .map(|c| c.change_pct)
            .unwrap_or(0.0)
    }
}

/// Summed per-commodity impact for one time window.
///
/// Every generated bucket produces exactly one result, zero-valued when no
/// action fell inside the window.
#[derive(Debug, Clone, Serialize)]
pub struct TimeBucketResult {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub totals: BTreeMap<Commodity, f64>,
}

impl TimeBucketResult {
    pub fn total_for(&self, commodity: &Commodity) -> f64 {
        self.totals.get(commodity).copied().unwrap_or(0.0)
    }
}
