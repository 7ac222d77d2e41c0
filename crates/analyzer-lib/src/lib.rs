//! Core library for container resize action analysis
//!
//! This crate provides the batch pipeline for:
//! - CSV ingest and row validation
//! - Consecutive-duplicate removal (standard and conservative)
//! - Grouping and recency filtering
//! - Replica-normalized change consolidation
//! - Time-bucket trend analysis
//! - CSV export of cleaned data, audits, and results

pub mod buckets;
pub mod changes;
pub mod dedup;
pub mod error;
pub mod export;
pub mod grouping;
pub mod ingest;
pub mod models;
pub mod recency;

#[cfg(test)]
mod testutil;

pub use buckets::{analyze_buckets, parse_bucket_duration, BucketConfig};
pub use changes::{analyze_changes, sort_by_vcpu_request_change};
pub use dedup::{dedup_actions, DedupOutcome, DedupPolicy, RemovedAction};
pub use error::{AnalyzerError, Result};
pub use ingest::{load_actions, short_cluster_name, LoadFilter, LoadStats, LoadedActions};
pub use models::*;
pub use recency::{apply_recency_filter, cutoff_from};
