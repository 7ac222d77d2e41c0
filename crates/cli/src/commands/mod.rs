pub mod analyze;
pub mod buckets;
pub mod dedup;
