//! Shared builders for unit tests

use crate::models::{ActionRecord, Commodity};
use chrono::NaiveDateTime;

pub(crate) fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").expect("valid test timestamp")
}

/// Build a succeeded resize action with sensible defaults.
pub(crate) fn action(
    workload: &str,
    commodity: Commodity,
    current_value: f64,
    new_value: f64,
    replicas: i64,
    when: &str,
) -> ActionRecord {
    let units = if commodity.is_memory() { "KB" } else { "mc" };
    // Raw row kept aligned with the typed fields so export tests can
    // compare byte-for-byte.
    let original_row = vec![
        "01 Sep 2025 10:00".to_string(),
        workload.to_string(),
        "Kubernetes-prod".to_string(),
        replicas.to_string(),
        "shop".to_string(),
        workload.to_string(),
        commodity.to_string(),
        if new_value >= current_value { "UP" } else { "DOWN" }.to_string(),
        current_value.to_string(),
        new_value.to_string(),
        format!("{:+}", new_value - current_value),
        units.to_string(),
        format!("Resize Deployment {}", workload),
        "Efficiency Improvement".to_string(),
        String::new(),
        "MANUAL".to_string(),
        "admin".to_string(),
        ts(when).format("%d %b %Y %H:%M").to_string(),
        "SUCCEEDED".to_string(),
        String::new(),
        String::new(),
    ];
    ActionRecord {
        date_created: "01 Sep 2025 10:00".to_string(),
        workload_name: workload.to_string(),
        cluster: "Kubernetes-prod".to_string(),
        replicas: Some(replicas),
        namespace: "shop".to_string(),
        container_spec: workload.to_string(),
        commodity,
        resize_direction: if new_value >= current_value { "UP" } else { "DOWN" }.to_string(),
        current_value,
        new_value,
        change: format!("{:+}", new_value - current_value),
        units: units.to_string(),
        action_description: format!("Resize Deployment {}", workload),
        action_category: "Efficiency Improvement".to_string(),
        risk_description: String::new(),
        action_mode: "MANUAL".to_string(),
        user_account: "admin".to_string(),
        execution_datetime: ts(when),
        execution_status: "SUCCEEDED".to_string(),
        execution_error: String::new(),
        tags: String::new(),
        original_row,
    }
}
