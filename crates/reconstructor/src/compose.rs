//! Correlates `compose_audit_events` (managed-database deployment scaling
//! notifications) to the app-keyed task they bill against (§4.4, §9 "the
//! mapping ... is speculative — verify before trusting in production").
//!
//! The audit event itself carries an `account_id`, not an `app_guid`; the
//! caller supplies the account→resource correlation (how that mapping is
//! derived — e.g. from a provisioning side-table — is outside this crate).

use model::{ResourceSnapshot, ResourceType};

use crate::payload::COMPUTE_PLAN_GUID;

/// How much to trust the account→resource correlation for compose events
/// (§9 open question resolution, recorded in `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationPolicy {
    /// Accept the mapped resource unconditionally.
    Trust,
    /// Additionally require the mapped resource to already have an open
    /// (`Running`) interval before treating the compose event as billable.
    #[default]
    VerifyBeforeTrusting,
}

/// Parses a `"306 MB"` / `"3 GB"`-style quantity string into megabytes.
fn parse_mb(s: &str) -> i64 {
    let mut parts = s.split_whitespace();
    let Some(number) = parts.next().and_then(|n| n.parse::<f64>().ok()) else {
        return 0;
    };
    let multiplier = match parts.next().map(str::to_ascii_uppercase).as_deref() {
        Some("GB") => 1024.0,
        _ => 1.0,
    };
    (number * multiplier).round() as i64
}

/// Builds the snapshot a `deployment.scale.members` compose event implies,
/// given the account it belongs to has already been mapped to
/// `resource_guid` (e.g. the app it is billed alongside).
pub fn snapshot_for(
    payload: &serde_json::Value,
    org_guid: &str,
    space_guid: &str,
    resource_name: &str,
) -> Option<ResourceSnapshot> {
    let data = payload.get("data")?;
    let number_of_nodes = data
        .get("units")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(1);
    let memory_in_mb = data
        .get("memory")
        .and_then(|v| v.as_str())
        .map(parse_mb)
        .unwrap_or(0);
    let storage_in_mb = data
        .get("storage")
        .and_then(|v| v.as_str())
        .map(parse_mb)
        .unwrap_or(0);

    Some(ResourceSnapshot {
        resource_name: resource_name.to_string(),
        resource_type: ResourceType::Task,
        org_guid: org_guid.to_string(),
        space_guid: space_guid.to_string(),
        plan_guid: COMPUTE_PLAN_GUID.to_string(),
        number_of_nodes,
        memory_in_mb,
        storage_in_mb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compose_scale_payload() {
        let payload = serde_json::json!({
            "event": "deployment.scale.members",
            "account_id": "acct-1",
            "data": {"units": "3", "memory": "306 MB", "storage": "3 GB"}
        });
        let snapshot = snapshot_for(&payload, "org-1", "space-1", "ibm1").unwrap();
        assert_eq!(snapshot.number_of_nodes, 3);
        assert_eq!(snapshot.memory_in_mb, 306);
        assert_eq!(snapshot.plan_guid, COMPUTE_PLAN_GUID);
    }
}
