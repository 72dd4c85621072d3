//! Parses the opaque `raw_message` JSON payload of a [`model::RawEvent`]
//! into the fields the reconstructor's state machine needs (§4.4 "Event kind
//! → resource_type mapping").
//!
//! Field names follow the platform's own usage-event schema (app/service
//! lifecycle events and managed-database audit events), not a schema we
//! invented.

use model::{EventKind, RawEvent, ResourceSnapshot, ResourceType};
use thiserror::Error;

/// A fixed plan GUID applied to compute resources (apps, tasks, and the
/// tasks synthesised from compose audit events) — these usage events carry
/// no `plan_guid` of their own because the platform bills compute uniformly
/// (§4.4).
pub const COMPUTE_PLAN_GUID: &str = "compute";

/// The distinct plan `state = STAGING_*` app events are billed under (§4.4).
pub const STAGING_PLAN_GUID: &str = "staging";

#[derive(Debug, Error)]
pub enum Error {
    #[error("raw event {0} has a payload this reconstructor does not understand: {1}")]
    Unrecognised(String, String),
}

/// Whether a parsed app/service lifecycle event starts, mutates, or stops
/// its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
}

/// One event, decoded enough to drive the per-resource state machine (C4).
#[derive(Debug, Clone)]
pub struct ParsedEvent {
    pub resource_guid: String,
    pub transition: Transition,
    pub snapshot: ResourceSnapshot,
}

fn as_str<'a>(v: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(|f| f.as_str())
}

fn as_i64(v: &serde_json::Value, key: &str) -> i64 {
    v.get(key).and_then(|f| f.as_i64()).unwrap_or(0)
}

/// Parses `event` according to its [`EventKind`], or returns `None` if the
/// payload doesn't describe a state transition the reconstructor tracks
/// (e.g. an unrelated audit event). Unparseable payloads on a kind that
/// *should* carry a transition are a [`Error::Unrecognised`].
pub fn parse(event: &RawEvent) -> Result<Option<ParsedEvent>, Error> {
    match event.kind {
        EventKind::App => parse_app(event),
        EventKind::Service => parse_service(event),
        EventKind::Compose => parse_compose(event),
    }
}

fn parse_app(event: &RawEvent) -> Result<Option<ParsedEvent>, Error> {
    let v = &event.raw_message;
    let state = as_str(v, "state")
        .ok_or_else(|| Error::Unrecognised(event.event_guid.clone(), "missing state".into()))?;

    let transition = match state {
        "STARTED" | "STAGING_STARTED" => Transition::Start,
        "STOPPED" | "STAGING_STOPPED" => Transition::Stop,
        _ => return Ok(None),
    };

    let resource_type = if state.starts_with("STAGING_") {
        ResourceType::Staging
    } else {
        match as_str(v, "process_type") {
            Some("task") => ResourceType::Task,
            _ => ResourceType::App,
        }
    };

    let plan_guid = if resource_type == ResourceType::Staging {
        STAGING_PLAN_GUID
    } else {
        COMPUTE_PLAN_GUID
    }
    .to_string();

    let resource_guid = as_str(v, "app_guid")
        .ok_or_else(|| Error::Unrecognised(event.event_guid.clone(), "missing app_guid".into()))?
        .to_string();

    Ok(Some(ParsedEvent {
        resource_guid,
        transition,
        snapshot: ResourceSnapshot {
            resource_name: as_str(v, "app_name").unwrap_or_default().to_string(),
            resource_type,
            org_guid: as_str(v, "org_guid").unwrap_or_default().to_string(),
            space_guid: as_str(v, "space_guid").unwrap_or_default().to_string(),
            plan_guid,
            number_of_nodes: as_i64(v, "instance_count"),
            memory_in_mb: as_i64(v, "memory_in_mb_per_instance"),
            storage_in_mb: as_i64(v, "storage_in_mb"),
        },
    }))
}

fn parse_service(event: &RawEvent) -> Result<Option<ParsedEvent>, Error> {
    let v = &event.raw_message;
    let state = as_str(v, "state")
        .ok_or_else(|| Error::Unrecognised(event.event_guid.clone(), "missing state".into()))?;

    let transition = match state {
        "CREATED" | "UPDATED" => Transition::Start,
        "DELETED" => Transition::Stop,
        _ => return Ok(None),
    };

    let resource_guid = as_str(v, "service_instance_guid")
        .ok_or_else(|| {
            Error::Unrecognised(event.event_guid.clone(), "missing service_instance_guid".into())
        })?
        .to_string();

    Ok(Some(ParsedEvent {
        resource_guid,
        transition,
        snapshot: ResourceSnapshot {
            resource_name: as_str(v, "service_instance_name").unwrap_or_default().to_string(),
            resource_type: ResourceType::Service,
            org_guid: as_str(v, "org_guid").unwrap_or_default().to_string(),
            space_guid: as_str(v, "space_guid").unwrap_or_default().to_string(),
            plan_guid: as_str(v, "service_plan_guid").unwrap_or_default().to_string(),
            number_of_nodes: 1,
            memory_in_mb: 0,
            storage_in_mb: as_i64(v, "storage_in_mb"),
        },
    }))
}

/// Resolves a `compose_audit_events` row to the app-keyed task it bills
/// against. The correlation from a compose `account_id` to an app's
/// `resource_guid` is not carried on the event itself — it is supplied by
/// the caller (§9 "the mapping ... is speculative").
pub fn parse_compose(event: &RawEvent) -> Result<Option<ParsedEvent>, Error> {
    let v = &event.raw_message;
    let Some(kind) = as_str(v, "event") else {
        return Ok(None);
    };
    if kind != "deployment.scale.members" {
        return Ok(None);
    }
    // Compose deployments don't emit a start/stop pair the way app/service
    // events do: each audit row is a standing snapshot of current
    // provisioning, re-asserted whenever it changes. The caller's
    // correlation step (see `reconstructor::compose`) is responsible for
    // turning this into a `ParsedEvent`; signal that here by returning
    // `None` and letting `reconstructor::compose::correlate` build the
    // event directly from the audit row.
    let _ = event;
    Ok(None)
}
