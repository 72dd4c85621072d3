//! Turns the raw, append-only event streams (C3) into reconstructed
//! [`ResourceInterval`]s (C4, §4.4): a streaming reduction keyed by
//! `resource_guid`, so memory stays bounded per-resource regardless of how
//! many raw events a production system has accumulated (§9).

pub mod compose;
mod payload;
mod state;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use model::{RawEvent, ResourceInterval};

pub use payload::{Error, COMPUTE_PLAN_GUID, STAGING_PLAN_GUID};

use compose::CorrelationPolicy;
use state::ResourceMachine;

/// How to resolve a compose audit event's `account_id` to the app-keyed
/// resource it is billed alongside (§4.4, §9).
pub trait ComposeCorrelator {
    /// Returns the resource GUID and org/space/name context the compose
    /// deployment should be billed under, or `None` if no correlation is
    /// known.
    fn resolve(&self, account_id: &str) -> Option<(String, String, String, String)>;
}

/// Consumes raw events in `(created_at, event_guid)` order and accumulates
/// [`ResourceInterval`]s, one independent state machine per `resource_guid`
/// (§4.4).
#[derive(Default)]
pub struct Reconstructor {
    machines: HashMap<String, ResourceMachine>,
    intervals: Vec<ResourceInterval>,
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    fn machine(&mut self, resource_guid: &str) -> &mut ResourceMachine {
        self.machines
            .entry(resource_guid.to_string())
            .or_insert_with(|| ResourceMachine::new(resource_guid.to_string()))
    }

    /// Feeds one raw event through the reconstructor. Events must arrive in
    /// global `(created_at, event_guid)` order (per-resource order is what
    /// actually matters — §4.4, §5); ties are the caller's responsibility
    /// to break by `event_guid` ascending before calling this.
    pub fn ingest(&mut self, event: &RawEvent) -> Result<(), Error> {
        let Some(parsed) = payload::parse(event)? else {
            return Ok(());
        };
        if let Some(interval) = self
            .machine(&parsed.resource_guid)
            .apply(parsed.transition, parsed.snapshot, event.created_at)
        {
            self.intervals.push(interval);
        }
        Ok(())
    }

    /// Feeds one `compose_audit_events` row through the reconstructor,
    /// correlating it to an app-keyed resource via `correlator` under
    /// `policy` (§4.4, §9).
    pub fn ingest_compose(
        &mut self,
        event: &RawEvent,
        correlator: &dyn ComposeCorrelator,
        policy: CorrelationPolicy,
    ) -> Result<(), Error> {
        let Some(account_id) = event.raw_message.get("account_id").and_then(|v| v.as_str()) else {
            return Ok(());
        };
        let Some((resource_guid, org_guid, space_guid, name)) = correlator.resolve(account_id)
        else {
            return Ok(());
        };

        if policy == CorrelationPolicy::VerifyBeforeTrusting
            && !self.machines.get(&resource_guid).is_some_and(ResourceMachine::is_running)
        {
            tracing::debug!(%resource_guid, %account_id, "compose correlation rejected: no running app interval");
            return Ok(());
        }

        let Some(snapshot) = compose::snapshot_for(&event.raw_message, &org_guid, &space_guid, &name) else {
            return Ok(());
        };

        if let Some(interval) =
            self.machine(&resource_guid)
                .apply(payload::Transition::Start, snapshot, event.created_at)
        {
            self.intervals.push(interval);
        }
        Ok(())
    }

    /// Closes every resource still `Running`, synthesising a stop at
    /// `min(now, range_stop)` (§4.4 "If still Running at query time"), and
    /// returns every [`ResourceInterval`] reconstructed so far, sorted by
    /// `(resource_guid, duration)` for deterministic downstream slicing.
    pub fn finish(mut self, now: DateTime<Utc>, range_stop: DateTime<Utc>) -> Vec<ResourceInterval> {
        let stop_at = now.min(range_stop);
        for machine in self.machines.values_mut() {
            if let Some(interval) = machine.finish(stop_at) {
                self.intervals.push(interval);
            }
        }
        self.intervals.sort_by(|a, b| {
            a.resource_guid
                .cmp(&b.resource_guid)
                .then(a.duration.cmp(&b.duration))
        });
        self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::ResourceType;

    fn t(s: &str) -> DateTime<Utc> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").unwrap().and_utc()
    }

    fn app_event(guid: &str, created_at: &str, state: &str, instance_count: i64) -> RawEvent {
        RawEvent {
            event_guid: guid.into(),
            created_at: t(created_at),
            kind: model::EventKind::App,
            raw_message: serde_json::json!({
                "state": state,
                "app_guid": "app-1",
                "app_name": "my-app",
                "org_guid": "org-1",
                "space_guid": "space-1",
                "process_type": "web",
                "instance_count": instance_count,
                "memory_in_mb_per_instance": 512
            }),
        }
    }

    #[test]
    fn start_stop_produces_one_interval() {
        let mut r = Reconstructor::new();
        r.ingest(&app_event("e1", "2001-01-01T00:00:00Z", "STARTED", 1)).unwrap();
        r.ingest(&app_event("e2", "2001-01-01T01:00:00Z", "STOPPED", 1)).unwrap();
        let intervals = r.finish(t("3000-01-01T00:00:00Z"), t("3000-01-01T00:00:00Z"));
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].resource_guid, "app-1");
        assert_eq!(intervals[0].snapshot.resource_type, ResourceType::App);
    }

    #[test]
    fn scale_mid_flight_splits_into_two_intervals() {
        let mut r = Reconstructor::new();
        r.ingest(&app_event("e1", "2001-01-01T00:00:00Z", "STARTED", 1)).unwrap();
        r.ingest(&app_event("e2", "2001-01-01T01:00:00Z", "STARTED", 2)).unwrap();
        r.ingest(&app_event("e3", "2001-01-01T02:00:00Z", "STOPPED", 2)).unwrap();
        let intervals = r.finish(t("3000-01-01T00:00:00Z"), t("3000-01-01T00:00:00Z"));
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].snapshot.number_of_nodes, 1);
        assert_eq!(intervals[1].snapshot.number_of_nodes, 2);
    }

    #[test]
    fn unstopped_app_synthesises_stop_at_now() {
        let mut r = Reconstructor::new();
        r.ingest(&app_event("e1", "2001-01-01T00:00:00Z", "STARTED", 1)).unwrap();
        let now = t("2001-01-01T02:00:00Z");
        let intervals = r.finish(now, t("3000-02-01T00:00:00Z"));
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].duration.hi(), model::Bound::At(now));
    }

    #[test]
    fn duplicate_start_with_same_snapshot_is_a_no_op() {
        let mut r = Reconstructor::new();
        r.ingest(&app_event("e1", "2001-01-01T00:00:00Z", "STARTED", 1)).unwrap();
        r.ingest(&app_event("e2", "2001-01-01T00:30:00Z", "STARTED", 1)).unwrap();
        r.ingest(&app_event("e3", "2001-01-01T01:00:00Z", "STOPPED", 1)).unwrap();
        let intervals = r.finish(t("3000-01-01T00:00:00Z"), t("3000-01-01T00:00:00Z"));
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].duration.lo(), model::Bound::At(t("2001-01-01T00:00:00Z")));
    }

    struct NoCorrelation;
    impl ComposeCorrelator for NoCorrelation {
        fn resolve(&self, _account_id: &str) -> Option<(String, String, String, String)> {
            None
        }
    }

    #[test]
    fn compose_event_without_correlation_is_ignored() {
        let mut r = Reconstructor::new();
        let event = RawEvent {
            event_guid: "c1".into(),
            created_at: t("2001-01-01T00:00:00Z"),
            kind: model::EventKind::Compose,
            raw_message: serde_json::json!({
                "event": "deployment.scale.members",
                "account_id": "acct-1",
                "data": {"units": "3", "memory": "306 MB", "storage": "3 GB"}
            }),
        };
        r.ingest_compose(&event, &NoCorrelation, CorrelationPolicy::Trust).unwrap();
        let intervals = r.finish(t("3000-01-01T00:00:00Z"), t("3000-01-01T00:00:00Z"));
        assert!(intervals.is_empty());
    }
}
