//! `/organisations/:org/report` and `/forecast` (§6): the nested
//! org→space→resource report, grounded in the original's `generateReport`
//! CTE (group by name/space/plan, then by space, then by org).

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use model::{BillableEvent, ResourceInterval, ResourceSnapshot, ResourceType};

use crate::accept::{negotiate, respond};
use crate::dto::{price_pence, ForecastRequest, Report, ResourceReport, SpaceReport};
use crate::error::Error;
use crate::range::RangeQuery;
use crate::state::AppState;

/// `GET /organisations/:org/report` — a nested report for real usage. The
/// Go original skips authorisation for this handler (`withAllResources`);
/// this port applies the usual §4.7 narrowing instead, since the endpoint
/// exposes real org data rather than synthetic forecast figures.
pub async fn org_report(
    State(state): State<AppState>,
    Path(org): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let mut filter = crate::handlers::authorised_filter(&state, &headers, &range).await?;
    filter.org_guids = Some([org.clone()].into());

    let events = state.engine.get_billable_events(&filter).await.map_err(Error::Query)?;
    Ok(respond(media, &build_report(&org, &events)))
}

/// `POST /forecast` — prices hypothetical resources over `from..to` as if
/// they had existed for the whole range, under a fixed synthetic org
/// identity (mirrors the original's `orgGUID := "simulated-org"`). No
/// authorisation applies: the data is synthetic, nothing real to leak.
pub async fn forecast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
    Json(body): Json<ForecastRequest>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let (from, to) = range.range()?;
    let duration = model::Interval::bounded(from, to).ok_or_else(|| Error::BadRequest("empty range".into()))?;

    const SIMULATED_ORG: &str = "simulated-org";
    let intervals: Vec<ResourceInterval> = body
        .events
        .iter()
        .map(|event| ResourceInterval {
            resource_guid: format!("{}-guid", event.name),
            snapshot: ResourceSnapshot {
                resource_name: event.name.clone(),
                resource_type: ResourceType::App,
                org_guid: SIMULATED_ORG.to_string(),
                space_guid: event.space_guid.clone(),
                plan_guid: event.plan_guid.clone(),
                number_of_nodes: 1,
                memory_in_mb: event.memory_in_mb,
                storage_in_mb: 0,
            },
            duration,
        })
        .collect();

    let filter = query::Filter::new(from, to);
    let events = state
        .engine
        .simulate(&filter, &intervals)
        .await
        .map_err(Error::Query)?;
    Ok(respond(media, &build_report(SIMULATED_ORG, &events)))
}

fn build_report(org_guid: &str, events: &[BillableEvent]) -> Report {
    #[derive(Default)]
    struct ResourceAcc {
        plan_guid: String,
        plan_name: String,
        duration_seconds: i64,
        price_in_pence: i64,
    }

    let mut by_resource: BTreeMap<(String, String), ResourceAcc> = BTreeMap::new();
    for event in events {
        let plan_name = event
            .price
            .details
            .first()
            .map(|d| d.plan_name.clone())
            .unwrap_or_default();
        let acc = by_resource
            .entry((event.space_guid.clone(), event.resource_name.clone()))
            .or_default();
        acc.plan_guid = event.plan_guid.clone();
        acc.plan_name = plan_name;
        acc.duration_seconds += (event.event_stop - event.event_start).num_seconds();
        acc.price_in_pence += price_pence(&event.price.inc_vat);
    }

    let mut by_space: BTreeMap<String, Vec<ResourceReport>> = BTreeMap::new();
    for ((space_guid, name), acc) in by_resource {
        by_space
            .entry(space_guid.clone())
            .or_default()
            .push(ResourceReport {
                name,
                space_guid,
                plan_guid: acc.plan_guid,
                plan_name: acc.plan_name,
                duration_seconds: acc.duration_seconds,
                price_in_pence: acc.price_in_pence,
            });
    }

    let spaces: Vec<SpaceReport> = by_space
        .into_iter()
        .map(|(space_guid, resources)| SpaceReport {
            space_guid,
            price_in_pence: resources.iter().map(|r| r.price_in_pence).sum(),
            resources,
        })
        .collect();

    Report {
        org_guid: org_guid.to_string(),
        price_in_pence: spaces.iter().map(|s| s.price_in_pence).sum(),
        spaces,
    }
}

