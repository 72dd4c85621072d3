//! `/usage`, `/events`, `/resources/:resource/events` (§6): the two
//! aggregated billable-event listings and the per-pricing-component
//! breakdown for a single resource.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::StreamExt;
use query::CancellationSource;

use crate::accept::{negotiate, respond};
use crate::dto::ComponentEvent;
use crate::error::Error;
use crate::handlers::authorised_filter;
use crate::range::RangeQuery;
use crate::state::AppState;

/// `GET /usage` — every billable event in range, authorised to the caller's
/// spaces.
pub async fn usage(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    list_events(&state, &headers, &range).await
}

/// `GET /events` — same listing as `/usage`, under the name §6 gives the
/// unrestricted alias.
pub async fn events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    list_events(&state, &headers, &range).await
}

async fn list_events(state: &AppState, headers: &HeaderMap, range: &RangeQuery) -> Result<Response, Error> {
    let media = negotiate(headers, range.accept_override.as_deref())?;
    let filter = authorised_filter(state, headers, range).await?;

    // Uses the cancellable streaming path (§4.6/§5) rather than
    // `get_billable_events`: this request's cancellation source is never
    // triggered today (no client-disconnect hook yet), but the response is
    // still built by draining the real cancellable stream and propagating
    // `Cancelled` like any other caller would.
    let (_cancellation_source, cancellation) = CancellationSource::new();
    let mut stream = Box::pin(state.engine.stream_billable_events(filter, cancellation));
    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(item.map_err(Error::Query)?);
    }
    Ok(respond(media, &events))
}

/// `GET /resources/:resource/events` — flattens each billable event's priced
/// [`model::PriceComponent`] details into one row per plan/VAT/currency
/// window, mirroring the original's `ListEventUsageForResource` grouping.
pub async fn resource_events(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let mut filter = authorised_filter(&state, &headers, &range).await?;
    filter.resource_guids = Some([resource.clone()].into());

    let events = state.engine.get_billable_events(&filter).await.map_err(Error::Query)?;
    let rows: Vec<ComponentEvent> = events
        .iter()
        .flat_map(|event| {
            event.price.details.iter().map(|component| ComponentEvent {
                resource_guid: event.resource_guid.clone(),
                plan_name: component.plan_name.clone(),
                component_name: component.name.clone(),
                start: component.start,
                stop: component.stop,
                vat_code: component.vat_code.clone(),
                vat_rate: component.vat_rate,
                currency_code: component.currency_code.clone(),
                currency_rate: component.currency_rate,
                ex_vat: component.ex_vat.clone(),
                inc_vat: component.inc_vat.clone(),
            })
        })
        .collect();
    Ok(respond(media, &rows))
}
