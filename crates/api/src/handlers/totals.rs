//! Totals endpoints (§6): sums of `price.inc_vat` grouped by org, space, or
//! resource, at the "many" and "single" granularities the path implies.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use query::{Filter, GroupBy};

use crate::accept::{negotiate, respond};
use crate::dto::TotalsRow;
use crate::error::Error;
use crate::handlers::authorised_filter;
use crate::range::RangeQuery;
use crate::state::AppState;

async fn totals(
    state: &AppState,
    headers: &HeaderMap,
    range: &RangeQuery,
    restrict: impl FnOnce(&mut Filter),
    group_by: GroupBy,
) -> Result<Vec<TotalsRow>, Error> {
    let mut filter = authorised_filter(state, headers, range).await?;
    restrict(&mut filter);
    let rows = state.engine.get_usage_totals(&filter, group_by).await.map_err(Error::Query)?;
    Ok(rows
        .into_iter()
        .map(|(key, pence)| TotalsRow {
            org_guid: key.org_guid,
            space_guid: key.space_guid,
            resource_guid: key.resource_guid,
            price_in_pence: pence,
        })
        .collect())
}

fn single(rows: Vec<TotalsRow>) -> TotalsRow {
    rows.into_iter().next().unwrap_or(TotalsRow {
        org_guid: None,
        space_guid: None,
        resource_guid: None,
        price_in_pence: 0,
    })
}

/// `GET /organisations` — totals grouped by org, authorised.
pub async fn organisations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(&state, &headers, &range, |_| {}, GroupBy::Org).await?;
    Ok(respond(media, &rows))
}

/// `GET /organisations/:org/usage` — total for one org.
pub async fn org_usage(
    State(state): State<AppState>,
    Path(org): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(
        &state,
        &headers,
        &range,
        |f| f.org_guids = Some([org.clone()].into()),
        GroupBy::Org,
    )
    .await?;
    Ok(respond(media, &single(rows)))
}

/// `GET /organisations/:org/spaces` — totals per space in org.
pub async fn org_spaces(
    State(state): State<AppState>,
    Path(org): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(
        &state,
        &headers,
        &range,
        |f| f.org_guids = Some([org.clone()].into()),
        GroupBy::OrgSpace,
    )
    .await?;
    Ok(respond(media, &rows))
}

/// `GET /spaces` — totals per space, authorised.
pub async fn spaces(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(&state, &headers, &range, |_| {}, GroupBy::OrgSpace).await?;
    Ok(respond(media, &rows))
}

/// `GET /spaces/:space/usage` — total for one space.
pub async fn space_usage(
    State(state): State<AppState>,
    Path(space): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(
        &state,
        &headers,
        &range,
        |f| f.space_guids = Some([space.clone()].into()),
        GroupBy::OrgSpace,
    )
    .await?;
    Ok(respond(media, &single(rows)))
}

/// `GET /organisations/:org/resources` — totals per resource in org.
pub async fn org_resources(
    State(state): State<AppState>,
    Path(org): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(
        &state,
        &headers,
        &range,
        |f| f.org_guids = Some([org.clone()].into()),
        GroupBy::OrgSpaceResource,
    )
    .await?;
    Ok(respond(media, &rows))
}

/// `GET /spaces/:space/resources` — totals per resource in space.
pub async fn space_resources(
    State(state): State<AppState>,
    Path(space): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(
        &state,
        &headers,
        &range,
        |f| f.space_guids = Some([space.clone()].into()),
        GroupBy::OrgSpaceResource,
    )
    .await?;
    Ok(respond(media, &rows))
}

/// `GET /resources` — totals per resource, authorised.
pub async fn resources(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(&state, &headers, &range, |_| {}, GroupBy::OrgSpaceResource).await?;
    Ok(respond(media, &rows))
}

/// `GET /resources/:resource/usage` — total for one resource.
pub async fn resource_usage(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> Result<Response, Error> {
    let media = negotiate(&headers, range.accept_override.as_deref())?;
    let rows = totals(
        &state,
        &headers,
        &range,
        |f| f.resource_guids = Some([resource.clone()].into()),
        GroupBy::OrgSpaceResource,
    )
    .await?;
    Ok(respond(media, &single(rows)))
}
