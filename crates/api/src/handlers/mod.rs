mod report;
mod totals;
mod usage;

pub use report::{forecast, org_report};
pub use totals::{
    org_resources, org_spaces, org_usage, organisations, resource_usage, resources,
    space_resources, space_usage, spaces,
};
pub use usage::{events, resource_events, usage as usage_list};

use axum::http::HeaderMap;
use model::Authorizer;

use crate::authorizer::{bearer_token, introspect};
use crate::error::Error;
use crate::range::RangeQuery;
use crate::state::AppState;

/// Builds an authorised, range-restricted filter common to every endpoint
/// (§4.6, §4.7, §4.8): parse `from`/`to`, resolve the bearer token against
/// the introspection endpoint, then narrow to the caller's permitted spaces.
pub(crate) async fn authorised_filter(
    state: &AppState,
    headers: &HeaderMap,
    range: &RangeQuery,
) -> Result<query::Filter, Error> {
    let (from, to) = range.range()?;
    let token = bearer_token(headers)?;
    let authorizer = introspect(&state.http, &state.introspection_url, token)
        .await
        .map_err(|err| Error::Query(query::Error::Unauthorised(err.0)))?;
    let filter = query::Filter::new(from, to);
    query::authorize(filter, &authorizer as &(dyn Authorizer + Send + Sync))
        .await
        .map_err(Error::Query)
}
