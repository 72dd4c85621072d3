//! Resolves the request's bearer token against the OAuth introspection
//! endpoint (§6 "Authorisation token is read from the `Authorization`
//! request header; introspection endpoint is configured at boot"). The
//! introspection provider itself is out of scope (spec.md §1); this is the
//! thin HTTP client satisfying the `Authorizer` capability contract (§4.7,
//! §9), following the request/parse/log-on-error shape of
//! `shared::bad_token::token_owner_finder::blockscout::BlockscoutTokenOwnerFinder`.

use axum::http::HeaderMap;
use model::{StaticAuthorizer, UnauthorisedProvider};
use serde::Deserialize;
use url::Url;

use crate::error::Error;

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(Error::Unauthenticated)
}

#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    spaces: Vec<String>,
}

/// Introspects `token` and returns the capability it grants. Logs (but does
/// not leak to the client) the introspection endpoint's raw failure detail.
pub async fn introspect(
    client: &reqwest::Client,
    introspection_url: &Url,
    token: &str,
) -> Result<StaticAuthorizer, UnauthorisedProvider> {
    let response = client
        .get(introspection_url.clone())
        .bearer_auth(token)
        .send()
        .await
        .map_err(|err| UnauthorisedProvider(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "introspection endpoint rejected request");
        return Err(UnauthorisedProvider(format!("introspection returned {status}")));
    }

    let body: IntrospectionResponse = response
        .json()
        .await
        .map_err(|err| UnauthorisedProvider(err.to_string()))?;

    if !body.active {
        return Err(UnauthorisedProvider("token is not active".into()));
    }

    Ok(if body.admin {
        StaticAuthorizer::admin()
    } else {
        StaticAuthorizer::spaces(body.spaces)
    })
}
