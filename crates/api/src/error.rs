//! Maps every error this service can produce onto the HTTP status/body
//! taxonomy of §7 — never the raw formula or internal detail, always the
//! `{errorType, description}` shape from `shared::api_error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::api_error::{error, internal_error, ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("missing or malformed Authorization header")]
    Unauthenticated,
    #[error("not acceptable")]
    NotAcceptable,
    #[error(transparent)]
    Query(#[from] query::Error),
}

fn reply(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::BadRequest(msg) => reply(StatusCode::BAD_REQUEST, error("BadFilter", msg)),
            // A missing/malformed bearer token is an authentication failure,
            // not a filter-parsing one (§7): same taxonomy bucket and body
            // shape as `query::Error::Unauthorised`, so a caller can't tell
            // "no token" from "token rejected" apart from the 401 vs 403
            // status already implied by the two cases being genuinely
            // different (absent vs present-but-forbidden credential).
            Error::Unauthenticated => reply(
                StatusCode::UNAUTHORIZED,
                error("Unauthorised", "authentication required"),
            ),
            Error::NotAcceptable => reply(
                StatusCode::NOT_ACCEPTABLE,
                error("NotAcceptable", "supported media types are application/json and text/html"),
            ),
            Error::Query(err) => query_error_response(err),
        }
    }
}

fn query_error_response(err: query::Error) -> Response {
    match err {
        query::Error::BadFilter(msg) => reply(StatusCode::BAD_REQUEST, error("BadFilter", msg)),
        query::Error::Pricing(pricing::Error::NoPricingPlan { plan_guid, at }) => reply(
            StatusCode::BAD_REQUEST,
            error("NoPricingPlan", format!("no pricing plan {plan_guid} valid at {at}")),
        ),
        query::Error::Pricing(pricing::Error::Formula(inner)) => reply(
            StatusCode::BAD_REQUEST,
            error(formula_error_type(&inner), "the configured pricing formula failed to evaluate"),
        ),
        query::Error::Unauthorised(_) => reply(
            StatusCode::FORBIDDEN,
            error("Unauthorised", "you are not authorised to view this resource"),
        ),
        query::Error::Cancelled => reply(
            StatusCode::from_u16(499).expect("499 is a valid status code"),
            error("Cancelled", "the request was cancelled"),
        ),
        query::Error::RawEvents(_) | query::Error::Config(_) => reply(
            StatusCode::SERVICE_UNAVAILABLE,
            error("StorageUnavailable", "the raw event store is temporarily unavailable"),
        ),
        query::Error::Reconstruction(err) => reply(StatusCode::INTERNAL_SERVER_ERROR, internal_error(err)),
    }
}

fn formula_error_type(err: &pricing::formula::Error) -> &'static str {
    match err {
        pricing::formula::Error::BadFormula => "BadFormula",
        pricing::formula::Error::EvalOverflow => "EvalOverflow",
        pricing::formula::Error::EvalDivZero => "EvalDivZero",
    }
}
