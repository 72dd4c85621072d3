//! The `{errorType, description}` JSON error body shared by every HTTP
//! handler (§7), and the `Internal` correlation-id convention: full detail
//! goes to `tracing::error!`, only the id crosses the wire.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "errorType")]
    pub error_type: &'static str,
    pub description: String,
}

pub fn error(error_type: &'static str, description: impl Into<String>) -> ErrorBody {
    ErrorBody {
        error_type,
        description: description.into(),
    }
}

/// Logs `err` under a fresh correlation id and returns the body that should
/// be sent to the client in its place — never the underlying error message
/// (§7 `Internal`).
pub fn internal_error(err: impl std::fmt::Debug) -> ErrorBody {
    let correlation_id = Uuid::new_v4();
    tracing::error!(%correlation_id, ?err, "internal error");
    error(
        "Internal",
        format!("an internal error occurred, correlation id {correlation_id}"),
    )
}
