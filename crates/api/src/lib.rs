//! The HTTP surface (C8, §4.8, §6): an `axum` router over the billable-event
//! query engine (C6), content-negotiated between JSON and a minimal HTML
//! dump, authorised per request against an OAuth introspection endpoint.

mod accept;
mod authorizer;
mod dto;
mod error;
mod handlers;
mod range;
mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/usage", get(handlers::usage_list))
        .route("/events", get(handlers::events))
        .route("/organisations", get(handlers::organisations))
        .route("/organisations/:org/usage", get(handlers::org_usage))
        .route("/organisations/:org/spaces", get(handlers::org_spaces))
        .route("/organisations/:org/resources", get(handlers::org_resources))
        .route("/organisations/:org/report", get(handlers::org_report))
        .route("/spaces", get(handlers::spaces))
        .route("/spaces/:space/usage", get(handlers::space_usage))
        .route("/spaces/:space/resources", get(handlers::space_resources))
        .route("/resources", get(handlers::resources))
        .route("/resources/:resource/usage", get(handlers::resource_usage))
        .route("/resources/:resource/events", get(handlers::resource_events))
        .route("/forecast", post(handlers::forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
