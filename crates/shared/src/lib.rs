//! Ambient infrastructure shared between the `billing-api` and
//! `billing-collector` binaries: CLI arguments (C0), `tracing` setup (C9),
//! and the uniform HTTP error body (§7).

pub mod api_error;
pub mod arguments;
pub mod tracing_setup;
