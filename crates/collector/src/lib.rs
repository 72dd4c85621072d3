//! Pulls raw telemetry from the upstream platform API and deposits it into
//! the raw event store (C3, §4.3). The store's contract (`insert`/`scan`)
//! is the priced pipeline's concern; this crate is the "out of scope"
//! transport named in spec.md §1 — pagination, throttling and upstream HTTP
//! auth against the platform API, specified only at the `EventFetcher`
//! interface it must satisfy.

mod fetcher;
mod run_loop;

pub use fetcher::{Error, EventFetcher, UpstreamEventFetcher};
pub use run_loop::RunLoop;
