//! The billable-event query surface (C6, §4.6) and the authorisation
//! filter it is composed with (C7, §4.7).

mod authorization;
mod cancellation;
mod engine;
mod filter;

pub use authorization::authorize;
pub use cancellation::{Cancellation, CancellationSource};
pub use engine::{Error, QueryEngine};
pub use filter::{Filter, GroupBy, GroupKey};
