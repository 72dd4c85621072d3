//! Shared domain vocabulary for the billing engine: the half-open interval
//! algebra (C1), the data model entities (§3), validity-window derivation,
//! and the `Authorizer` capability (C7).

pub mod authorizer;
pub mod entities;
pub mod interval;
pub mod validity;

pub use authorizer::{Authorizer, StaticAuthorizer, UnauthorisedProvider};
pub use entities::{
    BillableEvent, CurrencyRateRow, EventKind, Price, PriceComponent, PricingPlan,
    PricingPlanComponent, RawEvent, ResourceInterval, ResourceSnapshot, ResourceType, VatRateRow,
};
pub use interval::{partition_at, Bound, Interval};
