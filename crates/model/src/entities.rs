//! The data model (§3): raw events, derived resource intervals, pricing
//! configuration, and the final billable event shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// `app`, `service`, or `compose` — the three raw event streams (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    App,
    Service,
    Compose,
}

/// An immutable, append-only raw telemetry record (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_guid: String,
    pub created_at: DateTime<Utc>,
    pub kind: EventKind,
    pub raw_message: serde_json::Value,
}

/// `app`, `task`, `service`, or `staging` — what a [`ResourceInterval`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    App,
    Service,
    Task,
    Staging,
}

/// A snapshot of a resource's configuration, held constant for the lifetime
/// of one [`ResourceInterval`] (§4.4 `Running(snapshot)`).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub resource_name: String,
    pub resource_type: ResourceType,
    pub org_guid: String,
    pub space_guid: String,
    pub plan_guid: String,
    pub number_of_nodes: i64,
    pub memory_in_mb: i64,
    pub storage_in_mb: i64,
}

/// A reconstructed period during which a resource existed with a constant
/// configuration (§3). Invariants: `duration` is non-empty; intervals for a
/// single `resource_guid` never overlap and partition its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInterval {
    pub resource_guid: String,
    pub snapshot: ResourceSnapshot,
    pub duration: Interval,
}

/// One formula + currency + VAT combination belonging to a [`PricingPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPlanComponent {
    pub name: String,
    pub formula: String,
    pub currency_code: String,
    pub vat_code: String,
}

/// A versioned pricing plan row. `valid_for` is derived, never stored — see
/// [`crate::validity::effective_window`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub plan_guid: String,
    pub valid_from: DateTime<Utc>,
    pub name: String,
    pub components: Vec<PricingPlanComponent>,
}

/// A versioned VAT rate row, keyed by `code`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VatRateRow {
    pub rate: Decimal,
    pub valid_from: DateTime<Utc>,
}

/// A versioned currency conversion rate row, keyed by `code`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRateRow {
    pub rate: Decimal,
    pub valid_from: DateTime<Utc>,
}

/// A priced, time-clipped sub-window over which plan, VAT, and currency
/// were all constant (§3 `PriceComponent`, §GLOSSARY "Slice").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComponent {
    pub name: String,
    pub plan_name: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub vat_rate: Decimal,
    pub vat_code: String,
    pub currency_code: String,
    pub currency_rate: Decimal,
    pub ex_vat: String,
    pub inc_vat: String,
}

/// The summed price of a [`BillableEvent`], ex- and inc-VAT, with the
/// contributing [`PriceComponent`]s for traceability (§3 invariant 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub ex_vat: String,
    pub inc_vat: String,
    pub details: Vec<PriceComponent>,
}

/// A priced, time-clipped slice of a resource's existence (§GLOSSARY).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillableEvent {
    pub event_guid: String,
    pub event_start: DateTime<Utc>,
    pub event_stop: DateTime<Utc>,
    pub resource_guid: String,
    pub resource_name: String,
    pub resource_type: ResourceType,
    pub org_guid: String,
    pub space_guid: String,
    pub plan_guid: String,
    pub number_of_nodes: i64,
    pub memory_in_mb: i64,
    pub storage_in_mb: i64,
    pub price: Price,
}
