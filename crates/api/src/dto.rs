//! Response/request bodies the handlers serialize or deserialize. Kept
//! separate from `model`'s domain types since these are wire shapes, not
//! the pipeline's internal representation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct TotalsRow {
    pub org_guid: Option<String>,
    pub space_guid: Option<String>,
    pub resource_guid: Option<String>,
    pub price_in_pence: i64,
}

#[derive(Debug, Serialize)]
pub struct ComponentEvent {
    pub resource_guid: String,
    pub plan_name: String,
    pub component_name: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub vat_code: String,
    pub vat_rate: Decimal,
    pub currency_code: String,
    pub currency_rate: Decimal,
    pub ex_vat: String,
    pub inc_vat: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceReport {
    pub name: String,
    pub space_guid: String,
    pub plan_guid: String,
    pub plan_name: String,
    pub duration_seconds: i64,
    pub price_in_pence: i64,
}

#[derive(Debug, Serialize)]
pub struct SpaceReport {
    pub space_guid: String,
    pub price_in_pence: i64,
    pub resources: Vec<ResourceReport>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub org_guid: String,
    pub price_in_pence: i64,
    pub spaces: Vec<SpaceReport>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub events: Vec<SimulatedEvent>,
}

#[derive(Debug, Deserialize)]
pub struct SimulatedEvent {
    pub name: String,
    pub space_guid: String,
    pub plan_guid: String,
    pub memory_in_mb: i64,
}

pub fn price_pence(value: &str) -> i64 {
    use rust_decimal::prelude::ToPrimitive;
    value
        .parse::<Decimal>()
        .ok()
        .and_then(|d| (d * Decimal::from(100)).round().to_i64())
        .unwrap_or(0)
}
