//! Loads the pricing configuration snapshot (plans, VAT rates, currency
//! rates) the pricing slicer (C5) needs. Configuration tables are replaced
//! atomically by a privileged admin path not covered here; this module only
//! reads a coherent snapshot inside the caller's transaction (§5).

use chrono::{DateTime, Utc};
use model::{PricingPlan, PricingPlanComponent};
use pricing::Keyed;
use sqlx::PgExecutor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

/// A coherent read of every versioned configuration row (§3 "Lifecycle").
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    pub plans: Vec<PricingPlan>,
    pub vat_rates: Vec<Keyed<model::VatRateRow>>,
    pub currency_rates: Vec<Keyed<model::CurrencyRateRow>>,
}

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: i64,
    plan_guid: String,
    valid_from: DateTime<Utc>,
    name: String,
}

#[derive(sqlx::FromRow)]
struct ComponentRow {
    plan_id: i64,
    name: String,
    formula: String,
    currency_code: String,
    vat_code: String,
}

#[derive(sqlx::FromRow)]
struct RateRow {
    code: String,
    rate: rust_decimal::Decimal,
    valid_from: DateTime<Utc>,
}

/// Reads the current `pricing_plans`/`pricing_plan_components`/`vat_rates`/
/// `currency_rates` tables into an in-memory snapshot, using `executor` so
/// callers can pass either a pool or an open transaction (§5
/// "REPEATABLE READ").
pub async fn load_snapshot<'e>(executor: impl PgExecutor<'e> + Copy) -> Result<ConfigSnapshot, Error> {
    let plan_rows: Vec<PlanRow> =
        sqlx::query_as("select id, plan_guid, valid_from, name from pricing_plans")
            .fetch_all(executor)
            .await?;
    let component_rows: Vec<ComponentRow> = sqlx::query_as(
        "select plan_id, name, formula, currency_code, vat_code from pricing_plan_components",
    )
    .fetch_all(executor)
    .await?;
    let vat_rows: Vec<RateRow> = sqlx::query_as("select code, rate, valid_from from vat_rates")
        .fetch_all(executor)
        .await?;
    let currency_rows: Vec<RateRow> =
        sqlx::query_as("select code, rate, valid_from from currency_rates")
            .fetch_all(executor)
            .await?;

    let plans = plan_rows
        .into_iter()
        .map(|plan| {
            let components = component_rows
                .iter()
                .filter(|c| c.plan_id == plan.id)
                .map(|c| PricingPlanComponent {
                    name: c.name.clone(),
                    formula: c.formula.clone(),
                    currency_code: c.currency_code.clone(),
                    vat_code: c.vat_code.clone(),
                })
                .collect();
            PricingPlan {
                plan_guid: plan.plan_guid,
                valid_from: plan.valid_from,
                name: plan.name,
                components,
            }
        })
        .collect();

    let vat_rates = vat_rows
        .into_iter()
        .map(|r| Keyed {
            key: r.code,
            valid_from: r.valid_from,
            row: model::VatRateRow {
                rate: r.rate,
                valid_from: r.valid_from,
            },
        })
        .collect();

    let currency_rates = currency_rows
        .into_iter()
        .map(|r| Keyed {
            key: r.code,
            valid_from: r.valid_from,
            row: model::CurrencyRateRow {
                rate: r.rate,
                valid_from: r.valid_from,
            },
        })
        .collect();

    Ok(ConfigSnapshot {
        plans,
        vat_rates,
        currency_rates,
    })
}
