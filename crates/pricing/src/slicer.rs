//! The pricing slicer (C5, §4.5): crosses a reconstructed resource interval
//! against overlapping plan/VAT/currency validity windows and materialises
//! priced, time-clipped [`BillableEvent`]s.

use chrono::{DateTime, Utc};
use model::{
    Bound, BillableEvent, CurrencyRateRow, Interval, Price, PriceComponent, PricingPlan,
    ResourceInterval, VatRateRow,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::formula::{self, Variables};
use crate::money::{floor_to_min_billable, format_price};

#[derive(Debug, Error)]
pub enum Error {
    #[error("no pricing plan found for plan {plan_guid} at {at}")]
    NoPricingPlan { plan_guid: String, at: DateTime<Utc> },
    #[error(transparent)]
    Formula(#[from] formula::Error),
}

/// One versioned row plus the key it was stored under, as read from
/// configuration storage (keys repeat across `valid_from` versions).
#[derive(Debug, Clone)]
pub struct Keyed<T> {
    pub key: String,
    pub valid_from: DateTime<Utc>,
    pub row: T,
}

fn windows_for_key<'a, T>(rows: &'a [Keyed<T>], key: &str) -> Vec<(&'a T, Interval)> {
    let filtered: Vec<(DateTime<Utc>, &T)> = rows
        .iter()
        .filter(|r| r.key == key)
        .map(|r| (r.valid_from, &r.row))
        .collect();
    model::validity::windows_for(&filtered)
        .into_iter()
        .map(|(r, w)| (*r, w))
        .collect()
}

/// Slices one reconstructed interval against the query range and the
/// current configuration snapshot, returning the billable events it
/// produces (zero or more — §3 invariant 2).
pub fn slice(
    interval: &ResourceInterval,
    range: Interval,
    plans: &[PricingPlan],
    vat_rates: &[Keyed<VatRateRow>],
    currency_rates: &[Keyed<CurrencyRateRow>],
) -> Result<Vec<BillableEvent>, Error> {
    let Some(base_window) = interval.duration.intersect(&range) else {
        return Ok(Vec::new());
    };

    let plan_rows: Vec<Keyed<&PricingPlan>> = plans
        .iter()
        .filter(|p| p.plan_guid == interval.snapshot.plan_guid)
        .map(|p| Keyed {
            key: p.plan_guid.clone(),
            valid_from: p.valid_from,
            row: p,
        })
        .collect();
    let plan_windows = windows_for_key(&plan_rows, &interval.snapshot.plan_guid);

    let applicable: Vec<(&PricingPlan, Interval)> = plan_windows
        .into_iter()
        .filter_map(|(p, valid_for)| valid_for.intersect(&base_window).map(|wp| (*p, wp)))
        .collect();

    if applicable.is_empty() {
        return Err(Error::NoPricingPlan {
            plan_guid: interval.snapshot.plan_guid.clone(),
            at: base_window
                .lo()
                .as_instant()
                .unwrap_or_else(|| base_window.hi().as_instant().unwrap()),
        });
    }

    // One BillableEvent per ResourceInterval-vs-range intersection (§8
    // scenarios 4-6): a plan/VAT/currency change mid-interval subdivides
    // `details`, not the event itself.
    let mut details = Vec::new();
    for (plan, wp) in applicable {
        details.extend(price_components_for_plan_window(
            interval,
            plan,
            wp,
            vat_rates,
            currency_rates,
        )?);
    }
    details.sort_by_key(|d| d.start);

    let total_ex_vat: Decimal = details
        .iter()
        .map(|d| d.ex_vat.parse::<Decimal>().unwrap())
        .sum();
    let total_inc_vat: Decimal = details
        .iter()
        .map(|d| d.inc_vat.parse::<Decimal>().unwrap())
        .sum();

    let start = base_window.lo().as_instant().expect("finite: intersected with a finite range");
    let stop = base_window.hi().as_instant().expect("finite: intersected with a finite range");

    Ok(vec![BillableEvent {
        event_guid: format!("{}:{}", interval.resource_guid, start.to_rfc3339()),
        event_start: start,
        event_stop: stop,
        resource_guid: interval.resource_guid.clone(),
        resource_name: interval.snapshot.resource_name.clone(),
        resource_type: interval.snapshot.resource_type,
        org_guid: interval.snapshot.org_guid.clone(),
        space_guid: interval.snapshot.space_guid.clone(),
        plan_guid: interval.snapshot.plan_guid.clone(),
        number_of_nodes: interval.snapshot.number_of_nodes,
        memory_in_mb: interval.snapshot.memory_in_mb,
        storage_in_mb: interval.snapshot.storage_in_mb,
        price: Price {
            ex_vat: format_price(total_ex_vat),
            inc_vat: format_price(total_inc_vat),
            details,
        },
    }])
}

fn price_components_for_plan_window(
    interval: &ResourceInterval,
    plan: &PricingPlan,
    wp: Interval,
    vat_rates: &[Keyed<VatRateRow>],
    currency_rates: &[Keyed<CurrencyRateRow>],
) -> Result<Vec<PriceComponent>, Error> {
    let mut details: Vec<PriceComponent> = Vec::new();

    for component in &plan.components {
        let vat_windows = windows_for_key(vat_rates, &component.vat_code);
        let currency_windows = windows_for_key(currency_rates, &component.currency_code);

        let mut cuts: Vec<Bound> = Vec::new();
        for (_, w) in &vat_windows {
            cuts.push(w.lo());
            cuts.push(w.hi());
        }
        for (_, w) in &currency_windows {
            cuts.push(w.lo());
            cuts.push(w.hi());
        }

        for slice_window in model::partition_at(wp, cuts) {
            let vat = vat_windows
                .iter()
                .find(|(_, w)| slice_window.is_subset_of(w))
                .map(|(row, _)| **row);
            let currency = currency_windows
                .iter()
                .find(|(_, w)| slice_window.is_subset_of(w))
                .map(|(row, _)| **row);

            let (Some(vat), Some(currency)) = (vat, currency) else {
                // No configured VAT/currency rate covers this slice: treat
                // as a gap in configuration, not a billable component.
                continue;
            };

            let time_in_seconds = slice_window
                .duration_seconds()
                .expect("slice windows are always finite: derived from a finite base_window");

            let vars = Variables {
                time_in_seconds,
                memory_in_mb: Decimal::from(interval.snapshot.memory_in_mb),
                number_of_nodes: Decimal::from(interval.snapshot.number_of_nodes),
                storage_in_mb: Decimal::from(interval.snapshot.storage_in_mb),
            };

            let mut ex_vat = formula::eval(&component.formula, &vars)?;
            ex_vat *= currency.rate;
            ex_vat = floor_to_min_billable(ex_vat);
            let inc_vat = ex_vat * (Decimal::ONE + vat.rate);

            details.push(PriceComponent {
                name: component.name.clone(),
                plan_name: plan.name.clone(),
                start: slice_window
                    .lo()
                    .as_instant()
                    .expect("finite: derived from a finite base_window"),
                stop: slice_window
                    .hi()
                    .as_instant()
                    .expect("finite: derived from a finite base_window"),
                vat_rate: vat.rate,
                vat_code: component.vat_code.clone(),
                currency_code: component.currency_code.clone(),
                currency_rate: currency.rate,
                ex_vat: format_price(ex_vat),
                inc_vat: format_price(inc_vat),
            });
        }
    }

    Ok(details)
}
