//! End-to-end scenarios for the pricing slicer, one per case in the
//! specification's testable-properties section. Each test builds a single
//! reconstructed [`ResourceInterval`] and configuration snapshot by hand and
//! asserts on the resulting [`BillableEvent`]s.

use chrono::{DateTime, Utc};
use model::{
    Interval, PricingPlan, PricingPlanComponent, ResourceInterval, ResourceSnapshot, ResourceType,
};
use pricing::Keyed;
use rust_decimal_macros::dec;

fn t(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").unwrap().and_utc()
}

fn snapshot() -> ResourceSnapshot {
    ResourceSnapshot {
        resource_name: "my-app".into(),
        resource_type: ResourceType::App,
        org_guid: "org-1".into(),
        space_guid: "space-1".into(),
        plan_guid: "plan-1".into(),
        number_of_nodes: 1,
        memory_in_mb: 512,
        storage_in_mb: 0,
    }
}

fn interval(start: &str, stop: &str) -> ResourceInterval {
    ResourceInterval {
        resource_guid: "resource-1".into(),
        snapshot: snapshot(),
        duration: Interval::bounded(t(start), t(stop)).unwrap(),
    }
}

fn plan(valid_from: &str, formula: &str) -> PricingPlan {
    PricingPlan {
        plan_guid: "plan-1".into(),
        valid_from: t(valid_from),
        name: "compute".into(),
        components: vec![PricingPlanComponent {
            name: "compute".into(),
            formula: formula.into(),
            currency_code: "GBP".into(),
            vat_code: "standard".into(),
        }],
    }
}

fn vat(valid_from: &str, rate: rust_decimal::Decimal) -> Keyed<model::VatRateRow> {
    Keyed {
        key: "standard".into(),
        valid_from: t(valid_from),
        row: model::VatRateRow {
            rate,
            valid_from: t(valid_from),
        },
    }
}

fn currency(valid_from: &str, rate: rust_decimal::Decimal) -> Keyed<model::CurrencyRateRow> {
    Keyed {
        key: "GBP".into(),
        valid_from: t(valid_from),
        row: model::CurrencyRateRow {
            rate,
            valid_from: t(valid_from),
        },
    }
}

#[test]
fn scenario_1_simple_app_one_hour() {
    let i = interval("2001-01-01T00:00:00Z", "2001-01-01T01:00:00Z");
    let plans = vec![plan("2000-01-01T00:00:00Z", "ceil($time_in_seconds/3600) * 0.01")];
    let vats = vec![vat("2000-01-01T00:00:00Z", dec!(0.2))];
    let currencies = vec![currency("2000-01-01T00:00:00Z", dec!(1))];

    let events = pricing::slice(&i, Interval::everything(), &plans, &vats, &currencies).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].price.ex_vat, "0.01");
    assert_eq!(events[0].price.inc_vat, "0.012");
}

#[test]
fn scenario_2_scale_mid_flight() {
    let mut first = interval("2001-01-01T00:00:00Z", "2001-01-01T01:00:00Z");
    let mut second = interval("2001-01-01T01:00:00Z", "2001-01-01T02:00:00Z");
    second.snapshot.number_of_nodes = 2;
    first.resource_guid = "resource-1".into();
    second.resource_guid = "resource-1".into();

    let plans = vec![plan("2000-01-01T00:00:00Z", "ceil($time_in_seconds/3600) * 0.01")];
    let vats = vec![vat("2000-01-01T00:00:00Z", dec!(0.2))];
    let currencies = vec![currency("2000-01-01T00:00:00Z", dec!(1))];

    let mut events = pricing::slice(&first, Interval::everything(), &plans, &vats, &currencies).unwrap();
    events.extend(
        pricing::slice(&second, Interval::everything(), &plans, &vats, &currencies).unwrap(),
    );

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].number_of_nodes, 1);
    assert_eq!(events[1].number_of_nodes, 2);
    for e in &events {
        assert_eq!(e.event_stop - e.event_start, chrono::Duration::hours(1));
    }
}

#[test]
fn scenario_4_plan_change_mid_interval() {
    let i = interval("2017-01-01T00:00:00Z", "2017-03-01T00:00:00Z");
    let plans = vec![
        plan("2017-01-01T00:00:00Z", "1"),
        plan("2017-02-01T00:00:00Z", "33"),
    ];
    let vats = vec![vat("2017-01-01T00:00:00Z", dec!(0.2))];
    let currencies = vec![currency("2017-01-01T00:00:00Z", dec!(1))];

    let events = pricing::slice(&i, Interval::everything(), &plans, &vats, &currencies).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].price.details.len(), 2);
    assert_eq!(events[0].price.details[0].ex_vat, "1");
    assert_eq!(events[0].price.details[1].ex_vat, "33");
    assert_eq!(events[0].price.ex_vat, "34");
    assert_eq!(events[0].price.inc_vat, "40.8");
}

#[test]
fn scenario_5_vat_change_mid_interval() {
    let i = interval("2017-01-01T00:00:00Z", "2017-03-01T00:00:00Z");
    let plans = vec![plan("2017-01-01T00:00:00Z", "1")];
    let vats = vec![
        vat("2017-01-01T00:00:00Z", dec!(0.2)),
        vat("2017-02-01T00:00:00Z", dec!(0)),
    ];
    let currencies = vec![currency("2017-01-01T00:00:00Z", dec!(1))];

    let events = pricing::slice(&i, Interval::everything(), &plans, &vats, &currencies).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].price.details.len(), 2);
    assert_eq!(events[0].price.ex_vat, "2");
    assert_eq!(events[0].price.inc_vat, "2.2");
}

#[test]
fn scenario_6_four_way_partition() {
    let i = interval("2017-01-01T00:00:00Z", "2017-05-01T00:00:00Z");
    let plans = vec![plan("2017-01-01T00:00:00Z", "1")];
    let vats = vec![
        vat("2017-01-01T00:00:00Z", dec!(0.2)),
        vat("2017-03-01T00:00:00Z", dec!(0)),
    ];
    let currencies = vec![
        currency("2000-01-01T00:00:00Z", dec!(1)),
        currency("2017-02-01T00:00:00Z", dec!(2)),
        currency("2017-04-01T00:00:00Z", dec!(4)),
    ];

    let events = pricing::slice(&i, Interval::everything(), &plans, &vats, &currencies).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].price.details.len(), 4);
    assert_eq!(events[0].price.ex_vat, "9");
    assert_eq!(events[0].price.inc_vat, "9.6");
}

#[test]
fn scenario_7_sub_penny_floor() {
    let i = interval("2001-01-01T00:00:00Z", "2001-01-01T00:00:01Z");
    let plans = vec![plan("2000-01-01T00:00:00Z", "0.0000000001")];
    let vats = vec![vat("2000-01-01T00:00:00Z", dec!(0.2))];
    let currencies = vec![currency("2000-01-01T00:00:00Z", dec!(1))];

    let events = pricing::slice(&i, Interval::everything(), &plans, &vats, &currencies).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].price.ex_vat, "0.01");
    assert_eq!(events[0].price.inc_vat, "0.012");
}

#[test]
fn range_clipping_never_exceeds_query_range() {
    let i = interval("2001-01-01T00:00:00Z", "2001-01-01T02:00:00Z");
    let plans = vec![plan("2000-01-01T00:00:00Z", "1")];
    let vats = vec![vat("2000-01-01T00:00:00Z", dec!(0.2))];
    let currencies = vec![currency("2000-01-01T00:00:00Z", dec!(1))];
    let range = Interval::bounded(t("2001-01-01T00:30:00Z"), t("2001-01-01T01:00:00Z")).unwrap();

    let events = pricing::slice(&i, range, &plans, &vats, &currencies).unwrap();

    assert_eq!(events.len(), 1);
    assert!(events[0].event_start >= range.lo().as_instant().unwrap());
    assert!(events[0].event_stop <= range.hi().as_instant().unwrap());
}

#[test]
fn no_pricing_plan_fails_the_whole_slice() {
    let i = interval("2001-01-01T00:00:00Z", "2001-01-01T01:00:00Z");
    let plans: Vec<PricingPlan> = vec![];
    let vats = vec![vat("2000-01-01T00:00:00Z", dec!(0.2))];
    let currencies = vec![currency("2000-01-01T00:00:00Z", dec!(1))];

    let err = pricing::slice(&i, Interval::everything(), &plans, &vats, &currencies).unwrap_err();
    assert!(matches!(err, pricing::Error::NoPricingPlan { .. }));
}
