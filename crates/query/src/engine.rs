//! Ties the raw event store (C3), the interval reconstructor (C4), and the
//! pricing slicer (C5) into the billable-event query surface (C6, §4.6).

use std::collections::HashMap;
use std::sync::Arc;

use futures::{stream, Stream, StreamExt};
use model::{BillableEvent, EventKind, ResourceInterval};
use reconstructor::{ComposeCorrelator, Reconstructor};
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use thiserror::Error;

use crate::cancellation::Cancellation;
use crate::filter::{Filter, GroupBy, GroupKey};

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad filter: {0}")]
    BadFilter(String),
    #[error(transparent)]
    Pricing(#[from] pricing::Error),
    #[error(transparent)]
    Reconstruction(#[from] reconstructor::Error),
    #[error(transparent)]
    RawEvents(#[from] eventstore::raw::Error),
    #[error(transparent)]
    Config(#[from] eventstore::config::Error),
    #[error("unauthorised: {0}")]
    Unauthorised(String),
    #[error("query cancelled")]
    Cancelled,
}

/// Reads raw events and pricing configuration from Postgres and answers
/// billable-event queries. One instance is cheap to clone and share across
/// concurrent requests (§5 "parallel-request").
#[derive(Clone)]
pub struct QueryEngine {
    pool: PgPool,
    raw_events: eventstore::RawEventStore,
    compose_correlator: Option<Arc<dyn ComposeCorrelator + Send + Sync>>,
    correlation_policy: reconstructor::compose::CorrelationPolicy,
}

impl QueryEngine {
    pub fn new(pool: PgPool) -> Self {
        Self {
            raw_events: eventstore::RawEventStore::new(pool.clone()),
            pool,
            compose_correlator: None,
            correlation_policy: reconstructor::compose::CorrelationPolicy::default(),
        }
    }

    /// Supplies the account→resource correlation compose audit events need
    /// (§9 "the mapping ... is speculative"). Without one, compose events
    /// are reconstructed as ordinary tasks with no plan correlation applied.
    pub fn with_compose_correlator(
        mut self,
        correlator: Arc<dyn ComposeCorrelator + Send + Sync>,
        policy: reconstructor::compose::CorrelationPolicy,
    ) -> Self {
        self.compose_correlator = Some(correlator);
        self.correlation_policy = policy;
        self
    }

    async fn reconstruct(&self, filter: &Filter) -> Result<Vec<ResourceInterval>, Error> {
        let mut reconstructor = Reconstructor::new();

        for kind in [EventKind::App, EventKind::Service] {
            let mut events = Box::pin(self.raw_events.scan(kind, None));
            while let Some(event) = events.next().await {
                reconstructor.ingest(&event?)?;
            }
        }

        if let Some(correlator) = &self.compose_correlator {
            let mut events = Box::pin(self.raw_events.scan(EventKind::Compose, None));
            while let Some(event) = events.next().await {
                reconstructor.ingest_compose(&event?, correlator.as_ref(), self.correlation_policy)?;
            }
        }

        Ok(reconstructor.finish(chrono::Utc::now(), filter.range_stop))
    }

    async fn price(&self, intervals: &[ResourceInterval], filter: &Filter) -> Result<Vec<BillableEvent>, Error> {
        let snapshot = eventstore::load_snapshot(&self.pool).await?;
        let range = filter.range();

        let mut events = Vec::new();
        for interval in intervals.iter().filter(|i| filter.admits_interval(i)) {
            let priced = pricing::slice(
                interval,
                range,
                &snapshot.plans,
                &snapshot.vat_rates,
                &snapshot.currency_rates,
            )?;
            events.extend(priced.into_iter().filter(|e| filter.admits_event(e)));
        }
        events.sort_by(|a, b| {
            a.event_start
                .cmp(&b.event_start)
                .then(a.resource_guid.cmp(&b.resource_guid))
                .then(a.plan_guid.cmp(&b.plan_guid))
        });
        Ok(events)
    }

    /// `get_billable_events` (§4.6): the materialised list of billable
    /// events in `filter`'s range, reconstructed from storage.
    pub async fn get_billable_events(&self, filter: &Filter) -> Result<Vec<BillableEvent>, Error> {
        filter.validate()?;
        let intervals = self.reconstruct(filter).await?;
        self.price(&intervals, filter).await
    }

    /// `simulate` (§4.6): as [`Self::get_billable_events`], but the
    /// intervals come from the caller rather than from reconstructed
    /// storage — used for forecasting hypothetical deployments.
    pub async fn simulate(
        &self,
        filter: &Filter,
        synthetic_intervals: &[ResourceInterval],
    ) -> Result<Vec<BillableEvent>, Error> {
        filter.validate()?;
        self.price(synthetic_intervals, filter).await
    }

    /// `stream_billable_events` (§4.6): a restartable lazy sequence
    /// delivering the same rows, in the same order, as
    /// [`Self::get_billable_events`], terminating with
    /// [`Error::Cancelled`] as its final item if `cancellation` fires
    /// mid-stream (§5 "the lazy sequence terminates with `Cancelled`") —
    /// already-emitted rows are not retracted, but the caller always learns
    /// the stream stopped early rather than seeing a silently short list.
    pub fn stream_billable_events(
        &self,
        filter: Filter,
        cancellation: Cancellation,
    ) -> impl Stream<Item = Result<BillableEvent, Error>> + '_ {
        let engine = self.clone();
        let inner = stream::once(async move { engine.get_billable_events(&filter).await })
            .flat_map(|result| match result {
                Ok(events) => stream::iter(events.into_iter().map(Ok)).left_stream(),
                Err(err) => stream::once(async move { Err(err) }).right_stream(),
            });

        stream::unfold(Some((Box::pin(inner), cancellation)), |state| async move {
            let (mut inner, cancellation) = state?;
            if cancellation.is_cancelled() {
                return Some((Err(Error::Cancelled), None));
            }
            let item = inner.next().await?;
            Some((item, Some((inner, cancellation))))
        })
    }

    /// `get_usage_totals` (§4.6): sum of `price.inc_vat × 100` as integer
    /// pence, grouped by `group_by`. Rows are sorted by group key for
    /// deterministic output.
    pub async fn get_usage_totals(
        &self,
        filter: &Filter,
        group_by: GroupBy,
    ) -> Result<Vec<(GroupKey, i64)>, Error> {
        let events = self.get_billable_events(filter).await?;
        let mut totals: HashMap<GroupKey, i64> = HashMap::new();
        for event in &events {
            let pence = price_pence(&event.price.inc_vat);
            *totals.entry(GroupKey::of(event, group_by)).or_insert(0) += pence;
        }
        let mut rows: Vec<(GroupKey, i64)> = totals.into_iter().collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rows)
    }
}

fn price_pence(value: &str) -> i64 {
    value
        .parse::<rust_decimal::Decimal>()
        .ok()
        .and_then(|d| (d * rust_decimal::Decimal::from(100)).round().to_i64())
        .unwrap_or(0)
}
