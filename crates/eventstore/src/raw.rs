//! The append-only raw event store (C3, §4.3). Two kinds of platform
//! lifecycle events plus managed-database audit events, each in its own
//! table with the same `{guid, created_at, raw_message}` shape (§6).

use chrono::{DateTime, Utc};
use futures::{stream, Stream, StreamExt};
use model::{EventKind, RawEvent};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

/// A `(created_at, event_guid)` keyset cursor: the position [`RawEventStore::scan`]
/// resumes from. `None` scans from the start of the table.
pub type ScanCursor = Option<(DateTime<Utc>, String)>;

const PAGE_SIZE: i64 = 1000;

fn table_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::App => "app_usage_events",
        EventKind::Service => "service_usage_events",
        EventKind::Compose => "compose_audit_events",
    }
}

/// Append-only store over the three raw event tables.
#[derive(Clone)]
pub struct RawEventStore {
    pool: PgPool,
}

impl RawEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts `events`, idempotent on `event_guid` (§4.3, §8 "Idempotence").
    pub async fn insert(&self, kind: EventKind, events: &[RawEvent]) -> Result<(), Error> {
        if events.is_empty() {
            return Ok(());
        }
        let table = table_name(kind);
        let mut tx = self.pool.begin().await?;
        for event in events {
            let query = format!(
                "insert into {table} (guid, created_at, raw_message) values ($1, $2, $3) \
                 on conflict (guid) do nothing"
            );
            sqlx::query(&query)
                .bind(&event.event_guid)
                .bind(event.created_at)
                .bind(&event.raw_message)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Fetches at most one page of events of `kind`, strictly after `cursor`
    /// in `(created_at, guid)` order, and the cursor to resume from.
    async fn scan_page(
        &self,
        kind: EventKind,
        cursor: &ScanCursor,
    ) -> Result<(Vec<RawEvent>, ScanCursor), Error> {
        let table = table_name(kind);
        let query = format!(
            "select guid, created_at, raw_message from {table} \
             where $1::timestamptz is null \
                or (created_at, guid) > (coalesce($1, created_at), coalesce($2, '')) \
             order by created_at, guid \
             limit $3"
        );
        let rows: Vec<Row> = sqlx::query_as(&query)
            .bind(cursor.as_ref().map(|(t, _)| *t))
            .bind(cursor.as_ref().map(|(_, g)| g.clone()))
            .bind(PAGE_SIZE)
            .fetch_all(&self.pool)
            .await?;

        let next_cursor = rows.last().map(|r| (r.created_at, r.guid.clone()));
        let events = rows
            .into_iter()
            .map(|r| RawEvent {
                event_guid: r.guid,
                created_at: r.created_at,
                kind,
                raw_message: r.raw_message,
            })
            .collect();
        Ok((events, next_cursor))
    }

    /// Streams events of `kind` in `(created_at, guid)` order, starting
    /// strictly after `since`, to exhaustion of the current snapshot.
    /// Backed by keyset pagination, not `OFFSET`, so the reconstructor (C4)
    /// can hold the stream open with bounded per-resource memory (§9).
    pub fn scan(&self, kind: EventKind, since: ScanCursor) -> impl Stream<Item = Result<RawEvent, Error>> + '_ {
        stream::unfold(Some(since), move |state| async move {
            let cursor = state?;
            match self.scan_page(kind, &cursor).await {
                Ok((events, _)) if events.is_empty() => None,
                Ok((events, next_cursor)) => Some((Ok(events), Some(next_cursor))),
                Err(err) => Some((Err(err), None)),
            }
        })
        .flat_map(|page| match page {
            Ok(events) => stream::iter(events.into_iter().map(Ok)).left_stream(),
            Err(err) => stream::once(async { Err(err) }).right_stream(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct Row {
    guid: String,
    created_at: DateTime<Utc>,
    raw_message: serde_json::Value,
}
