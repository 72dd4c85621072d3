use std::time::Duration;

use clap::Parser;
use collector::{RunLoop, UpstreamEventFetcher};
use eventstore::RawEventStore;
use shared::arguments::CollectorArguments;

const FETCH_LIMIT: usize = 5000;
const RECORD_MIN_AGE: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let args = CollectorArguments::parse();
    shared::tracing_setup::initialize(&args.common.logging.log_filter);

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(args.common.db_pool_max_connections)
        .connect(args.common.db_url.as_str())
        .await
        .expect("failed to connect to database");
    eventstore::MIGRATOR.run(&pool).await.expect("failed to run migrations");

    let store = RawEventStore::new(pool);
    let client = reqwest::Client::new();

    let run_loops = vec![
        RunLoop {
            fetcher: Box::new(UpstreamEventFetcher::app_usage_events(client.clone(), args.upstream_url.clone(), store.clone())),
            fetch_limit: FETCH_LIMIT,
            record_min_age: RECORD_MIN_AGE,
            poll_interval: args.poll_interval_seconds,
        },
        RunLoop {
            fetcher: Box::new(UpstreamEventFetcher::service_usage_events(client.clone(), args.upstream_url.clone(), store.clone())),
            fetch_limit: FETCH_LIMIT,
            record_min_age: RECORD_MIN_AGE,
            poll_interval: args.poll_interval_seconds,
        },
        RunLoop {
            fetcher: Box::new(UpstreamEventFetcher::compose_audit_events(client, args.upstream_url, store)),
            fetch_limit: FETCH_LIMIT,
            record_min_age: RECORD_MIN_AGE,
            poll_interval: args.poll_interval_seconds,
        },
    ];

    let tasks: Vec<_> = run_loops
        .into_iter()
        .map(|run_loop| tokio::spawn(async move { run_loop.run_forever().await }))
        .collect();

    futures::future::join_all(tasks).await;
}
