use clap::Parser;
use shared::arguments::ApiArguments;

#[tokio::main]
async fn main() {
    let args = ApiArguments::parse();
    shared::tracing_setup::initialize(&args.common.logging.log_filter);

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(args.common.db_pool_max_connections)
        .connect(args.common.db_url.as_str())
        .await
        .expect("failed to connect to database");
    eventstore::MIGRATOR.run(&pool).await.expect("failed to run migrations");

    let state = api::AppState {
        engine: query::QueryEngine::new(pool),
        http: reqwest::Client::new(),
        introspection_url: args.introspection_url,
    };

    let router = api::router(state);
    let listener = tokio::net::TcpListener::bind(args.bind_address)
        .await
        .expect("failed to bind HTTP listener");
    tracing::info!(address = %args.bind_address, "billing-api listening");
    axum::serve(listener, router).await.expect("HTTP server failed");
}
