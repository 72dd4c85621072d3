//! Command line arguments shared between the `billing-api` and
//! `billing-collector` binaries (C0).

use std::{net::SocketAddr, time::Duration};

use url::Url;

#[macro_export]
macro_rules! logging_args_with_default_filter {
    ($struct_name:ident, $default_filter:literal) => {
        #[derive(Debug, clap::Parser)]
        pub struct $struct_name {
            /// The tracing-subscriber `EnvFilter` string controlling log verbosity.
            #[clap(long, env, default_value = $default_filter)]
            pub log_filter: String,
        }
    };
}

logging_args_with_default_filter!(LoggingArguments, "warn,billing_api=debug,billing_collector=debug,query=debug,reconstructor=debug,pricing=debug");

/// Arguments shared by every binary that talks to the configuration/raw
/// event store (§6 "Environment").
#[derive(Debug, clap::Parser)]
#[group(skip)]
pub struct CommonArguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Postgres connection string for the raw event store and configuration
    /// tables.
    #[clap(long, env)]
    pub db_url: Url,

    /// Maximum number of connections held open in the database pool.
    #[clap(long, env, default_value = "20")]
    pub db_pool_max_connections: u32,
}

/// Arguments specific to `billing-api` (§4.8, §6).
#[derive(Debug, clap::Parser)]
pub struct ApiArguments {
    #[clap(flatten)]
    pub common: CommonArguments,

    /// Address the HTTP server binds to.
    #[clap(long, env, default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// URL of the OAuth introspection endpoint backing the `Authorizer`
    /// capability (§4.7, §6).
    #[clap(long, env)]
    pub introspection_url: Url,
}

/// Arguments specific to `billing-collector` (§4.3, §5).
#[derive(Debug, clap::Parser)]
pub struct CollectorArguments {
    #[clap(flatten)]
    pub common: CommonArguments,

    /// Base URL of the upstream platform API the collector polls for raw
    /// events.
    #[clap(long, env)]
    pub upstream_url: Url,

    /// Delay between successive polls of a single event kind's upstream
    /// endpoint, once the upstream has been drained (§5 "rate-limited
    /// externally").
    #[clap(long, env, default_value = "10", value_parser = duration_from_seconds)]
    pub poll_interval_seconds: Duration,
}

fn duration_from_seconds(s: &str) -> Result<Duration, std::num::ParseIntError> {
    s.parse().map(Duration::from_secs)
}
