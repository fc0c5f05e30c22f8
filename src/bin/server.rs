//! The backend relay server: forwards requests from the mobile app to the
//! Plaid financial-data API.

use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use budget_tracker_rs::{
    AppState, build_router, graceful_shutdown,
    relay::{PlaidClient, PlaidEnvironment, create_access_token_table},
};

/// The backend relay server for the budget tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the relay's SQLite database.
    #[arg(long, default_value = "relay.db")]
    db_path: String,

    /// The Plaid environment to forward requests to: sandbox, development or
    /// production.
    #[arg(long, default_value_t = PlaidEnvironment::Sandbox)]
    plaid_env: PlaidEnvironment,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let client_id = env::var("PLAID_CLIENT_ID")
        .expect("The environment variable 'PLAID_CLIENT_ID' must be set");
    let secret =
        env::var("PLAID_SECRET").expect("The environment variable 'PLAID_SECRET' must be set");

    let plaid_client = PlaidClient::new(args.plaid_env, client_id, secret)
        .expect("Could not create the upstream API client");

    let connection = Connection::open(&args.db_path).expect("Could not open the database");
    create_access_token_table(&connection).expect("Could not initialize the database");

    let state = AppState::new(plaid_client, Arc::new(Mutex::new(connection)));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!(
        "HTTP server listening on {addr} (Plaid environment: {})",
        args.plaid_env
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
