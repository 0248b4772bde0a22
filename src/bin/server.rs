use std::{env, fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerline::{
    AppState, ClerkClient, build_router, config, cors_layer, get_timezone, graceful_shutdown,
    logging_middleware, open_connection,
};

/// The environment variable holding the identity provider's secret key.
const IDENTITY_PROVIDER_SECRET_KEY: &str = "IDENTITY_PROVIDER_SECRET_KEY";

/// The REST API server for ledgerline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// The canonical name of the timezone used to decide calendar days, e.g. "Pacific/Auckland".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = config::DEFAULT_TIMEZONE)]
    timezone: String,

    /// An origin allowed to call the API from a browser. May be repeated.
    #[arg(
        long = "allowed-origin",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = config::DEFAULT_ALLOWED_ORIGIN
    )]
    allowed_origins: Vec<String>,

    /// The base URL of the identity provider's backend API.
    #[arg(long, env = "IDENTITY_PROVIDER_URL", default_value = config::DEFAULT_IDENTITY_PROVIDER_URL)]
    identity_provider_url: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if get_timezone(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        exit(1);
    }

    let Ok(secret_key) = env::var(IDENTITY_PROVIDER_SECRET_KEY) else {
        tracing::error!("The environment variable '{IDENTITY_PROVIDER_SECRET_KEY}' must be set");
        exit(1);
    };

    let allowed_origins = match parse_origins(&args.allowed_origins) {
        Ok(origins) => origins,
        Err(origin) => {
            tracing::error!("Invalid allowed origin {origin:?}");
            exit(1);
        }
    };

    let identity_provider = match ClerkClient::new(&args.identity_provider_url, secret_key) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            tracing::error!("Could not create identity provider client: {error}");
            exit(1);
        }
    };

    let state = match open_connection(&args.db_path)
        .and_then(|conn| AppState::new(conn, identity_provider, &args.timezone))
    {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors_layer(&allowed_origins));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn parse_origins(origins: &[String]) -> Result<Vec<HeaderValue>, String> {
    origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin.trim()).map_err(|_| origin.clone()))
        .collect()
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .map(|log_file| {
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG)
        });

    let registry = tracing_subscriber::registry().with(stdout_log);

    match debug_log {
        Ok(debug_log) => registry.with(debug_log).init(),
        Err(error) => {
            registry.init();
            tracing::warn!("Could not open debug.log, logging to stdout only: {error}");
        }
    }
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
