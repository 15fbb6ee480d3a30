use anyhow::Context;
use axum::Router;
use axum::extract::State;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod api;
mod app_env;
mod db;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;


/// Data shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

/// Extractor for the [SharedData] in route handlers
pub type AppState = State<Arc<SharedData>>;

/// Assembles the full application router: the todo API, its documentation, and request tracing
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .nest("/api/todo", api::todo::todo_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv_loaded = dotenv().is_ok();

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)?),
        _ => None,
    };
    let otel_enabled = otel_exporters.is_some();
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    if !dotenv_loaded {
        warn!("No .env file found, configuring from the environment only");
    }
    if !otel_enabled {
        info!("OpenTelemetry export URLs not set, only logging to stdout");
    }

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("the {} environment variable must be set", app_env::DB_URL))?;
    let db_pool = db::connect_sqlx(&db_url).await?;
    db::migrate(&db_pool).await?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
    });

    let bind_address = env::var(app_env::SERVER_BIND_ADDRESS)
        .unwrap_or_else(|_| app_env::DEFAULT_BIND_ADDRESS.to_owned());
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding the server to {bind_address}"))?;

    info!("Starting server on {bind_address}");
    axum::serve(listener, build_router(shared_data))
        .await
        .context("running the HTTP server")
}
