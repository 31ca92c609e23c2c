//! Mesh Dashboard
//!
//! Polls a LoRa mesh node's message and node tables and serves them as a live web dashboard.

mod api;
mod config;
mod errors;
mod models;
mod poller;
mod render;
mod state;
mod store;
mod upstream;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use state::{DashboardState, SharedDashboard};
use upstream::MeshClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: SharedDashboard,
    pub client: Arc<MeshClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting Mesh Dashboard");
    tracing::info!("Upstream node: {}", config.upstream_url);
    tracing::info!("Store strategy: {}", config.store_strategy.as_str());
    tracing::info!("Bind address: {}", config.bind_addr);

    let client = Arc::new(MeshClient::new(
        &config.upstream_url,
        config.request_timeout,
    )?);
    let dashboard = DashboardState::shared(config.store_strategy);

    // Start polling the node
    let pollers = poller::spawn_pollers(
        client.clone(),
        dashboard.clone(),
        config.messages_poll_interval,
        config.nodes_poll_interval,
    );

    // Create application state
    let state = AppState {
        dashboard,
        client,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pollers.abort();
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let dashboard_routes = Router::new()
        .route("/", get(api::index))
        .route("/fragments", get(api::fragments))
        .route("/api/view", get(api::get_view))
        .route("/filter", post(api::set_filter))
        .route("/send", post(api::send_message));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(dashboard_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
