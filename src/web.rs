//! Router assembly and the HTTP server loop

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    response::{Html, Json},
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{api, config::ServerConfig, store::ClimateStore};

const WELCOME_PAGE: &str = concat!(
    "Aloha! Welcome to the official Hawaii Climate API!<br/><br>",
    "To navigate this API, please follow the Available Routes listed below:<br/><br>",
    "-- Hawaii's Precipitation Totals from 2017: <a href=\"/api/v1.0/precipitation\">/api/v1.0/precipitation</a><br/>",
    "-- Hawaii's Active Weather Stations: <a href=\"/api/v1.0/stations\">/api/v1.0/stations</a><br/>",
    "-- Station USC00519281 Observations from 2017: <a href=\"/api/v1.0/tobs\">/api/v1.0/tobs</a><br/>",
    "-- Minimum, Average, & Maximum Temperatures by Date;<br/>",
    "To research this data, insert the start and end dates using 'yyyy-mm-dd' format in your browser's URL: ",
    "<a href=\"/api/v1.0/trip/yyyy-mm-dd/yyyy-mm-dd\">/api/v1.0/trip/yyyy-mm-dd/yyyy-mm-dd</a><br>",
    "Note: If no end-date is entered, the end date will default to 08/23/17<br>",
);

/// Shared, read-only handle every request works against
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClimateStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ClimateStore>) -> Self {
        Self { store }
    }
}

/// Full application router
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .nest("/api/v1.0", api::router())
        .with_state(state);

    if config.cors_permissive {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
    } else {
        router.layer(TraceLayer::new_for_http())
    }
}

async fn welcome() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

async fn health(State(state): State<AppState>) -> crate::Result<Json<Value>> {
    state.store.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn run(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = app(state, config);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
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
                tracing::warn!("Failed to listen for SIGTERM: {e}");
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
