//! HTTP handlers and server lifecycle.
//!
//! The JSON API is a thin layer over [`DraftRoom`]; the event streams live
//! in [`crate::sse`] and [`crate::ws`].

use crate::config::Config;
use crate::metrics;
use crate::{sse, ws};
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use huddle_core::{DraftRoom, PlayerCatalog};
use huddle_protocol::api::{self, DraftReply, DraftRequest, HealthReport};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared server state.
pub struct AppState {
    /// The draft session.
    pub room: DraftRoom,
    /// Server configuration.
    pub config: Config,
    /// When the server started.
    pub started: Instant,
}

impl AppState {
    /// Create new app state around a loaded catalog.
    #[must_use]
    pub fn new(config: Config, catalog: PlayerCatalog) -> Self {
        let room = DraftRoom::with_hub_config(Arc::new(catalog), config.hub_config());
        Self {
            room,
            config,
            started: Instant::now(),
        }
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = &state.config;
    let static_dir = Path::new(&config.static_dir);
    let assets = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let mut app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/players", get(players_handler))
        .route("/api/roster", get(roster_handler))
        .route("/api/draft", post(draft_handler))
        .route("/api/standings", get(standings_handler))
        .route(&config.stream.sse_path, get(sse::sse_handler))
        .route(&config.stream.websocket_path, get(ws::ws_handler))
        .fallback_service(assets)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if config.cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(state)
}

/// Serve on an already bound listener until ctrl-c.
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Huddle server stopped");
    Ok(())
}

/// Run the HTTP server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: Config, catalog: PlayerCatalog) -> Result<()> {
    // Start metrics server if enabled
    if config.metrics.enabled {
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            error!("Failed to start metrics server: {}", e);
        }
    }

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Huddle server listening on {}", addr);
    info!("SSE endpoint: http://{}{}", addr, config.stream.sse_path);
    info!(
        "WebSocket endpoint: ws://{}{}",
        addr, config.stream.websocket_path
    );

    let state = Arc::new(AppState::new(config, catalog));
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthReport::ok(
        state.started.elapsed().as_secs_f64(),
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Undrafted players, in catalog order.
async fn players_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.room.store().list_available())
}

/// Drafted players, in catalog order.
async fn roster_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.room.store().list_drafted())
}

/// Standings: a single team scored by the sum of its ratings.
async fn standings_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.room.standings())
}

/// Draft a player.
///
/// The body is parsed by hand so malformed JSON gets the same
/// `{"error": ...}` shape as a declined draft.
async fn draft_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let start = Instant::now();

    let request = match DraftRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Malformed draft request");
            metrics::record_declined("malformed");
            return declined(api::INVALID_JSON);
        }
    };

    let Some(player_id) = request.player_id() else {
        debug!(player_id = ?request.player_id, "Draft request without a usable player id");
        metrics::record_declined("unknown_player");
        return declined(api::INVALID_PLAYER_ID);
    };

    let response = match state.room.draft(player_id) {
        Ok(drafted) => {
            metrics::record_draft(&drafted.report);
            info!(
                player = player_id,
                sequence = drafted.event.sequence,
                delivered = drafted.report.delivered,
                "Player drafted"
            );
            (StatusCode::OK, Json(DraftReply::ok())).into_response()
        }
        Err(e) => {
            metrics::record_declined(e.reason());
            declined(&e.to_string())
        }
    };

    metrics::record_latency(start.elapsed().as_secs_f64());
    response
}

fn declined(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(DraftReply::error(message))).into_response()
}
