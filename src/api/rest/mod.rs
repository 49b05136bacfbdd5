pub mod drivers;
pub mod riders;
pub mod rides;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::Collection;

const MAX_LISTED_COLLECTIONS: usize = 10;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(riders::router())
        .merge(drivers::router())
        .merge(rides::router())
        .route("/", get(root))
        .route("/test", get(diagnostics))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Body of every `201 Created` response.
#[derive(Serialize)]
pub struct Created<I> {
    pub id: I,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Ride Hailing Backend is running",
    })
}

#[derive(Serialize)]
struct DiagnosticsResponse {
    backend: &'static str,
    database: String,
    /// Always null: the in-process store has no connection URL.
    database_url: Option<String>,
    database_name: Option<String>,
    connection_status: &'static str,
    collections: Vec<String>,
}

async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let store = state.store.as_ref();
    let mut response = DiagnosticsResponse {
        backend: "running",
        database: "not initialized".to_string(),
        database_url: None,
        database_name: store.database_name().map(str::to_string),
        connection_status: "Not Connected",
        collections: Vec::new(),
    };

    if store.is_connected() {
        match store.list_collections() {
            Ok(mut collections) => {
                collections.truncate(MAX_LISTED_COLLECTIONS);
                response.database = "connected".to_string();
                response.connection_status = "Connected";
                response.collections = collections;
            }
            Err(err) => {
                response.database = format!("connected but error: {err}");
            }
        }
    }

    Json(response)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
    riders: Option<usize>,
    drivers: Option<usize>,
    rides: Option<usize>,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let count = |collection: Collection| {
        state
            .store
            .find_all(collection)
            .ok()
            .map(|documents| documents.len())
    };
    let connected = state.store.is_connected();

    Json(HealthResponse {
        status: if connected { "ok" } else { "degraded" },
        store: if connected { "connected" } else { "unavailable" },
        riders: count(Collection::Rider),
        drivers: count(Collection::Driver),
        rides: count(Collection::Ride),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
