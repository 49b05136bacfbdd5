use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::api::rest::MessageResponse;
use crate::engine::lifecycle::{cancel_ride, complete_ride, list_rides, request_ride};
use crate::error::AppError;
use crate::models::event::RideEvent;
use crate::models::ids::RideId;
use crate::models::ride::{Ride, RideClosure, RideRequest, RideTicket};
use crate::state::AppState;
use crate::store::Record;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", get(get_rides))
        .route("/rides/request", post(create_ride_request))
        .route("/rides/:id/complete", post(complete))
        .route("/rides/:id/cancel", post(cancel))
}

async fn create_ride_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RideRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RideTicket>), AppError> {
    let Json(payload) = payload?;

    let start = Instant::now();
    let result = request_ride(state.store.as_ref(), &payload);
    state
        .metrics
        .observe_latency("request", start.elapsed().as_secs_f64());
    let ticket = result?;

    state
        .metrics
        .rides_requested_total
        .with_label_values(&[ticket.status.as_str()])
        .inc();

    state.publish(RideEvent::from(&ticket));
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn get_rides(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record<Ride>>>, AppError> {
    Ok(Json(list_rides(state.store.as_ref())?))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let start = Instant::now();
    let result = complete_ride(state.store.as_ref(), &RideId::from(id));
    record_closure(&state, "complete", start, result)?;

    Ok(Json(MessageResponse {
        message: "Ride completed",
    }))
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let start = Instant::now();
    let result = cancel_ride(state.store.as_ref(), &RideId::from(id));
    record_closure(&state, "cancel", start, result)?;

    Ok(Json(MessageResponse {
        message: "Ride cancelled",
    }))
}

/// Observes latency for every outcome; counts and publishes only successes.
fn record_closure(
    state: &AppState,
    operation: &str,
    start: Instant,
    result: Result<RideClosure, AppError>,
) -> Result<RideClosure, AppError> {
    state
        .metrics
        .observe_latency(operation, start.elapsed().as_secs_f64());
    let closure = result?;

    state
        .metrics
        .rides_closed_total
        .with_label_values(&[closure.status.as_str()])
        .inc();
    state.publish(RideEvent::from(&closure));
    Ok(closure)
}
