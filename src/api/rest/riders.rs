use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;

use crate::api::rest::Created;
use crate::engine::registry::register_rider;
use crate::error::AppError;
use crate::models::ids::RiderId;
use crate::models::rider::Rider;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/riders", post(create_rider))
}

async fn create_rider(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Rider>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<RiderId>>), AppError> {
    let Json(payload) = payload?;
    let id = register_rider(state.store.as_ref(), &payload)?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}
