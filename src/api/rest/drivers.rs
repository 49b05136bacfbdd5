use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;

use crate::api::rest::Created;
use crate::engine::registry::{list_drivers, register_driver};
use crate::error::AppError;
use crate::models::driver::Driver;
use crate::models::ids::DriverId;
use crate::state::AppState;
use crate::store::Record;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/drivers", post(create_driver).get(get_drivers))
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Driver>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<DriverId>>), AppError> {
    let Json(payload) = payload?;
    let id = register_driver(state.store.as_ref(), &payload)?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

async fn get_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record<Driver>>>, AppError> {
    Ok(Json(list_drivers(state.store.as_ref())?))
}
