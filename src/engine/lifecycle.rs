use tracing::{info, warn};

use crate::engine::assignment::{claim_available_driver, release_driver};
use crate::engine::pricing::estimate_fare;
use crate::engine::registry::find_or_create_rider;
use crate::error::AppError;
use crate::models::ids::RideId;
use crate::models::ride::{Ride, RideClosure, RideRequest, RideStatus, RideTicket, STATUS_FIELD};
use crate::store::{record, set, DocumentStore, Record, StoreError};

/// Creates a ride for the rider behind `request.rider_phone`.
///
/// The ride starts `accepted` when a driver could be claimed, `requested`
/// otherwise.
pub fn request_ride(
    store: &dyn DocumentStore,
    request: &RideRequest,
) -> Result<RideTicket, AppError> {
    let rider_id = find_or_create_rider(store, &request.rider_name, &request.rider_phone)?;
    let driver_id = claim_available_driver(store)?;
    let fare_estimate = estimate_fare(&request.pickup, &request.dropoff);

    let status = if driver_id.is_some() {
        RideStatus::Accepted
    } else {
        RideStatus::Requested
    };

    let ride = Ride {
        rider_id: rider_id.clone(),
        driver_id: driver_id.clone(),
        pickup: request.pickup,
        dropoff: request.dropoff,
        status,
        fare_estimate: Some(fare_estimate),
    };

    let ride_id = match record::insert(store, &ride) {
        Ok(id) => id,
        Err(err) => {
            if let Some(driver_id) = &driver_id {
                release_driver(store, driver_id);
            }
            return Err(err.into());
        }
    };

    info!(
        ride_id = %ride_id,
        rider_id = %rider_id,
        driver_id = driver_id.as_ref().map(|id| id.as_str()).unwrap_or("none"),
        status = status.as_str(),
        fare_estimate,
        "ride requested"
    );

    Ok(RideTicket {
        ride_id,
        status,
        driver_id,
        fare_estimate,
    })
}

pub fn complete_ride(store: &dyn DocumentStore, ride_id: &RideId) -> Result<RideClosure, AppError> {
    close_ride(store, ride_id, RideStatus::Completed)
}

pub fn cancel_ride(store: &dyn DocumentStore, ride_id: &RideId) -> Result<RideClosure, AppError> {
    close_ride(store, ride_id, RideStatus::Cancelled)
}

pub fn list_rides(store: &dyn DocumentStore) -> Result<Vec<Record<Ride>>, AppError> {
    Ok(record::list(store)?)
}

/// Moves a ride to a terminal status and frees its driver.
///
/// Closing an already closed ride is not rejected; the driver is released
/// again.
fn close_ride(
    store: &dyn DocumentStore,
    ride_id: &RideId,
    status: RideStatus,
) -> Result<RideClosure, AppError> {
    let not_found = || AppError::NotFound(format!("ride {ride_id} not found"));

    let ride = match record::get::<Ride>(store, ride_id) {
        Ok(Some(ride)) => ride,
        Ok(None) | Err(StoreError::InvalidId(_)) => return Err(not_found()),
        Err(err) => return Err(err.into()),
    };

    if ride.body.status.is_terminal() {
        warn!(
            ride_id = %ride_id,
            from = ride.body.status.as_str(),
            to = status.as_str(),
            "closing a ride that is already closed"
        );
    }

    if !record::update::<Ride>(store, ride_id, set(STATUS_FIELD, status.as_str()))? {
        return Err(not_found());
    }

    let driver_released = ride
        .body
        .driver_id
        .as_ref()
        .is_some_and(|driver_id| release_driver(store, driver_id));

    info!(
        ride_id = %ride_id,
        status = status.as_str(),
        driver_released,
        "ride closed"
    );

    Ok(RideClosure {
        ride_id: ride.id,
        status,
        driver_id: ride.body.driver_id,
        driver_released,
        fare_estimate: ride.body.fare_estimate,
    })
}
