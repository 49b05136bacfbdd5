use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ids::{DriverId, RideId};
use crate::models::ride::{RideClosure, RideStatus, RideTicket};

/// Published on the ride event channel after every lifecycle operation.
#[derive(Debug, Clone, Serialize)]
pub struct RideEvent {
    pub ride_id: RideId,
    pub status: RideStatus,
    pub driver_id: Option<DriverId>,
    pub fare_estimate: Option<f64>,
    pub at: DateTime<Utc>,
}

impl From<&RideTicket> for RideEvent {
    fn from(ticket: &RideTicket) -> Self {
        Self {
            ride_id: ticket.ride_id.clone(),
            status: ticket.status,
            driver_id: ticket.driver_id.clone(),
            fare_estimate: Some(ticket.fare_estimate),
            at: Utc::now(),
        }
    }
}

impl From<&RideClosure> for RideEvent {
    fn from(closure: &RideClosure) -> Self {
        Self {
            ride_id: closure.ride_id.clone(),
            status: closure.status,
            driver_id: closure.driver_id.clone(),
            fare_estimate: closure.fare_estimate,
            at: Utc::now(),
        }
    }
}
