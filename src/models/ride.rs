use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;
use crate::models::ids::{DriverId, RideId, RiderId};
use crate::store::{Collection, Entity};

pub const STATUS_FIELD: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Requested,
    Accepted,
    /// Declared for clients; no operation moves a ride here yet.
    Enroute,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Requested => "requested",
            RideStatus::Accepted => "accepted",
            RideStatus::Enroute => "enroute",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub rider_id: RiderId,
    pub driver_id: Option<DriverId>,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub status: RideStatus,
    pub fare_estimate: Option<f64>,
}

impl Entity for Ride {
    type Id = RideId;
    const COLLECTION: Collection = Collection::Ride;
}

#[derive(Debug, Clone, Deserialize)]
pub struct RideRequest {
    pub rider_name: String,
    pub rider_phone: String,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
}

/// Outcome of a ride request as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RideTicket {
    pub ride_id: RideId,
    pub status: RideStatus,
    pub driver_id: Option<DriverId>,
    #[serde(skip)]
    pub fare_estimate: f64,
}

/// Outcome of completing or cancelling a ride.
#[derive(Debug, Clone)]
pub struct RideClosure {
    pub ride_id: RideId,
    pub status: RideStatus,
    pub driver_id: Option<DriverId>,
    pub driver_released: bool,
    pub fare_estimate: Option<f64>,
}
