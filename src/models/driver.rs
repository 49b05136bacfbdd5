use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;
use crate::models::ids::DriverId;
use crate::store::{Collection, Entity};

/// Field toggled when a driver is assigned to or released from a ride.
pub const AVAILABILITY_FIELD: &str = "is_available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub car_model: String,
    pub plate: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Entity for Driver {
    type Id = DriverId;
    const COLLECTION: Collection = Collection::Driver;
}
