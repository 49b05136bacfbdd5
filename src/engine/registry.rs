use tracing::info;

use crate::error::AppError;
use crate::models::driver::Driver;
use crate::models::ids::{DriverId, RiderId};
use crate::models::rider::Rider;
use crate::store::{record, DocumentStore, Filter, Record};

pub fn register_rider(store: &dyn DocumentStore, rider: &Rider) -> Result<RiderId, AppError> {
    let id = record::insert(store, rider)?;
    info!(rider_id = %id, "rider registered");
    Ok(id)
}

pub fn register_driver(store: &dyn DocumentStore, driver: &Driver) -> Result<DriverId, AppError> {
    let id = record::insert(store, driver)?;
    info!(driver_id = %id, available = driver.is_available, "driver registered");
    Ok(id)
}

/// Returns the rider registered under `phone`, registering one if needed.
///
/// Fields are stored as given; an empty name or phone is not rejected.
pub fn find_or_create_rider(
    store: &dyn DocumentStore,
    name: &str,
    phone: &str,
) -> Result<RiderId, AppError> {
    if let Some(existing) = record::find_one::<Rider>(store, &Filter::new().eq("phone", phone))? {
        return Ok(existing.id);
    }

    register_rider(
        store,
        &Rider {
            name: name.to_string(),
            phone: phone.to_string(),
        },
    )
}

pub fn list_drivers(store: &dyn DocumentStore) -> Result<Vec<Record<Driver>>, AppError> {
    Ok(record::list(store)?)
}
