use tracing::{debug, warn};

use crate::models::driver::{Driver, AVAILABILITY_FIELD};
use crate::models::ids::DriverId;
use crate::store::{record, set, DocumentStore, Filter, StoreError};

/// Selection rounds before a request gives up and stays unmatched.
pub const MAX_CLAIM_ATTEMPTS: usize = 5;

fn available() -> Filter {
    Filter::new().eq(AVAILABILITY_FIELD, true)
}

/// Picks any available driver and marks it unavailable.
///
/// The availability flip is a guarded update, so two requests racing for the
/// same driver cannot both win. A lost race triggers another selection.
pub fn claim_available_driver(store: &dyn DocumentStore) -> Result<Option<DriverId>, StoreError> {
    let guard = available();

    for attempt in 1..=MAX_CLAIM_ATTEMPTS {
        let Some(candidate) = record::find_one::<Driver>(store, &guard)? else {
            debug!(attempt, "no available drivers");
            return Ok(None);
        };

        let claimed = record::update_where::<Driver>(
            store,
            &candidate.id,
            &guard,
            set(AVAILABILITY_FIELD, false),
        )?;

        if claimed {
            debug!(driver_id = %candidate.id, attempt, "driver claimed");
            return Ok(Some(candidate.id));
        }

        warn!(
            driver_id = %candidate.id,
            attempt,
            "driver was claimed concurrently; selecting again"
        );
    }

    warn!(attempts = MAX_CLAIM_ATTEMPTS, "giving up on driver selection");
    Ok(None)
}

/// Marks a driver available again. Failures are logged, never returned.
pub fn release_driver(store: &dyn DocumentStore, driver_id: &DriverId) -> bool {
    match record::update::<Driver>(store, driver_id, set(AVAILABILITY_FIELD, true)) {
        Ok(true) => {
            debug!(driver_id = %driver_id, "driver released");
            true
        }
        Ok(false) => {
            warn!(driver_id = %driver_id, "driver to release does not exist");
            false
        }
        Err(err) => {
            warn!(driver_id = %driver_id, error = %err, "failed to release driver");
            false
        }
    }
}
