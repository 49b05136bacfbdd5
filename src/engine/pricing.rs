//! Fixed-rate fare estimation.

use crate::geo::distance_km;
use crate::models::coordinate::Coordinate;

/// Base fare in currency units.
pub const BASE_FARE: f64 = 2.5;

/// Per-kilometre rate in currency units.
pub const PER_KM_RATE: f64 = 1.2;

/// Estimates the fare for a straight-line trip.
///
/// `fare = BASE_FARE + PER_KM_RATE * distance_km`, rounded to cents with
/// halves rounded away from zero.
pub fn estimate_fare(pickup: &Coordinate, dropoff: &Coordinate) -> f64 {
    fare_for_distance(distance_km(pickup, dropoff))
}

pub fn fare_for_distance(distance_km: f64) -> f64 {
    round_cents(BASE_FARE + PER_KM_RATE * distance_km)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
