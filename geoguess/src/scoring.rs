//! Distance-based round scoring.
//!
//! The score decays linearly from [`MAX_SCORE`] at a perfect guess to zero at
//! [`ZERO_SCORE_DISTANCE_KM`] and beyond.

use crate::location::Location;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Points awarded for a guess at zero distance.
pub const MAX_SCORE: u32 = 5000;

/// Distance at which the score reaches zero.
pub const ZERO_SCORE_DISTANCE_KM: f64 = 1000.0;

/// Great-circle distance in kilometers between two points (haversine).
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Map a distance to points: `max(0, round(5000 * (1 - d / 1000)))`.
pub fn score_distance(distance_km: f64) -> u32 {
    let raw = (MAX_SCORE as f64 * (1.0 - distance_km / ZERO_SCORE_DISTANCE_KM)).round();
    if raw <= 0.0 {
        0
    } else {
        raw.min(MAX_SCORE as f64) as u32
    }
}

/// Score a guess against the true location.
pub fn score(actual: &Location, guess: &Location) -> u32 {
    score_distance(haversine_km(actual, guess))
}
