//! Geographic primitives shared by the map and geocoding surfaces.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair used for map centers and geocode results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// (0, 0) is the placeholder for "no location"; anything else is usable.
    pub fn is_valid(&self) -> bool {
        self.lat != 0.0 || self.lng != 0.0
    }
}
