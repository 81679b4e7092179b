use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance in meters, using the same earth radius as
    /// Redis geo commands so both store backends agree on radius queries.
    pub fn distance_meters(&self, other: Point) -> f64 {
        const EARTH_RADIUS_METERS: f64 = 6_372_797.560856;

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians() / 2.0;
        let d_lng = (other.lng - self.lng).to_radians() / 2.0;

        let a = d_lat.sin().powi(2) + lat1.cos() * lat2.cos() * d_lng.sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}
