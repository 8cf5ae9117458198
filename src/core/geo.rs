use crate::{
    core::constants::{EARTH_RADIUS_KM, MAX_MERCATOR_LATITUDE},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Checks that a latitude/longitude pair is finite and inside the geographic domain.
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    if !lat.is_finite() || !lon.is_finite() {
        return false;
    }
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Represents a geographical coordinate with latitude and longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Creates a coordinate without validating it
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a coordinate only if it passes [`is_valid_coordinate`]
    pub fn new_valid(latitude: f64, longitude: f64) -> Option<Self> {
        is_valid_coordinate(latitude, longitude).then(|| Self::new(latitude, longitude))
    }

    /// Like [`GeoCoordinate::new_valid`] but reports why the pair was rejected
    pub fn new_checked(latitude: f64, longitude: f64) -> Result<Self> {
        Self::new_valid(latitude, longitude).ok_or_else(|| {
            MapError::InvalidCoordinates(format!("lat={latitude}, lon={longitude}"))
        })
    }

    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
    }

    /// Great-circle distance to `other` in kilometers
    pub fn distance_km(&self, other: &GeoCoordinate) -> f64 {
        haversine_km(self, other)
    }
}

impl Default for GeoCoordinate {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Calculates the great-circle distance between two coordinates using the Haversine formula
pub fn haversine_km(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Represents a point in screen or tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Pixel dimensions of the map canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: i32,
    pub height: i32,
}

impl CanvasSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Truncates a fractional widget size to whole pixels
    pub fn from_point(size: Point) -> Self {
        Self::new(size.x as i32, size.y as i32)
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}
