use std::str::FromStr;

use geo::{Distance, Haversine, Point};
use thiserror::Error;

pub const MILES_PER_KM: f64 = 0.621371192;
const MILES_PER_METER: f64 = MILES_PER_KM / 1000.0;
const FEET_PER_MILE: f64 = 5280.0;

#[derive(Debug, Error, PartialEq)]
pub enum DistanceError {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
    #[error("unknown length unit {0:?}")]
    UnknownUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, DistanceError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(DistanceError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(DistanceError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    fn point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// Great-circle distance in miles between two points, on a sphere of the
/// Earth's mean radius.
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    to_miles(Haversine.distance(a.point(), b.point()), LengthUnit::Meters)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Miles,
    Kilometers,
    Meters,
    Feet,
}

impl FromStr for LengthUnit {
    type Err = DistanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mi" | "mile" | "miles" => Ok(LengthUnit::Miles),
            "km" | "kilometer" | "kilometers" => Ok(LengthUnit::Kilometers),
            "m" | "meter" | "meters" => Ok(LengthUnit::Meters),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Feet),
            other => Err(DistanceError::UnknownUnit(other.to_string())),
        }
    }
}

/// Converts a length in `unit` to miles.
pub fn to_miles(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Miles => value,
        LengthUnit::Kilometers => value * MILES_PER_KM,
        LengthUnit::Meters => value * MILES_PER_METER,
        LengthUnit::Feet => value / FEET_PER_MILE,
    }
}
