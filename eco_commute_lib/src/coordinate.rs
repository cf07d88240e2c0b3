use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 position. Only constructible through validation, so every
/// instance has finite, in-range components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("expected \"<lat>,<lng>\", got {0:?}")]
    MissingSeparator(String),

    #[error("{0:?} is not a number")]
    NotANumber(String),

    #[error("coordinate components must be finite")]
    NonFinite,

    #[error("{axis} {value} is outside [{min}, {max}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::OutOfRange { axis: "latitude", value: latitude, min: -90.0, max: 90.0 });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::OutOfRange { axis: "longitude", value: longitude, min: -180.0, max: 180.0 });
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Canonical `"<lat>,<lng>"` text with 4 decimals. Used as the
    /// origin/destination key for both trip logging and history lookups,
    /// so the two always agree.
    pub fn route_key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Human readable, e.g. `35.2271, -80.8431`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Parses user text of the form `"<lat>,<lng>"`, whitespace allowed around the comma.
impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((lat, lng)) = s.split_once(',') else {
            return Err(CoordinateError::MissingSeparator(s.to_owned()));
        };

        let parse = |part: &str| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| CoordinateError::NotANumber(part.to_owned()))
        };

        Coordinate::new(parse(lat)?, parse(lng)?)
    }
}
