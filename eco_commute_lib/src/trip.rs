use std::fmt;

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize, Serializer};

use crate::coordinate::Coordinate;

/// Travel mode as named by the backend. Google style names
/// ("driving", "transit", ...) are folded into the short ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TravelMode {
    Car,
    Bus,
    Train,
    Bike,
    Walk,
    Other(String),
}

impl TravelMode {
    pub fn as_str(&self) -> &str {
        match self {
            TravelMode::Car => "car",
            TravelMode::Bus => "bus",
            TravelMode::Train => "train",
            TravelMode::Bike => "bike",
            TravelMode::Walk => "walk",
            TravelMode::Other(name) => name,
        }
    }
}

impl From<String> for TravelMode {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "car" | "driving" => TravelMode::Car,
            "bus" | "transit" => TravelMode::Bus,
            "train" => TravelMode::Train,
            "bike" | "bicycling" => TravelMode::Bike,
            "walk" | "walking" => TravelMode::Walk,
            _ => TravelMode::Other(value),
        }
    }
}

impl From<&str> for TravelMode {
    fn from(value: &str) -> Self {
        TravelMode::from(value.to_owned())
    }
}

impl From<TravelMode> for String {
    fn from(mode: TravelMode) -> Self {
        match mode {
            TravelMode::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..12 => TimeOfDay::Morning,
            12..17 => TimeOfDay::Afternoon,
            17..21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn of<T: Timelike>(time: &T) -> Self {
        Self::from_hour(time.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn as_route_key<S: Serializer>(coordinate: &Coordinate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&coordinate.route_key())
}

/// Body of `POST /log_trip`. Built once per submission and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommuteRequest {
    pub user_id: i64,
    #[serde(serialize_with = "as_route_key")]
    pub origin: Coordinate,
    #[serde(serialize_with = "as_route_key")]
    pub destination: Coordinate,
    pub mode: TravelMode,
    pub distance_km: f64,
    pub duration_min: f64,
    pub time_of_day: TimeOfDay,
    pub date: NaiveDate,
}

/// Response of `POST /log_trip`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripResult {
    pub co2_emitted: f64,
    pub co2_saved: f64,
    #[serde(default)]
    pub badge_earned: Option<String>,
}

impl TripResult {
    pub fn badge(&self) -> Option<&str> {
        self.badge_earned.as_deref().filter(|badge| !badge.trim().is_empty())
    }
}

/// Response of `GET /latest_trip/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub mode: TravelMode,
    pub distance_km: f64,
    pub duration_min: f64,
    pub time_of_day: TimeOfDay,
    pub co2_emitted: f64,
    pub co2_saved: f64,
}

/// Body of `POST /explain_route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainRequest {
    pub mode: TravelMode,
    pub distance_km: f64,
    pub duration_min: f64,
    pub time_of_day: TimeOfDay,
    pub co2_saved: f64,
}

impl From<&TripSummary> for ExplainRequest {
    fn from(summary: &TripSummary) -> Self {
        Self {
            mode: summary.mode.clone(),
            distance_km: summary.distance_km,
            duration_min: summary.duration_min,
            time_of_day: summary.time_of_day,
            co2_saved: summary.co2_saved,
        }
    }
}

/// Response of `POST /explain_route`. The service answers 200 with an
/// `error` field when generation failed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplanationResponse {
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub error: Option<String>,
}
