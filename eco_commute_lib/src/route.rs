use serde::{de::IgnoredAny, Deserialize, Deserializer};

use crate::{
    traffic::{traffic_level, TrafficLevel},
    trip::TravelMode,
};

/// Response of `GET /recommend_mode/{distance_km}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendModeResponse {
    pub recommended_mode: TravelMode,
}

/// Raw response of `GET /route_with_traffic`. A missing `duration` means
/// no route was found.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrafficRouteResponse {
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub traffic_duration: Option<String>,
}

impl TrafficRouteResponse {
    pub fn into_route(self) -> Option<TrafficRoute> {
        let duration = self.duration?;
        Some(TrafficRoute {
            duration,
            distance: self.distance.unwrap_or_default(),
            traffic_duration: self.traffic_duration,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRoute {
    pub duration: String,
    pub distance: String,
    pub traffic_duration: Option<String>,
}

impl TrafficRoute {
    pub fn duration_minutes(&self) -> Option<f64> {
        parse_duration_minutes(&self.duration)
    }

    pub fn traffic_minutes(&self) -> Option<f64> {
        self.traffic_duration.as_deref().and_then(parse_duration_minutes)
    }

    pub fn level(&self) -> TrafficLevel {
        traffic_level(
            self.duration_minutes().unwrap_or(f64::NAN),
            self.traffic_minutes().unwrap_or(f64::NAN),
        )
    }
}

/// Raw response of `GET /suggest_cleanest_route/{user_id}`. Without history
/// the service answers with only a `message`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CleanestRouteResponse {
    #[serde(default)]
    pub mode: Option<TravelMode>,
    #[serde(default)]
    pub co2_emitted: Option<f64>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration_min: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CleanestRouteResponse {
    pub fn into_route(self) -> Option<CleanestRoute> {
        Some(CleanestRoute {
            mode: self.mode?,
            co2_emitted: self.co2_emitted,
            duration_min: self.duration_min,
        })
    }
}

/// Best historical trip for an origin/destination key.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanestRoute {
    pub mode: TravelMode,
    pub co2_emitted: Option<f64>,
    pub duration_min: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(minutes)) => Some(minutes),
        Some(NumberOrText::Text(text)) => parse_duration_minutes(&text),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

/// Minutes in a duration text such as `"23 mins"`, `"1 hour 5 mins"` or `"45"`.
/// A bare number counts as minutes. `None` if the text holds no number.
pub fn parse_duration_minutes(text: &str) -> Option<f64> {
    let mut total = 0.;
    let mut found = false;
    let mut tokens = text.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        let split = token
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(token.len());
        let Ok(value) = token[..split].parse::<f64>() else {
            continue;
        };

        let unit = if split < token.len() {
            token[split..].to_ascii_lowercase()
        } else if tokens.peek().is_some_and(|next| next.starts_with(|c: char| c.is_alphabetic())) {
            tokens.next().map(str::to_ascii_lowercase).unwrap_or_default()
        } else {
            String::new()
        };

        let factor = if unit.starts_with("day") {
            24. * 60.
        } else if unit.starts_with("hour") || unit.starts_with("hr") || unit == "h" {
            60.
        } else if unit.starts_with("sec") {
            1. / 60.
        } else {
            1.
        };

        total += value * factor;
        found = true;
    }

    found.then_some(total)
}
