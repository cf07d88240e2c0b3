use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficLevel {
    Low,
    Moderate,
    High,
    Unknown,
}

/// Classifies the delay `traffic - normal` in minutes. Total: a negative
/// delay is Low, NaN on either side is Unknown.
pub fn traffic_level(normal: f64, traffic: f64) -> TrafficLevel {
    let delay = traffic - normal;
    if delay.is_nan() {
        TrafficLevel::Unknown
    } else if delay <= 1. {
        TrafficLevel::Low
    } else if delay <= 5. {
        TrafficLevel::Moderate
    } else {
        TrafficLevel::High
    }
}

impl TrafficLevel {
    pub fn label(&self) -> &'static str {
        match self {
            TrafficLevel::Low => "Low",
            TrafficLevel::Moderate => "Moderate",
            TrafficLevel::High => "High",
            TrafficLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
