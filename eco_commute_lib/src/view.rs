//! Pure display helpers. No I/O, no state.

pub const ADDRESS_LOADING: &str = "Loading...";
pub const ADDRESS_UNKNOWN: &str = "Unknown location";
pub const ADDRESS_FAILED: &str = "Failed to load location";

/// Grams of CO2 saved that fill the savings bar.
pub const SAVINGS_BAR_FULL: f64 = 1000.;
const SAVINGS_BAR_MIN: f64 = 5.;
const SAVINGS_BAR_MAX: f64 = 100.;

/// Width in percent of the savings bar, clamped to [5, 100].
pub fn savings_bar_percent(co2_saved: f64) -> f64 {
    let percent = co2_saved / SAVINGS_BAR_FULL * 100.;
    if percent.is_nan() {
        return SAVINGS_BAR_MIN;
    }
    percent.clamp(SAVINGS_BAR_MIN, SAVINGS_BAR_MAX)
}

/// Upper-cases the first character, leaves the rest alone.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_distance(distance_km: f64) -> String {
    format!("{distance_km:.2} km")
}

pub fn format_emissions(value: f64) -> String {
    format!("{value:.2} g")
}

pub fn format_minutes(minutes: f64) -> String {
    format!("{} min", minutes.round())
}
