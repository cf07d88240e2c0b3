//! Text rendering of the view states for the terminal.

use eco_commute_lib::view::{capitalize, format_distance, format_emissions, format_minutes, savings_bar_percent};

use crate::{
    pipeline::{CommutePlan, PlanState, StageOutcome},
    refresher::ImpactView,
    selector::{PointRole, PointSelector, SelectionState},
};

const BAR_WIDTH: usize = 20;

pub fn render_selection(selector: &PointSelector) -> Vec<String> {
    let mut lines = Vec::new();
    let label = |role| selector.address(role).map(|a| a.label().to_owned()).unwrap_or_default();

    match selector.state() {
        SelectionState::Empty => lines.push("Click once to set start point.".to_owned()),
        SelectionState::OneSelected { start } => {
            lines.push(format!("Start: {start} ({})", label(PointRole::Start)));
            lines.push("Click again to set destination.".to_owned());
        }
        SelectionState::Locked { start, destination } => {
            lines.push(format!("Start: {start} ({})", label(PointRole::Start)));
            lines.push(format!("Destination: {destination} ({})", label(PointRole::Destination)));
        }
    }

    if let Some(distance) = selector.distance_km() {
        lines.push(format!("Route distance: {}", format_distance(distance)));
    }
    lines
}

pub fn render_plan_state(state: &PlanState) -> Vec<String> {
    match state {
        PlanState::Idle => vec!["Enter a start and destination as \"lat,lng\".".to_owned()],
        PlanState::Invalid(err) => vec![format!("Please enter valid coordinates: {err}")],
        PlanState::Planned(plan) => render_plan(plan),
    }
}

pub fn render_plan(plan: &CommutePlan) -> Vec<String> {
    let mut lines = vec![
        format!("Route: {} -> {}", plan.origin, plan.destination),
        format!("Distance: {}", format_distance(plan.distance_km)),
    ];

    lines.push(match &plan.mode {
        StageOutcome::Ready(mode) => format!("Recommended mode: {}", mode.as_str().to_uppercase()),
        StageOutcome::Pending => "Recommended mode: ...".to_owned(),
        _ => "Recommendation unavailable".to_owned(),
    });

    match &plan.traffic {
        StageOutcome::Ready(route) => {
            lines.push(format!("Duration: {}", route.duration));
            if !route.distance.is_empty() {
                lines.push(format!("Road distance: {}", route.distance));
            }
            lines.push(format!("Traffic level: {}", route.level()));
        }
        StageOutcome::NotFound => lines.push("No route found.".to_owned()),
        StageOutcome::Failed(_) => lines.push("Traffic information unavailable".to_owned()),
        StageOutcome::Pending | StageOutcome::Skipped => {}
    }

    match &plan.trip {
        StageOutcome::Ready(trip) => {
            lines.push(format!("CO2 emitted: {}", format_emissions(trip.co2_emitted)));
            lines.push(format!("CO2 saved: {}", format_emissions(trip.co2_saved)));
            lines.push(savings_bar(trip.co2_saved));
            if let Some(badge) = trip.badge() {
                lines.push(format!("New badge earned: {badge}"));
            }
        }
        StageOutcome::Pending => lines.push("Logging trip...".to_owned()),
        StageOutcome::Skipped => lines.push("Trip not logged without a recommended mode".to_owned()),
        StageOutcome::Failed(_) | StageOutcome::NotFound => lines.push("Emissions unavailable".to_owned()),
    }

    match &plan.cleanest {
        StageOutcome::Ready(route) => {
            lines.push(format!("Cleanest past route: {}", capitalize(route.mode.as_str())));
            if let Some(emitted) = route.co2_emitted {
                lines.push(format!("  CO2 emitted: {}", format_emissions(emitted)));
            }
            if let Some(minutes) = route.duration_min {
                lines.push(format!("  Best time: {}", format_minutes(minutes)));
            }
        }
        StageOutcome::NotFound => lines.push("No history for this route yet".to_owned()),
        StageOutcome::Failed(_) => lines.push("Route history unavailable".to_owned()),
        StageOutcome::Pending | StageOutcome::Skipped => {}
    }

    lines
}

pub fn render_impact(view: &ImpactView) -> Vec<String> {
    let mut lines = Vec::new();

    match &view.trip {
        StageOutcome::Ready(trip) => {
            lines.push(format!("Latest trip: {} {}", capitalize(trip.mode.as_str()), format_distance(trip.distance_km)));
            lines.push(format!("Time of day: {}", capitalize(trip.time_of_day.as_str())));
            lines.push(format!("Duration: {}", format_minutes(trip.duration_min)));
            lines.push(format!("CO2 emitted: {}", format_emissions(trip.co2_emitted)));
            lines.push(format!("CO2 saved: {}", format_emissions(trip.co2_saved)));
        }
        StageOutcome::NotFound => lines.push("No trips logged yet".to_owned()),
        StageOutcome::Pending => lines.push("Loading latest trip...".to_owned()),
        StageOutcome::Failed(_) | StageOutcome::Skipped => lines.push("Latest trip unavailable".to_owned()),
    }

    match &view.explanation {
        StageOutcome::Ready(text) => {
            lines.push(String::new());
            lines.extend(text.lines().map(str::to_owned));
        }
        StageOutcome::Failed(_) => lines.push("Explanation unavailable".to_owned()),
        _ => {}
    }

    lines
}

fn savings_bar(co2_saved: f64) -> String {
    let percent = savings_bar_percent(co2_saved);
    let filled = ((percent / 100.) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}] {percent:.0}%", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
