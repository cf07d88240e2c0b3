//! In-memory backend and geocoder for unit tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use eco_commute_lib::{
    route::{CleanestRoute, TrafficRoute},
    trip::{CommuteRequest, TripResult, TripSummary},
    Coordinate, TimeOfDay, TravelMode,
};
use tokio::sync::oneshot;

use crate::{backend::CommuteBackend, error::ClientError, geocoder::ReverseGeocoder};

/// Test side of a [`Hold`]: learn when the call is parked, then let it go.
pub(crate) struct Gate {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

pub(crate) struct Hold {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

impl Hold {
    async fn wait(self) {
        let _ = self.entered.send(());
        let _ = self.release.await;
    }
}

pub(crate) fn gate() -> (Gate, Hold) {
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    (
        Gate { entered: entered_rx, release: release_tx },
        Hold { entered: entered_tx, release: release_rx },
    )
}

fn upstream(endpoint: &'static str) -> ClientError {
    ClientError::Service { endpoint, message: "unavailable".into() }
}

pub(crate) fn summary(mode: TravelMode, distance_km: f64) -> TripSummary {
    TripSummary {
        mode,
        distance_km,
        duration_min: 10.,
        time_of_day: TimeOfDay::Morning,
        co2_emitted: 0.,
        co2_saved: distance_km * 0.192,
    }
}

/// Scripted [`CommuteBackend`]. Modes follow the backend's distance thresholds.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub fail_mode: bool,
    pub fail_traffic: bool,
    pub fail_log: bool,
    pub fail_cleanest: bool,
    pub fail_latest: bool,
    pub fail_explain: bool,
    pub traffic: Option<TrafficRoute>,
    pub cleanest: Option<CleanestRoute>,
    /// Answers for successive `latest_trip` calls; `None` once exhausted.
    pub latest: Mutex<VecDeque<TripSummary>>,
    pub logged: Mutex<Vec<CommuteRequest>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub hold_mode: Mutex<Option<Hold>>,
    pub hold_latest: Mutex<Option<Hold>>,
}

impl FakeBackend {
    pub fn hold_mode_once(&self, hold: Hold) {
        *self.hold_mode.lock().unwrap() = Some(hold);
    }

    pub fn hold_latest_once(&self, hold: Hold) {
        *self.hold_latest.lock().unwrap() = Some(hold);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CommuteBackend for FakeBackend {
    async fn recommend_mode(&self, distance_km: f64) -> Result<TravelMode, ClientError> {
        self.record("recommend_mode");
        let hold = self.hold_mode.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.wait().await;
        }
        if self.fail_mode {
            return Err(upstream("recommend_mode"));
        }

        Ok(if distance_km < 1. {
            TravelMode::Walk
        } else if distance_km < 5. {
            TravelMode::Bike
        } else if distance_km < 30. {
            TravelMode::Bus
        } else {
            TravelMode::Train
        })
    }

    async fn route_with_traffic(&self, _: Coordinate, _: Coordinate) -> Result<Option<TrafficRoute>, ClientError> {
        self.record("route_with_traffic");
        if self.fail_traffic {
            return Err(upstream("route_with_traffic"));
        }
        Ok(self.traffic.clone())
    }

    async fn log_trip(&self, request: &CommuteRequest) -> Result<TripResult, ClientError> {
        self.record("log_trip");
        if self.fail_log {
            return Err(upstream("log_trip"));
        }
        self.logged.lock().unwrap().push(request.clone());

        let emitted = match request.mode {
            TravelMode::Car => request.distance_km * 0.2,
            TravelMode::Bus | TravelMode::Train => request.distance_km * 0.1,
            _ => 0.,
        };
        Ok(TripResult {
            co2_emitted: emitted,
            co2_saved: request.distance_km * 0.192 - emitted,
            badge_earned: None,
        })
    }

    async fn cleanest_route(&self, _: i64, _: Coordinate, _: Coordinate) -> Result<Option<CleanestRoute>, ClientError> {
        self.record("suggest_cleanest_route");
        if self.fail_cleanest {
            return Err(upstream("suggest_cleanest_route"));
        }
        Ok(self.cleanest.clone())
    }

    async fn latest_trip(&self, _: i64) -> Result<Option<TripSummary>, ClientError> {
        self.record("latest_trip");
        let next = self.latest.lock().unwrap().pop_front();
        let hold = self.hold_latest.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.wait().await;
        }
        if self.fail_latest {
            return Err(upstream("latest_trip"));
        }
        Ok(next)
    }

    async fn explain_route(&self, summary: &TripSummary) -> Result<String, ClientError> {
        self.record("explain_route");
        if self.fail_explain {
            return Err(upstream("explain_route"));
        }
        Ok(format!("{} km by {}", summary.distance_km, summary.mode))
    }
}

pub(crate) struct FakeGeocoder {
    name: Option<String>,
    fail: bool,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeGeocoder {
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_owned()), fail: false, hold: Mutex::new(None) }
    }

    pub fn nameless() -> Self {
        Self { name: None, fail: false, hold: Mutex::new(None) }
    }

    pub fn failing() -> Self {
        Self { name: None, fail: true, hold: Mutex::new(None) }
    }

    /// Parks the first lookup until `release` fires.
    pub fn held_once(self, release: oneshot::Receiver<()>) -> Self {
        *self.hold.lock().unwrap() = Some(release);
        self
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse(&self, _: Coordinate) -> Result<Option<String>, ClientError> {
        let hold = self.hold.lock().unwrap().take();
        if let Some(release) = hold {
            let _ = release.await;
        }
        if self.fail {
            return Err(upstream("reverse"));
        }
        Ok(self.name.clone())
    }
}
