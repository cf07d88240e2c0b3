use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDateTime};
use eco_commute_lib::{
    distance_km,
    route::{CleanestRoute, TrafficRoute},
    trip::{CommuteRequest, TripResult},
    Coordinate, CoordinateError, TimeOfDay, TravelMode,
};

use crate::{
    backend::{with_timeout, CommuteBackend},
    error::ClientError,
    latest::{LatestWins, Ticket},
};

/// Result of one pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Pending,
    Ready(T),
    /// The service answered, but had nothing for us. Not an error.
    NotFound,
    Failed(String),
    /// A stage this one depends on did not produce a value.
    Skipped,
}

impl<T> Default for StageOutcome<T> {
    fn default() -> Self {
        StageOutcome::Pending
    }
}

impl<T> StageOutcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            StageOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, StageOutcome::Pending)
    }

    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => StageOutcome::Ready(value),
            Err(err) => {
                tracing::warn!("Stage failed: {err}");
                StageOutcome::Failed(err.to_string())
            }
        }
    }

    pub fn from_lookup(result: Result<Option<T>, ClientError>) -> Self {
        match result {
            Ok(None) => StageOutcome::NotFound,
            Ok(Some(value)) => StageOutcome::Ready(value),
            Err(err) => StageOutcome::from_result(Err(err)),
        }
    }
}

/// Everything one submission produced, one outcome per stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CommutePlan {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub distance_km: f64,
    pub mode: StageOutcome<TravelMode>,
    pub traffic: StageOutcome<TrafficRoute>,
    /// What was sent to the trip log, once the mode is known.
    pub request: Option<CommuteRequest>,
    pub trip: StageOutcome<TripResult>,
    pub cleanest: StageOutcome<CleanestRoute>,
}

impl CommutePlan {
    fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            distance_km: distance_km(origin, destination),
            mode: StageOutcome::Pending,
            traffic: StageOutcome::Pending,
            request: None,
            trip: StageOutcome::Pending,
            cleanest: StageOutcome::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlanState {
    #[default]
    Idle,
    Invalid(CoordinateError),
    Planned(CommutePlan),
}

impl PlanState {
    pub fn plan(&self) -> Option<&CommutePlan> {
        match self {
            PlanState::Planned(plan) => Some(plan),
            _ => None,
        }
    }

    fn plan_mut(&mut self) -> Option<&mut CommutePlan> {
        match self {
            PlanState::Planned(plan) => Some(plan),
            _ => None,
        }
    }
}

/// The view state of one planning screen. Only the latest submission writes to it.
pub type PlanningSession = LatestWins<PlanState>;

/// Distance, then mode recommendation and traffic side by side, then trip
/// logging and cleanest-route lookup side by side.
pub struct CommutePipeline {
    backend: Arc<dyn CommuteBackend>,
    user_id: i64,
    stage_timeout: Duration,
}

impl CommutePipeline {
    pub fn new(backend: Arc<dyn CommuteBackend>, user_id: i64, stage_timeout: Duration) -> Self {
        Self {
            backend,
            user_id,
            stage_timeout,
        }
    }

    /// Plans from user text. Fails only on malformed coordinates, before any request.
    /// Starting a run supersedes any run still in flight on `session`.
    pub async fn plan_and_log(
        &self,
        session: &PlanningSession,
        origin: &str,
        destination: &str,
    ) -> Result<CommutePlan, ClientError> {
        self.plan_and_log_at(session, origin, destination, Local::now().naive_local()).await
    }

    pub async fn plan_and_log_at(
        &self,
        session: &PlanningSession,
        origin: &str,
        destination: &str,
        now: NaiveDateTime,
    ) -> Result<CommutePlan, ClientError> {
        let ticket = session.begin(PlanState::Idle).await;

        let parsed = origin
            .parse::<Coordinate>()
            .and_then(|origin| Ok((origin, destination.parse::<Coordinate>()?)));

        match parsed {
            Ok((origin, destination)) => Ok(self.run(session, ticket, origin, destination, now).await),
            Err(err) => {
                tracing::warn!("Rejected commute {origin:?} -> {destination:?}: {err}");
                let shown = err.clone();
                session.update(ticket, move |state| *state = PlanState::Invalid(shown)).await;
                Err(ClientError::Validation(err))
            }
        }
    }

    /// Plans a pair that is already validated, e.g. one committed on the map.
    pub async fn plan_coordinates(
        &self,
        session: &PlanningSession,
        origin: Coordinate,
        destination: Coordinate,
    ) -> CommutePlan {
        let ticket = session.begin(PlanState::Idle).await;
        self.run(session, ticket, origin, destination, Local::now().naive_local()).await
    }

    async fn run(
        &self,
        session: &PlanningSession,
        ticket: Ticket,
        origin: Coordinate,
        destination: Coordinate,
        now: NaiveDateTime,
    ) -> CommutePlan {
        let mut plan = CommutePlan::new(origin, destination);
        tracing::info!("Planning {origin} -> {destination} ({:.2} km)", plan.distance_km);
        publish(session, ticket, &plan).await;

        let (mode, traffic) = tokio::join!(
            with_timeout("recommend_mode", self.stage_timeout, self.backend.recommend_mode(plan.distance_km)),
            with_timeout("route_with_traffic", self.stage_timeout, self.backend.route_with_traffic(origin, destination)),
        );
        plan.mode = StageOutcome::from_result(mode);
        plan.traffic = StageOutcome::from_lookup(traffic);

        // The recommended mode is authoritative; without it there is nothing to log
        plan.request = plan.mode.ready().map(|mode| CommuteRequest {
            user_id: self.user_id,
            origin,
            destination,
            mode: mode.clone(),
            distance_km: plan.distance_km,
            duration_min: plan.traffic.ready().and_then(TrafficRoute::duration_minutes).unwrap_or(0.),
            time_of_day: TimeOfDay::of(&now),
            date: now.date(),
        });
        if plan.request.is_none() {
            plan.trip = StageOutcome::Skipped;
        }
        publish(session, ticket, &plan).await;

        let log = async {
            let Some(request) = &plan.request else {
                return StageOutcome::Skipped;
            };
            let outcome = StageOutcome::from_result(
                with_timeout("log_trip", self.stage_timeout, self.backend.log_trip(request)).await,
            );
            let shown = outcome.clone();
            session
                .update(ticket, move |state| {
                    if let Some(plan) = state.plan_mut() {
                        plan.trip = shown;
                    }
                })
                .await;
            outcome
        };

        let cleanest = async {
            let outcome = StageOutcome::from_lookup(
                with_timeout(
                    "suggest_cleanest_route",
                    self.stage_timeout,
                    self.backend.cleanest_route(self.user_id, origin, destination),
                )
                .await,
            );
            let shown = outcome.clone();
            session
                .update(ticket, move |state| {
                    if let Some(plan) = state.plan_mut() {
                        plan.cleanest = shown;
                    }
                })
                .await;
            outcome
        };

        let (trip, cleanest) = tokio::join!(log, cleanest);
        plan.trip = trip;
        plan.cleanest = cleanest;

        tracing::info!(
            "Planned {origin} -> {destination}: mode {}, trip {}, history {}",
            stage_name(&plan.mode),
            stage_name(&plan.trip),
            stage_name(&plan.cleanest)
        );
        plan
    }
}

async fn publish(session: &PlanningSession, ticket: Ticket, plan: &CommutePlan) {
    let shown = plan.clone();
    session.update(ticket, move |state| *state = PlanState::Planned(shown)).await;
}

fn stage_name<T>(outcome: &StageOutcome<T>) -> &'static str {
    match outcome {
        StageOutcome::Pending => "pending",
        StageOutcome::Ready(_) => "ready",
        StageOutcome::NotFound => "not found",
        StageOutcome::Failed(_) => "failed",
        StageOutcome::Skipped => "skipped",
    }
}
