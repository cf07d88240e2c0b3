use std::sync::Arc;

use eco_commute_lib::Coordinate;
use tokio::sync::watch;

use crate::{
    backend::CommuteBackend,
    config::ClientConfig,
    error::ClientError,
    geocoder::{NominatimGeocoder, ReverseGeocoder},
    http::HttpBackend,
    pipeline::{CommutePipeline, CommutePlan, PlanState, PlanningSession},
    refresher::{ImpactRefresher, ImpactView, Refreshed},
    selector::{ClickOutcome, CommittedPair, PointSelector, SelectionController},
};

/// The public interface for everything the commute screens need.
#[derive(Clone)]
pub struct CommuteClient {
    pipeline: Arc<CommutePipeline>,
    session: Arc<PlanningSession>,
    selection: Arc<SelectionController>,
    committed: watch::Receiver<Option<CommittedPair>>,
    refresher: Arc<ImpactRefresher>,
}

impl CommuteClient {
    pub fn start(config: &ClientConfig) -> Result<Self, ClientError> {
        let backend = Arc::new(HttpBackend::new(config)?);
        let geocoder = Arc::new(NominatimGeocoder::new(config)?);
        tracing::info!("Using backend at {}", config.api_base_url);

        Ok(Self::with_services(config, backend, geocoder))
    }

    pub fn with_services(
        config: &ClientConfig,
        backend: Arc<dyn CommuteBackend>,
        geocoder: Arc<dyn ReverseGeocoder>,
    ) -> Self {
        let (tx, committed) = watch::channel::<Option<CommittedPair>>(None);
        let selection = SelectionController::new(
            geocoder,
            Box::new(move |pair| {
                tx.send_replace(pair);
            }),
        );

        Self {
            pipeline: Arc::new(CommutePipeline::new(backend.clone(), config.user_id, config.stage_timeout)),
            session: Arc::new(PlanningSession::default()),
            selection: Arc::new(selection),
            committed,
            refresher: Arc::new(ImpactRefresher::new(backend, config.user_id, config.stage_timeout)),
        }
    }

    /// Plans a commute typed as `"lat,lng"` text and logs it as a trip.
    pub async fn plan(&self, origin: &str, destination: &str) -> Result<CommutePlan, ClientError> {
        self.pipeline.plan_and_log(&self.session, origin, destination).await
    }

    /// Plans the pair currently committed on the map, if any.
    pub async fn plan_selection(&self) -> Option<CommutePlan> {
        let pair = (*self.committed.borrow())?;
        Some(self.plan_between(pair.start, pair.destination).await)
    }

    pub async fn plan_between(&self, origin: Coordinate, destination: Coordinate) -> CommutePlan {
        self.pipeline.plan_coordinates(&self.session, origin, destination).await
    }

    pub async fn plan_state(&self) -> PlanState {
        self.session.snapshot().await
    }

    pub async fn click(&self, at: Coordinate) -> ClickOutcome {
        self.selection.click(at).await
    }

    /// Clears a locked selection. `false` if nothing was locked.
    pub async fn reset_selection(&self) -> bool {
        self.selection.reset().await
    }

    pub async fn selection(&self) -> PointSelector {
        self.selection.snapshot().await
    }

    /// Notified with the pair on every commit and with `None` on reset.
    pub fn committed_pairs(&self) -> watch::Receiver<Option<CommittedPair>> {
        self.committed.clone()
    }

    pub async fn refresh_impact(&self) -> Refreshed {
        self.refresher.refresh().await
    }

    pub async fn impact(&self) -> ImpactView {
        self.refresher.view().await
    }
}
