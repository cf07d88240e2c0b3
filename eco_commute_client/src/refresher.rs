use std::{sync::Arc, time::Duration};

use eco_commute_lib::trip::TripSummary;

use crate::{
    backend::{with_timeout, CommuteBackend},
    latest::LatestWins,
    pipeline::StageOutcome,
};

/// The "latest trip" panel: the last logged trip and an explanation of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactView {
    pub trip: StageOutcome<TripSummary>,
    pub explanation: StageOutcome<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed {
    pub view: ImpactView,
    /// False when a newer refresh started before this one finished.
    pub current: bool,
}

/// Re-fetches the latest trip on demand. The last *triggered* refresh owns the
/// view; a slow earlier one finishing late changes nothing.
pub struct ImpactRefresher {
    backend: Arc<dyn CommuteBackend>,
    user_id: i64,
    stage_timeout: Duration,
    view: LatestWins<ImpactView>,
}

impl ImpactRefresher {
    pub fn new(backend: Arc<dyn CommuteBackend>, user_id: i64, stage_timeout: Duration) -> Self {
        Self {
            backend,
            user_id,
            stage_timeout,
            view: LatestWins::default(),
        }
    }

    pub async fn view(&self) -> ImpactView {
        self.view.snapshot().await
    }

    pub async fn refresh(&self) -> Refreshed {
        let ticket = self.view.begin(ImpactView::default()).await;
        let mut view = ImpactView::default();

        view.trip = StageOutcome::from_lookup(
            with_timeout("latest_trip", self.stage_timeout, self.backend.latest_trip(self.user_id)).await,
        );

        // The explanation is about the trip just fetched, so it has to wait for it
        view.explanation = match view.trip.ready() {
            Some(summary) => {
                let shown = view.trip.clone();
                self.view.update(ticket, move |v| v.trip = shown).await;

                StageOutcome::from_result(
                    with_timeout("explain_route", self.stage_timeout, self.backend.explain_route(summary)).await,
                )
            }
            None => StageOutcome::Skipped,
        };

        let shown = view.clone();
        let current = self.view.update(ticket, move |v| *v = shown).await;
        if !current {
            tracing::debug!("Refresh finished after a newer one started, result dropped");
        }

        Refreshed { view, current }
    }
}
