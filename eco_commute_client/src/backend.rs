use std::{future::Future, time::Duration};

use async_trait::async_trait;
use eco_commute_lib::{
    route::{CleanestRoute, TrafficRoute},
    trip::{CommuteRequest, TripResult, TripSummary},
    Coordinate, TravelMode,
};

use crate::error::ClientError;

/// The commute backend: mode recommendation, traffic, trip logging with
/// emissions, trip history and explanations.
///
/// Lookups that may legitimately have nothing to say return `Ok(None)`;
/// errors are reserved for failed requests.
#[async_trait]
pub trait CommuteBackend: Send + Sync {
    async fn recommend_mode(&self, distance_km: f64) -> Result<TravelMode, ClientError>;

    async fn route_with_traffic(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Option<TrafficRoute>, ClientError>;

    async fn log_trip(&self, request: &CommuteRequest) -> Result<TripResult, ClientError>;

    async fn cleanest_route(
        &self,
        user_id: i64,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Option<CleanestRoute>, ClientError>;

    async fn latest_trip(&self, user_id: i64) -> Result<Option<TripSummary>, ClientError>;

    async fn explain_route(&self, summary: &TripSummary) -> Result<String, ClientError>;
}

/// Runs one network stage under `limit`, reporting expiry as [`ClientError::Timeout`].
pub async fn with_timeout<T>(
    endpoint: &'static str,
    limit: Duration,
    request: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{endpoint} timed out after {limit:?}");
            Err(ClientError::Timeout { endpoint, after: limit })
        }
    }
}
