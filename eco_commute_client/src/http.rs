use async_trait::async_trait;
use eco_commute_lib::{
    route::{CleanestRoute, CleanestRouteResponse, RecommendModeResponse, TrafficRoute, TrafficRouteResponse},
    trip::{CommuteRequest, ExplainRequest, ExplanationResponse, TripResult, TripSummary},
    Coordinate, TravelMode,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{backend::CommuteBackend, config::ClientConfig, error::ClientError};

const RECOMMEND_MODE: &str = "recommend_mode";
const ROUTE_WITH_TRAFFIC: &str = "route_with_traffic";
const LOG_TRIP: &str = "log_trip";
const CLEANEST_ROUTE: &str = "suggest_cleanest_route";
const LATEST_TRIP: &str = "latest_trip";
const EXPLAIN_ROUTE: &str = "explain_route";

/// [`CommuteBackend`] over the JSON HTTP API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.stage_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| ClientError::Request { endpoint: "client", source })?;

        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

pub(crate) async fn send(endpoint: &'static str, request: RequestBuilder) -> Result<Response, ClientError> {
    tracing::debug!("Calling {endpoint}");
    request
        .send()
        .await
        .map_err(|source| ClientError::Request { endpoint, source })
}

/// Parses a successful response body, logging the raw body when it doesn't fit `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status { endpoint, status });
    }

    let text = response
        .text()
        .await
        .map_err(|source| ClientError::Request { endpoint, source })?;

    serde_json::from_str(&text).map_err(|source| {
        tracing::error!("Failed to parse {endpoint} response: {source}. Body: {text}");
        ClientError::Parse { endpoint, source }
    })
}

#[async_trait]
impl CommuteBackend for HttpBackend {
    async fn recommend_mode(&self, distance_km: f64) -> Result<TravelMode, ClientError> {
        let request = self.client.get(self.url(&format!("{RECOMMEND_MODE}/{distance_km}")));
        let response = send(RECOMMEND_MODE, request).await?;
        let body: RecommendModeResponse = read_json(RECOMMEND_MODE, response).await?;
        Ok(body.recommended_mode)
    }

    async fn route_with_traffic(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Option<TrafficRoute>, ClientError> {
        let request = self
            .client
            .get(self.url(ROUTE_WITH_TRAFFIC))
            .query(&[("origin", origin.route_key()), ("destination", destination.route_key())]);
        let response = send(ROUTE_WITH_TRAFFIC, request).await?;
        let body: TrafficRouteResponse = read_json(ROUTE_WITH_TRAFFIC, response).await?;
        Ok(body.into_route())
    }

    async fn log_trip(&self, trip: &CommuteRequest) -> Result<TripResult, ClientError> {
        let request = self.client.post(self.url(LOG_TRIP)).json(trip);
        let response = send(LOG_TRIP, request).await?;
        read_json(LOG_TRIP, response).await
    }

    async fn cleanest_route(
        &self,
        user_id: i64,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Option<CleanestRoute>, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("{CLEANEST_ROUTE}/{user_id}")))
            .query(&[("origin", origin.route_key()), ("destination", destination.route_key())]);
        let response = send(CLEANEST_ROUTE, request).await?;
        let body: CleanestRouteResponse = read_json(CLEANEST_ROUTE, response).await?;
        Ok(body.into_route())
    }

    async fn latest_trip(&self, user_id: i64) -> Result<Option<TripSummary>, ClientError> {
        let request = self.client.get(self.url(&format!("{LATEST_TRIP}/{user_id}")));
        let response = send(LATEST_TRIP, request).await?;

        // The backend answers 404 when the user has not logged anything yet
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        read_json(LATEST_TRIP, response).await.map(Some)
    }

    async fn explain_route(&self, summary: &TripSummary) -> Result<String, ClientError> {
        let request = self.client.post(self.url(EXPLAIN_ROUTE)).json(&ExplainRequest::from(summary));
        let response = send(EXPLAIN_ROUTE, request).await?;
        let body: ExplanationResponse = read_json(EXPLAIN_ROUTE, response).await?;

        match body.error {
            Some(message) => Err(ClientError::Service { endpoint: EXPLAIN_ROUTE, message }),
            None => Ok(body.explanation),
        }
    }
}
