use async_trait::async_trait;
use eco_commute_lib::{
    view::{ADDRESS_FAILED, ADDRESS_LOADING, ADDRESS_UNKNOWN},
    Coordinate,
};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::ClientConfig,
    error::ClientError,
    http::{read_json, send},
};

const REVERSE: &str = "reverse";

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Human readable name of the place at `at`, `None` if the service has none.
    async fn reverse(&self, at: Coordinate) -> Result<Option<String>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        // Nominatim's usage policy rejects requests without a User-Agent
        let client = Client::builder()
            .timeout(config.stage_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| ClientError::Request { endpoint: REVERSE, source })?;

        Ok(Self::with_client(client, &config.geocoder_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, at: Coordinate) -> Result<Option<String>, ClientError> {
        let request = self
            .client
            .get(format!("{}/{REVERSE}", self.base_url))
            .query(&[
                ("lat", at.latitude().to_string()),
                ("lon", at.longitude().to_string()),
                ("format", "json".to_owned()),
            ]);
        let response = send(REVERSE, request).await?;
        let body: ReverseResponse = read_json(REVERSE, response).await?;
        Ok(body.display_name.filter(|name| !name.trim().is_empty()))
    }
}

/// Address of a selected point as shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Loading,
    Resolved(String),
    Unknown,
    Failed,
}

impl Address {
    pub fn label(&self) -> &str {
        match self {
            Address::Loading => ADDRESS_LOADING,
            Address::Resolved(name) => name,
            Address::Unknown => ADDRESS_UNKNOWN,
            Address::Failed => ADDRESS_FAILED,
        }
    }
}

/// Looks up `at`, degrading any failure to a placeholder.
pub async fn resolve_address(geocoder: &dyn ReverseGeocoder, at: Coordinate) -> Address {
    match geocoder.reverse(at).await {
        Ok(Some(name)) => Address::Resolved(name),
        Ok(None) => Address::Unknown,
        Err(err) => {
            tracing::warn!("Reverse geocoding {at} failed: {err}");
            Address::Failed
        }
    }
}
