use std::{env, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_ID: i64 = 1;
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

pub const API_URL_VAR: &str = "ECO_COMMUTE_API_URL";
pub const GEOCODER_URL_VAR: &str = "ECO_COMMUTE_GEOCODER_URL";
pub const USER_ID_VAR: &str = "ECO_COMMUTE_USER_ID";
pub const TIMEOUT_VAR: &str = "ECO_COMMUTE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub geocoder_url: String,
    /// There is no login. Every trip is logged for this user.
    pub user_id: i64,
    /// Upper bound for each network stage. Expiry is reported like any other request failure.
    pub stage_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_owned(),
            user_id: DEFAULT_USER_ID,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` yields for the known variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            config.api_base_url = url;
        }
        if let Some(url) = lookup(GEOCODER_URL_VAR) {
            config.geocoder_url = url;
        }
        if let Some(value) = lookup(USER_ID_VAR) {
            config.user_id = value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: USER_ID_VAR,
                value: value.clone(),
                expected: "user id",
            })?;
        }
        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs: u64 = value
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    var: TIMEOUT_VAR,
                    value: value.clone(),
                    expected: "positive number of seconds",
                })?;
            config.stage_timeout = Duration::from_secs(secs);
        }

        config.api_base_url = trim_base(&config.api_base_url);
        config.geocoder_url = trim_base(&config.geocoder_url);

        Ok(config)
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}
