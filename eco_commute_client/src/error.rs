use std::time::Duration;

use eco_commute_lib::CoordinateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed coordinate text. Raised before any request is made.
    #[error("Invalid coordinate: {0}")]
    Validation(#[from] CoordinateError),

    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} did not answer within {after:?}")]
    Timeout {
        endpoint: &'static str,
        after: Duration,
    },

    #[error("{endpoint} reported an error: {message}")]
    Service {
        endpoint: &'static str,
        message: String,
    },
}

impl ClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}
