pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod http;
pub mod latest;
pub mod pipeline;
pub mod refresher;
pub mod render;
pub mod selector;

#[cfg(test)]
mod fakes;

pub use client::*;
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError};
