//! Experiment platform infrastructure

pub mod http_client;
mod http_platform;

pub use http_client::{HttpClient, HttpClientTrait};
pub use http_platform::{HttpPlatformConnector, HttpPlatformSession, PlatformCredentials};
