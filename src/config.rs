//! Endpoint configuration for the inbound step stream.

use std::env;

/// Default WebSocket endpoint of the step producer.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Environment variable overriding the endpoint URL.
pub const WS_URL_ENV: &str = "ARMFLOW_WS_URL";

/// Where to reach the remote step producer.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
  pub url: String,
}

impl ConnectionConfig {
  pub fn new(url: impl Into<String>) -> Self {
    Self { url: url.into() }
  }

  /// Endpoint from `ARMFLOW_WS_URL`, falling back to [DEFAULT_WS_URL].
  pub fn from_env() -> Self {
    let url = env::var(WS_URL_ENV).unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
    Self { url }
  }
}

impl Default for ConnectionConfig {
  fn default() -> Self {
    Self::new(DEFAULT_WS_URL)
  }
}
