use std::time::Duration;

use serde::{Deserialize, Serialize};
use shortener_core::Settlement;
use thiserror::Error;
use url::Url;

/// How the `{url}` payload is written into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayloadEncoding {
    /// `application/x-www-form-urlencoded`: `url=<value>`.
    #[default]
    Form,
    /// `application/json`: `{"url": "<value>"}`.
    Json,
}

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Base for endpoints given as relative paths such as `/api/shorten`.
    pub base_url: Option<Url>,
    pub payload: PayloadEncoding,
    pub connect_timeout: Option<Duration>,
    /// Unset by default: a request fails only when the transport reports an error.
    pub request_timeout: Option<Duration>,
    pub max_body_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            payload: PayloadEncoding::Form,
            connect_timeout: None,
            request_timeout: None,
            max_body_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Settled(Settlement),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("engine has shut down")]
    Closed,
}
