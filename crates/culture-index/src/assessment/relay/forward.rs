use std::time::Duration;

use axum::body::Bytes;
use reqwest::header;
use serde::de::IgnoredAny;
use tracing::debug;

use super::{snippet, Forwarder, RelayError};
use crate::config::RelayConfig;

/// Posts the raw submission to a downstream processor.
///
/// Forwarding is attempted once: the downstream may not be idempotent. The
/// request and reply bodies are passed through byte for byte; the reply is
/// only checked to be JSON.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
}

impl HttpForwarder {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RelayError::from_transport)?;
        Ok(Self {
            client,
            url: url.trim().to_string(),
        })
    }

    /// Returns `None` when no forward URL is configured.
    pub fn from_config(config: &RelayConfig) -> Result<Option<Self>, RelayError> {
        config
            .forward_url
            .as_deref()
            .map(|url| Self::new(url, config.timeout))
            .transpose()
    }
}

impl Forwarder for HttpForwarder {
    async fn forward(&self, payload: Bytes) -> Result<Bytes, RelayError> {
        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(RelayError::from_transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(RelayError::from_transport)?;
        debug!(%status, bytes = body.len(), "forward target responded");

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                snippet: snippet(&String::from_utf8_lossy(&body)),
            });
        }

        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|err| RelayError::Decode(err.to_string()))?;
        Ok(body)
    }
}
