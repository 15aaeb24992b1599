use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{snippet, DeliveryReceipt, EmailMessage, Notifier, RelayError, RetryPolicy};
use crate::config::RelayConfig;

const IDEMPOTENCY_KEY: &str = "Idempotency-Key";

/// Sends email through the Resend REST API (`POST {endpoint}/emails`).
///
/// Every attempt of one send carries the same `Idempotency-Key`, so a retry
/// after a late acknowledgement does not deliver the email twice.
#[derive(Debug, Clone)]
pub struct ResendNotifier {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: Option<String>,
}

impl ResendNotifier {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, RelayError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| RelayError::InvalidCredential)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(RelayError::from_transport)?;

        let url = format!("{}/emails", endpoint.trim().trim_end_matches('/'));
        info!(%url, timeout_secs = timeout.as_secs(), max_attempts = retry.max_attempts, "resend notifier initialized");

        Ok(Self { client, url, retry })
    }

    /// Builds the notifier from configuration; fails when no API key is set.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let api_key = config
            .resend_api_key
            .as_deref()
            .ok_or(RelayError::NotConfigured("RESEND_API_KEY"))?;
        Self::new(
            api_key,
            &config.resend_endpoint,
            config.timeout,
            RetryPolicy::new(config.max_attempts, Duration::from_millis(250)),
        )
    }

    async fn post_once(
        &self,
        message: &EmailMessage,
        key: &str,
    ) -> Result<DeliveryReceipt, RelayError> {
        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .header(IDEMPOTENCY_KEY, key)
            .json(message)
            .send()
            .await
            .map_err(RelayError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RelayError::from_transport)?;
        debug!(%status, latency_ms = started.elapsed().as_millis(), "resend responded");

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                snippet: snippet(&body),
            });
        }

        Ok(match serde_json::from_str::<ResendEmailResponse>(&body) {
            Ok(parsed) => DeliveryReceipt {
                id: parsed.id,
                raw: None,
            },
            Err(_) => DeliveryReceipt {
                id: None,
                raw: Some(body),
            },
        })
    }
}

impl Notifier for ResendNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, RelayError> {
        let key = idempotency_key(message, Utc::now());
        self.retry
            .run("resend", |_| self.post_once(message, &key))
            .await
    }
}

/// Derives the key shared by all attempts of one send.
///
/// The issue time keeps separate sends of an identical message distinct.
fn idempotency_key(message: &EmailMessage, issued_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(issued_at.to_rfc3339().as_bytes());
    for part in [&message.from, &message.subject, &message.html] {
        hasher.update([0u8]);
        hasher.update(part.as_bytes());
    }
    for address in message.to.iter().chain(&message.bcc) {
        hasher.update([0u8]);
        hasher.update(address.as_bytes());
    }
    format!("culture-index-{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            bcc: Vec::new(),
            subject: "s".to_string(),
            html: "<p>h</p>".to_string(),
        }
    }

    #[test]
    fn idempotency_key_is_stable_for_one_send() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(idempotency_key(&message(), at), idempotency_key(&message(), at));
        assert!(idempotency_key(&message(), at).len() <= 256);
    }

    #[test]
    fn idempotency_key_differs_between_sends() {
        let first = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let later = first + chrono::Duration::milliseconds(1);
        assert_ne!(idempotency_key(&message(), first), idempotency_key(&message(), later));

        let mut other = message();
        other.to = vec!["c@example.com".to_string()];
        assert_ne!(idempotency_key(&message(), first), idempotency_key(&other, first));
    }
}
