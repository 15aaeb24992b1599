//! Outbound side effects triggered after scoring.
//!
//! The service only sees the [`Notifier`] and [`Forwarder`] traits; the HTTP
//! adapters live in the submodules and tests substitute in-memory fakes.

mod forward;
mod resend;

pub use forward::HttpForwarder;
pub use resend::ResendNotifier;

use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use serde::Serialize;
use tracing::warn;

/// Email handed to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement for an accepted email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: Option<String>,
    /// Provider body kept as text when it was not the expected JSON.
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("relay credential is not a valid header value")]
    InvalidCredential,
    #[error("relay transport failed: {0}")]
    Transport(String),
    #[error("relay returned status {status}: {snippet}")]
    Status { status: u16, snippet: String },
    #[error("relay response could not be decoded: {0}")]
    Decode(String),
}

impl RelayError {
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Transport(_) => true,
            RelayError::Status { status, .. } => *status == 429 || *status >= 500,
            RelayError::NotConfigured(_)
            | RelayError::InvalidCredential
            | RelayError::Decode(_) => false,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        RelayError::Transport(err.without_url().to_string())
    }
}

/// Sends result notifications (the email channel).
pub trait Notifier: Send + Sync {
    fn send(
        &self,
        message: &EmailMessage,
    ) -> impl Future<Output = Result<DeliveryReceipt, RelayError>> + Send;
}

/// Forwards a raw submission to a downstream processor and returns its reply.
///
/// Both directions carry the JSON bytes untouched.
pub trait Forwarder: Send + Sync {
    fn forward(&self, payload: Bytes) -> impl Future<Output = Result<Bytes, RelayError>> + Send;
}

/// Stand-in used when no email credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    async fn send(&self, _message: &EmailMessage) -> Result<DeliveryReceipt, RelayError> {
        Err(RelayError::NotConfigured("RESEND_API_KEY"))
    }
}

/// Bounded retry with linear backoff.
///
/// Callers wrapping a non-idempotent request must make the repeats safe, for
/// example by sending the same idempotency key on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub const fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, RelayError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RelayError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    warn!(%label, attempt, max_attempts, error = %err, "relay attempt failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

pub(crate) fn snippet(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
