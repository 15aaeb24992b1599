use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::domain::{AssessmentResult, RawSubmission, Submission};
use super::levels::{classify, ClassificationError};
use super::relay::{DeliveryReceipt, EmailMessage, Forwarder, Notifier, RelayError};
use super::report::render_result_email;
use super::scoring::total_score;
use super::validation::{validate, ValidationError};
use crate::config::RelayConfig;

/// Scores and classifies a list of answers.
pub fn assess(answers: &[Value]) -> Result<AssessmentResult, ClassificationError> {
    let total = total_score(answers);
    let level = classify(total)?;
    Ok(AssessmentResult {
        total_score: total,
        level_key: level.key,
        description_html: level.description_html,
        description_text: level.description_text,
    })
}

/// Sender identity and recipients for result emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub sender: String,
    pub subject: String,
    pub operator_email: Option<String>,
}

impl NotificationSettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            sender: config.sender.clone(),
            subject: config.subject.clone(),
            operator_email: config.operator_email.clone(),
        }
    }
}

/// Delivery annex attached to every successful scoring response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationStatus {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Provider reply kept as text when it was not the expected JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationStatus {
    fn from_delivery(outcome: Result<DeliveryReceipt, RelayError>) -> Self {
        match outcome {
            Ok(receipt) => Self {
                delivered: true,
                id: receipt.id,
                raw: receipt.raw,
                error: None,
            },
            Err(err) => Self {
                delivered: false,
                id: None,
                raw: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub result: AssessmentResult,
    pub notification: NotificationStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error("forward target is not configured")]
    ForwardNotConfigured,
    #[error("forwarding failed: {0}")]
    Forward(#[source] RelayError),
}

/// Facade composing validation, scoring, classification and relays.
///
/// Notification failures never discard a computed result; they are reported
/// in [`SubmissionOutcome::notification`] instead.
pub struct AssessmentService<N, F> {
    notifier: Arc<N>,
    forwarder: Option<Arc<F>>,
    settings: NotificationSettings,
}

impl<N, F> AssessmentService<N, F>
where
    N: Notifier + 'static,
    F: Forwarder + 'static,
{
    pub fn new(
        notifier: Arc<N>,
        forwarder: Option<Arc<F>>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            notifier,
            forwarder,
            settings,
        }
    }

    /// Validates and scores without any side effect.
    pub fn evaluate(
        &self,
        raw: RawSubmission,
    ) -> Result<(Submission, AssessmentResult), SubmissionError> {
        let submission = validate(raw)?;
        let result = assess(&submission.answers)?;
        Ok((submission, result))
    }

    pub async fn submit(&self, raw: RawSubmission) -> Result<SubmissionOutcome, SubmissionError> {
        let (submission, result) = self.evaluate(raw)?;
        info!(
            company = %submission.company_name,
            company_size = %submission.company_size,
            role = %submission.role,
            total_score = result.total_score,
            maturity_level = result.level_key,
            "assessment scored"
        );

        let message = self.result_email(&submission, &result);
        let delivery = self.notifier.send(&message).await;
        if let Err(err) = &delivery {
            warn!(company = %submission.company_name, error = %err, "result notification failed");
        }

        Ok(SubmissionOutcome {
            result,
            notification: NotificationStatus::from_delivery(delivery),
        })
    }

    /// Relays the untouched payload and returns the downstream reply bytes.
    pub async fn forward(&self, payload: Bytes) -> Result<Bytes, SubmissionError> {
        let forwarder = self
            .forwarder
            .as_ref()
            .ok_or(SubmissionError::ForwardNotConfigured)?;
        forwarder.forward(payload).await.map_err(|err| {
            warn!(error = %err, "submission forwarding failed");
            SubmissionError::Forward(err)
        })
    }

    pub fn result_email(&self, submission: &Submission, result: &AssessmentResult) -> EmailMessage {
        EmailMessage {
            from: self.settings.sender.clone(),
            to: vec![submission.email.clone()],
            bcc: self.settings.operator_email.iter().cloned().collect(),
            subject: self.settings.subject.clone(),
            html: render_result_email(submission, result, Utc::now()),
        }
    }
}
