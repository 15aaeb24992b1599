//! Culture maturity assessment: validation, scoring, classification and
//! result relay for a single survey submission.

pub mod domain;
pub mod import;
pub mod levels;
pub mod relay;
pub mod report;
pub mod response;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{AssessmentResult, RawSubmission, Submission};
pub use import::{
    read_submissions, read_submissions_from_path, ImportedSubmission, SubmissionImportError,
};
pub use levels::{classify, ClassificationError, ScoreRange, LEVELS, MAX_SCORE};
pub use relay::{
    DeliveryReceipt, DisabledNotifier, EmailMessage, Forwarder, HttpForwarder, Notifier,
    RelayError, ResendNotifier, RetryPolicy,
};
pub use router::{assessment_router, CorsPolicy, FORWARD_PATH, SUBMIT_PATH};
pub use service::{
    assess, AssessmentService, NotificationSettings, NotificationStatus, SubmissionError,
    SubmissionOutcome,
};
pub use validation::{validate, ValidationError};
