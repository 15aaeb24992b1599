use crate::assessment::response::{error_response, MSG_INTERNAL};
use crate::assessment::{ClassificationError, RelayError, SubmissionImportError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Relay(RelayError),
    Import(SubmissionImportError),
    Classification(ClassificationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Relay(err) => write!(f, "relay error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Classification(err) => write!(f, "assessment error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Relay(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Classification(err) => Some(err),
        }
    }
}

/// Unexpected failures surface as a generic 500; the detail stays in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed with internal error");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL, None)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RelayError> for AppError {
    fn from(value: RelayError) -> Self {
        Self::Relay(value)
    }
}

impl From<SubmissionImportError> for AppError {
    fn from(value: SubmissionImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ClassificationError> for AppError {
    fn from(value: ClassificationError) -> Self {
        Self::Classification(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let err = AppError::Relay(RelayError::Transport("dns failure for secret-host".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["ok"], false);
        assert_eq!(payload["error"], MSG_INTERNAL);
        assert!(!String::from_utf8_lossy(&bytes).contains("secret-host"));
    }
}
