use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::domain::AssessmentResult;
use super::service::{NotificationStatus, SubmissionOutcome};

pub const MSG_METHOD_NOT_ALLOWED: &str = "Método não permitido";
pub const MSG_INCOMPLETE_DATA: &str = "Dados incompletos";
pub const MSG_MALFORMED_BODY: &str = "Corpo da requisição inválido";
pub const MSG_SCORE_OUT_OF_RANGE: &str = "Pontuação fora do intervalo esperado";
pub const MSG_FORWARD_NOT_CONFIGURED: &str = "URL de encaminhamento não configurada";
pub const MSG_FORWARD_FAILED: &str = "Falha ao encaminhar a submissão";
pub const MSG_INTERNAL: &str = "Erro interno no servidor";

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub result: AssessmentResult,
    pub notification: NotificationStatus,
}

impl From<SubmissionOutcome> for SubmitResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            ok: true,
            result: outcome.result,
            notification: outcome.notification,
        }
    }
}

/// Failure envelope shared by every route: `{ ok: false, error, details? }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn error_response(status: StatusCode, error: &'static str, details: Option<String>) -> Response {
    let body = ErrorBody {
        ok: false,
        error,
        details,
    };
    (status, Json(body)).into_response()
}
