use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::de::IgnoredAny;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, warn};

use super::domain::RawSubmission;
use super::relay::{Forwarder, Notifier};
use super::response::{
    error_response, SubmitResponse, MSG_FORWARD_FAILED, MSG_FORWARD_NOT_CONFIGURED,
    MSG_INCOMPLETE_DATA, MSG_INTERNAL, MSG_MALFORMED_BODY, MSG_METHOD_NOT_ALLOWED,
    MSG_SCORE_OUT_OF_RANGE,
};
use super::service::{AssessmentService, SubmissionError};
use crate::config::RelayConfig;

pub const SUBMIT_PATH: &str = "/api/submit";
pub const FORWARD_PATH: &str = "/api/forward";

const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Cross-origin headers stamped on every assessment response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
}

impl CorsPolicy {
    pub fn new(origin: &str) -> Self {
        let allow_origin = HeaderValue::from_str(origin.trim()).unwrap_or_else(|_| {
            warn!(%origin, "allowed origin is not a valid header value, falling back to *");
            HeaderValue::from_static("*")
        });
        Self { allow_origin }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(&config.allowed_origin)
    }
}

/// Router builder exposing the submission and forwarding endpoints.
///
/// A panic while handling a request is answered with the generic 500 envelope
/// and still carries the CORS headers.
pub fn assessment_router<N, F>(service: Arc<AssessmentService<N, F>>, cors: CorsPolicy) -> Router
where
    N: Notifier + 'static,
    F: Forwarder + 'static,
{
    Router::new()
        .route(
            SUBMIT_PATH,
            post(submit_handler::<N, F>)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .route(
            FORWARD_PATH,
            post(forward_handler::<N, F>)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .with_state(service)
        .layer(CatchPanicLayer::custom(internal_error_for_panic))
        .layer(middleware::map_response_with_state(cors, apply_cors))
}

pub(crate) async fn submit_handler<N, F>(
    State(service): State<Arc<AssessmentService<N, F>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    N: Notifier + 'static,
    F: Forwarder + 'static,
{
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(rejection),
    };
    let raw = match serde_json::from_slice::<RawSubmission>(&body) {
        Ok(raw) => raw,
        Err(err) => return SubmissionError::MalformedBody(err.to_string()).into_response(),
    };

    match service.submit(raw).await {
        Ok(outcome) => (StatusCode::OK, Json(SubmitResponse::from(outcome))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn forward_handler<N, F>(
    State(service): State<Arc<AssessmentService<N, F>>>,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    N: Notifier + 'static,
    F: Forwarder + 'static,
{
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(rejection),
    };
    if let Err(err) = serde_json::from_slice::<IgnoredAny>(&body) {
        return SubmissionError::MalformedBody(err.to_string()).into_response();
    }

    match service.forward(body).await {
        Ok(reply) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            reply,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

fn unreadable_body(rejection: BytesRejection) -> Response {
    warn!(status = %rejection.status(), error = %rejection.body_text(), "request body rejected");
    error_response(
        rejection.status(),
        MSG_MALFORMED_BODY,
        Some(rejection.body_text()),
    )
}

fn internal_error_for_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = %message, "request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL, None)
}

pub(crate) async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub(crate) async fn method_not_allowed() -> Response {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        MSG_METHOD_NOT_ALLOWED,
        None,
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

async fn apply_cors(State(cors): State<CorsPolicy>, mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        cors.allow_origin.clone(),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    if cors.allow_origin != "*" {
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
    response
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        match self {
            SubmissionError::MalformedBody(details) => {
                error_response(StatusCode::BAD_REQUEST, MSG_MALFORMED_BODY, Some(details))
            }
            SubmissionError::Validation(err) => error_response(
                StatusCode::BAD_REQUEST,
                MSG_INCOMPLETE_DATA,
                Some(err.to_string()),
            ),
            SubmissionError::Classification(err) => error_response(
                StatusCode::BAD_REQUEST,
                MSG_SCORE_OUT_OF_RANGE,
                Some(err.to_string()),
            ),
            SubmissionError::ForwardNotConfigured => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_FORWARD_NOT_CONFIGURED,
                None,
            ),
            SubmissionError::Forward(err) => error_response(
                StatusCode::BAD_GATEWAY,
                MSG_FORWARD_FAILED,
                Some(err.to_string()),
            ),
        }
    }
}
