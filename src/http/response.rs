//! Response translation stage.
//!
//! # Responsibilities
//! - Buffer JSON responses coming back from the handler
//! - Run the geocoding translator over the body
//! - Emit the translated body, or pass the original through untouched
//! - Record request and translation metrics
//!
//! # Design Decisions
//! - Non-JSON responses are never buffered
//! - Unparsable JSON and non-geocoding bodies pass through byte for byte
//! - A body over the configured limit is a 502: the backend answered, but not
//!   with something the gateway can translate

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, response::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::geocoding::{Outcome, ResponseTranslator, TranslateError};
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

/// Route name attached to a response by the handler that produced it.
#[derive(Debug, Clone)]
pub struct RouteLabel(pub String);

/// State of the translation middleware.
#[derive(Clone)]
pub struct TranslationState {
    pub translator: Arc<ResponseTranslator>,
    pub max_body_bytes: usize,
}

/// JSON error body used for failures the gateway itself produces.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for TranslateError {
    fn into_response(self) -> Response {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}

/// Middleware applying the translator to every response.
pub async fn translate_response(
    State(state): State<TranslationState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().to_string();

    let response = next.run(request).await;
    let route = response
        .extensions()
        .get::<RouteLabel>()
        .map(|label| label.0.clone())
        .unwrap_or_else(|| "local".to_string());

    let response = state.apply(response, &request_id).await;
    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}

impl TranslationState {
    pub fn new(translator: ResponseTranslator, max_body_bytes: usize) -> Self {
        Self {
            translator: Arc::new(translator),
            max_body_bytes,
        }
    }

    /// Translate `response` if it carries a geocoding body.
    pub async fn apply(&self, response: Response, request_id: &str) -> Response {
        if !is_json(response.headers()) {
            return response;
        }

        let (parts, body) = response.into_parts();
        let bytes = match axum::body::to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    limit = self.max_body_bytes,
                    error = %e,
                    "Failed to buffer backend response"
                );
                metrics::record_translation("failed", StatusCode::BAD_GATEWAY.as_u16());
                return error_response(StatusCode::BAD_GATEWAY, "Backend response could not be read");
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(request_id = %request_id, error = %e, "Body is not JSON, passing through");
                return pass_through(parts, bytes);
            }
        };

        match self.translator.translate(&value) {
            Ok(Outcome::Delegate) => pass_through(parts, bytes),
            Ok(Outcome::Respond { status, body }) => {
                tracing::debug!(
                    request_id = %request_id,
                    backend_status = %parts.status,
                    status = %status,
                    results = body.results.len(),
                    "Translated geocoding response"
                );
                metrics::record_translation("translated", status.as_u16());
                (status, Json(body)).into_response()
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Translation failed");
                metrics::record_translation("failed", StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                e.into_response()
            }
        }
    }
}

fn pass_through(parts: Parts, bytes: Bytes) -> Response {
    metrics::record_translation("delegated", parts.status.as_u16());
    Response::from_parts(parts, Body::from(bytes))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
