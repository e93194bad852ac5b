//! Boundary rendering for failures
//!
//! Every failure that reaches the edge of the service, whatever produced
//! it, is turned into the same error envelope here and nowhere else.

use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use herald_core::{Clock, ErrorEnvelope, FailureBody, RequestContext, ResponseEnvelope, SystemClock, message_lines};
use http::StatusCode;
use serde_json::{Map, Value};

use crate::error::ServiceError;

const UNEXPECTED_MESSAGE: &str = "Internal server error";
const UNEXPECTED_ERROR: &str = "Internal Server Error";
const FALLBACK_ERROR: &str = "Http Exception";

/// Renders failures into error envelopes
#[derive(Clone)]
pub struct ErrorTranslator {
    clock: Arc<dyn Clock>,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for ErrorTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorTranslator").finish_non_exhaustive()
    }
}

/// Fields extracted from a failure before the envelope is assembled
struct Presentation {
    status: StatusCode,
    message: Value,
    error: String,
    provider: Option<String>,
    code: Option<String>,
    additional_fields: Option<Map<String, Value>>,
}

impl ErrorTranslator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Build the envelope without logging
    pub fn envelope(&self, failure: &ServiceError, context: &RequestContext) -> (StatusCode, ResponseEnvelope<Value>) {
        let presentation = present(failure);
        let status = presentation.status.as_u16();

        let error = ErrorEnvelope {
            status,
            status_code: status,
            message: message_lines(&presentation.message),
            error: presentation.error,
            timestamp: self.clock.timestamp(),
            path: context.path.clone(),
            method: context.method.to_string(),
            provider: presentation.provider,
            code: presentation.code,
            additional_fields: presentation.additional_fields,
        };

        (presentation.status, ResponseEnvelope::failure(error))
    }

    /// Log the failure and render it as the wire response
    pub fn translate(&self, failure: &ServiceError, context: &RequestContext) -> Response {
        let (status, envelope) = self.envelope(failure, context);

        log_failure(failure, context, status, &envelope);

        (status, Json(envelope)).into_response()
    }
}

fn present(failure: &ServiceError) -> Presentation {
    let (Some(status), Some(body)) = (failure.status(), failure.body()) else {
        return Presentation {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: Value::String(UNEXPECTED_MESSAGE.to_owned()),
            error: UNEXPECTED_ERROR.to_owned(),
            provider: None,
            code: None,
            additional_fields: None,
        };
    };

    match body {
        FailureBody::Text(text) => Presentation {
            status,
            message: Value::String(text.clone()),
            error: text,
            provider: None,
            code: None,
            additional_fields: None,
        },
        FailureBody::Record(record) => {
            let additional = record.extra().clone();

            Presentation {
                status,
                message: Value::String(record.message().to_owned()),
                error: format!("API Error from {}", record.provider()),
                provider: Some(record.provider().to_owned()),
                code: record.code().map(str::to_owned),
                additional_fields: (!additional.is_empty()).then_some(additional),
            }
        }
        FailureBody::Object(mut object) => {
            let message = object
                .remove("message")
                .filter(|value| !value.is_null())
                .unwrap_or_else(|| Value::String(failure.to_string()));
            let error = object
                .remove("error")
                .filter(|value| !value.is_null())
                .map_or_else(
                    || FALLBACK_ERROR.to_owned(),
                    |value| match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    },
                );

            Presentation {
                status,
                message,
                error,
                provider: None,
                code: None,
                additional_fields: None,
            }
        }
    }
}

fn log_failure(failure: &ServiceError, context: &RequestContext, status: StatusCode, envelope: &ResponseEnvelope<Value>) {
    let Some(ref error) = envelope.error else {
        return;
    };

    let message = serde_json::to_string(&error.message).unwrap_or_default();
    let stack = match failure {
        ServiceError::Unexpected(fault) => Some(format!("{fault:?}")),
        _ => None,
    };

    tracing::error!(
        method = %context.method,
        path = %context.path,
        status = status.as_u16(),
        provider = error.provider.as_deref(),
        message = %message,
        stack = stack.as_deref(),
        "{} {}",
        context.method,
        context.path,
    );
}
