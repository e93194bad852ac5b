use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use herald_core::{FailureBody, HttpError};
use herald_upstream::{ExecutorError, UpstreamFailure};
use http::StatusCode;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Any failure a handler can return
///
/// Handlers never serialize errors themselves. Converting into a response
/// only records the failure; the envelope middleware renders it with the
/// request's method and path.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Classified upstream error or caller-worded custom error
    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    /// HTTP error raised directly by service code or the framework
    #[error("{}", .status.canonical_reason().unwrap_or("Http Exception"))]
    Http { status: StatusCode, body: FailureBody },

    /// Fault with no HTTP status; never exposed to the caller
    #[error("internal error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn http(status: StatusCode, body: impl Into<FailureBody>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Status carried by the failure, `None` for unexpected faults
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream(failure) => Some(failure.status_code()),
            Self::Http { status, .. } => Some(*status),
            Self::Unexpected(_) => None,
        }
    }

    /// Payload for failures that carry a status
    pub fn body(&self) -> Option<FailureBody> {
        match self {
            Self::Upstream(failure) => Some(failure.failure_body()),
            Self::Http { body, .. } => Some(body.clone()),
            Self::Unexpected(_) => None,
        }
    }
}

impl From<ExecutorError> for ServiceError {
    fn from(error: ExecutorError) -> Self {
        match error {
            ExecutorError::Rejected(failure) => Self::Upstream(failure),
            other => Self::Unexpected(anyhow::Error::new(other)),
        }
    }
}

/// Response extension marking a failure that still needs rendering
#[derive(Debug, Clone)]
pub struct RaisedFailure(pub Arc<ServiceError>);

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = status.into_response();
        response.extensions_mut().insert(RaisedFailure(Arc::new(self)));
        response
    }
}

#[cfg(test)]
mod tests {
    use herald_core::{ErrorFormatConfig, ErrorRecord};
    use herald_upstream::ErrorClassifier;

    use super::*;

    #[test]
    fn rejected_executor_error_keeps_its_status() {
        let failure = ErrorClassifier::new()
            .handle_http_error(409, ErrorRecord::new("Conflict", 409, "store-api"))
            .unwrap_err();

        let error = ServiceError::from(ExecutorError::Rejected(failure));
        assert_eq!(error.status(), Some(StatusCode::CONFLICT));
        assert!(matches!(error.body(), Some(FailureBody::Record(_))));
    }

    #[test]
    fn decode_error_becomes_unexpected() {
        let decode = serde_json::from_str::<u32>("\"nope\"").unwrap_err();

        let error = ServiceError::from(ExecutorError::Decode(decode));
        assert!(error.status().is_none());
        assert!(error.body().is_none());
    }

    #[test]
    fn into_response_attaches_failure() {
        let failure = ErrorClassifier::new()
            .handle_custom_error(404, "hub-bff", ErrorFormatConfig::new().code("store_not_found"), None)
            .unwrap_err();

        let response = ServiceError::from(failure).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<RaisedFailure>().is_some());
    }

    #[test]
    fn unexpected_fault_responds_500() {
        let response = ServiceError::from(anyhow::anyhow!("boom")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
