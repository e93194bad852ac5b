//! Upstream status classification
//!
//! Turns a provider's status code and payload into a canonical
//! [`ErrorRecord`] and raises the typed [`UpstreamFailure`] for it.

use std::convert::Infallible;

use herald_core::{DEFAULT_ERROR_MESSAGE, ErrorFormatConfig, ErrorRecord};
use http::StatusCode;
use serde_json::Value;

use crate::error::{FailureKind, UpstreamFailure};

/// Log tag attached to every classified upstream error
pub const PROVIDER_ERROR_TAG: &str = "Api Provider Error";

/// What the executor hands over after a call completes
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    /// Decoded body; `None` when the upstream sent nothing
    pub data: Option<Value>,
    pub status: StatusCode,
    /// Reason phrase reported for the status
    pub status_text: Option<String>,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, data: Option<Value>) -> Self {
        Self {
            data,
            status,
            // canonical phrase; hyper does not surface the wire reason
            status_text: status.canonical_reason().map(str::to_owned),
        }
    }
}

/// Maps upstream statuses to typed failures
///
/// Stateless; one instance can be shared by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub const fn new() -> Self {
        Self
    }

    /// Only 200 and 201 carry an accepted payload
    pub const fn accepts(&self, status: StatusCode) -> bool {
        matches!(status.as_u16(), 200 | 201)
    }

    /// Accept 200/201 payloads unchanged, raise for everything else
    pub fn validate_response(&self, response: UpstreamResponse, provider: &str) -> Result<Value, UpstreamFailure> {
        if self.accepts(response.status) {
            return Ok(response.data.unwrap_or(Value::Null));
        }

        self.reject(response, provider).map(|never| match never {})
    }

    /// Build the generic record for a refused response and raise it
    pub fn reject(&self, response: UpstreamResponse, provider: &str) -> Result<Infallible, UpstreamFailure> {
        let UpstreamResponse {
            data,
            status,
            status_text,
        } = response;

        let record = ErrorRecord::new(
            status_text.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_owned()),
            status.as_u16(),
            provider,
        )
        .with_response(data);

        self.handle_http_error(status.as_u16(), record)
    }

    /// Raise the failure kind registered for `status`
    ///
    /// Never produces a value. Statuses outside the table raise the generic
    /// internal failure instead of panicking.
    pub fn handle_http_error(&self, status: u16, record: ErrorRecord) -> Result<Infallible, UpstreamFailure> {
        let kind = FailureKind::from_status(status);

        let payload = serde_json::to_string(&record).unwrap_or_else(|_| record.message().to_owned());
        tracing::error!(
            tag = PROVIDER_ERROR_TAG,
            provider = record.provider(),
            status,
            record = %payload,
            "{PROVIDER_ERROR_TAG}"
        );

        Err(UpstreamFailure::new(kind, record))
    }

    /// Raise a failure worded by the caller
    ///
    /// The record is built from `format` and `original_payload`, then goes
    /// through the same status table as classified upstream errors.
    pub fn handle_custom_error(
        &self,
        status: u16,
        provider: &str,
        format: ErrorFormatConfig,
        original_payload: Option<Value>,
    ) -> Result<Infallible, UpstreamFailure> {
        let record = ErrorRecord::from_format(status, provider, format, original_payload);
        self.handle_http_error(status, record)
    }
}
