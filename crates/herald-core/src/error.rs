use http::StatusCode;
use serde_json::{Map, Value};

use crate::ErrorRecord;

/// Payload carried by a failure that has an HTTP status
///
/// The variant is chosen where the failure is created, so the boundary
/// never has to guess the payload's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureBody {
    /// Bare message
    Text(String),
    /// Canonical record produced by the upstream classifier
    Record(ErrorRecord),
    /// Any other structured payload; `message` and `error` keys are honored
    Object(Map<String, Value>),
}

impl From<ErrorRecord> for FailureBody {
    fn from(record: ErrorRecord) -> Self {
        Self::Record(record)
    }
}

impl From<String> for FailureBody {
    fn from(message: String) -> Self {
        Self::Text(message)
    }
}

impl From<&str> for FailureBody {
    fn from(message: &str) -> Self {
        Self::Text(message.to_owned())
    }
}

/// Trait for domain errors that carry an HTTP status
///
/// Implemented by the upstream failure type and by handler-level errors.
/// The server boundary turns these into error envelopes, keeping domain
/// errors decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code exposed to the caller
    fn status_code(&self) -> StatusCode;

    /// Payload to render into the envelope
    fn failure_body(&self) -> FailureBody;

    /// The failure's own message, used when the payload has none
    fn client_message(&self) -> String {
        self.to_string()
    }
}
