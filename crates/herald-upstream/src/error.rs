use herald_core::{ErrorRecord, FailureBody, HttpError};
use http::StatusCode;
use strum::{Display, EnumIter};

/// Typed failure kinds raised for upstream errors
///
/// Each kind exposes exactly one HTTP status. Statuses outside the table
/// collapse to [`FailureKind::InternalServerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum FailureKind {
    #[strum(to_string = "Bad Request")]
    BadRequest,
    #[strum(to_string = "Unauthorized")]
    Unauthorized,
    #[strum(to_string = "Forbidden")]
    Forbidden,
    #[strum(to_string = "Not Found")]
    NotFound,
    #[strum(to_string = "Method Not Allowed")]
    MethodNotAllowed,
    #[strum(to_string = "Not Acceptable")]
    NotAcceptable,
    #[strum(to_string = "Request Timeout")]
    RequestTimeout,
    #[strum(to_string = "Conflict")]
    Conflict,
    #[strum(to_string = "Gone")]
    Gone,
    #[strum(to_string = "Payload Too Large")]
    PayloadTooLarge,
    #[strum(to_string = "Unsupported Media Type")]
    UnsupportedMediaType,
    #[strum(to_string = "I'm a teapot")]
    ImATeapot,
    #[strum(to_string = "Unprocessable Entity")]
    UnprocessableEntity,
    #[strum(to_string = "Too Many Requests")]
    TooManyRequests,
    #[strum(to_string = "Internal Server Error")]
    InternalServerError,
    #[strum(to_string = "Service Unavailable")]
    ServiceUnavailable,
}

impl FailureKind {
    /// Select the kind for an upstream status code
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::NotAcceptable,
            408 => Self::RequestTimeout,
            409 => Self::Conflict,
            410 => Self::Gone,
            413 => Self::PayloadTooLarge,
            415 => Self::UnsupportedMediaType,
            418 => Self::ImATeapot,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            503 => Self::ServiceUnavailable,
            _ => Self::InternalServerError,
        }
    }

    /// Status exposed by a failure of this kind
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Gone => StatusCode::GONE,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::ImATeapot => StatusCode::IM_A_TEAPOT,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// A classified upstream error carrying its canonical record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message} ({provider})", message = .record.message(), provider = .record.provider())]
pub struct UpstreamFailure {
    kind: FailureKind,
    record: ErrorRecord,
}

impl UpstreamFailure {
    pub(crate) const fn new(kind: FailureKind, record: ErrorRecord) -> Self {
        Self { kind, record }
    }

    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    pub const fn record(&self) -> &ErrorRecord {
        &self.record
    }
}

impl HttpError for UpstreamFailure {
    fn status_code(&self) -> StatusCode {
        self.kind.status()
    }

    fn failure_body(&self) -> FailureBody {
        FailureBody::Record(self.record.clone())
    }
}

/// Errors from an outbound call
///
/// Only [`ExecutorError::Rejected`] has been through the classifier; the
/// other variants happened before or after any HTTP status was known.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Upstream answered with a non-accepted status
    #[error(transparent)]
    Rejected(#[from] UpstreamFailure),

    /// DNS, connect, timeout or body transfer failure
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request body could not be serialized
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Accepted payload did not match the expected type
    #[error("failed to decode upstream payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request URL could not be parsed
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
