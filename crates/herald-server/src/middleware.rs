use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use herald_config::EnvelopeConfig;
use herald_core::{Clock, FailureBody, RequestContext};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use serde_json::value::RawValue;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{RaisedFailure, ServiceError};
use crate::translate::ErrorTranslator;
use crate::wrap::SuccessWrapper;

/// Largest framework error body read back for its message
const FRAMEWORK_BODY_LIMIT: usize = 64 * 1024;

/// Both envelope renderers, shared by every request
#[derive(Debug, Clone, Default)]
pub struct Envelopes {
    translator: ErrorTranslator,
    wrapper: SuccessWrapper,
}

impl Envelopes {
    pub fn new(clock: Arc<dyn Clock>, config: EnvelopeConfig) -> Self {
        Self {
            translator: ErrorTranslator::new(Arc::clone(&clock)),
            wrapper: SuccessWrapper::new(clock, config),
        }
    }

    pub const fn translator(&self) -> &ErrorTranslator {
        &self.translator
    }

    pub const fn wrapper(&self) -> &SuccessWrapper {
        &self.wrapper
    }

    /// Install envelope rendering and panic capture on `router`
    ///
    /// Must wrap every route so no response leaves the service unenveloped.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(axum::middleware::from_fn_with_state(self, envelope_middleware))
    }

    async fn wrap_response(&self, response: Response, context: &RequestContext) -> Response {
        let (mut parts, body) = response.into_parts();
        let json = is_json(&parts.headers);

        let bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let fault = ServiceError::Unexpected(anyhow::anyhow!("failed to read response body: {e}"));
                return self.translator.translate(&fault, context);
            }
        };

        let data = match decode(&bytes, json) {
            Ok(data) => data,
            Err(e) => {
                let fault = ServiceError::Unexpected(anyhow::anyhow!("handler produced invalid JSON: {e}"));
                return self.translator.translate(&fault, context);
            }
        };

        let encoded = match serde_json::to_vec(&self.wrapper.wrap(data)) {
            Ok(encoded) => encoded,
            Err(e) => {
                let fault = ServiceError::Unexpected(anyhow::anyhow!("failed to encode envelope: {e}"));
                return self.translator.translate(&fault, context);
            }
        };

        parts.headers.remove(CONTENT_LENGTH);
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Response::from_parts(parts, Body::from(encoded))
    }
}

/// Render every response leaving the service into an envelope
///
/// Failures raised by handlers, error statuses produced by the framework
/// itself (unknown route, wrong method, extractor rejections) and
/// successful JSON or text bodies all come out in the same shape.
pub async fn envelope_middleware(State(envelopes): State<Envelopes>, request: Request, next: Next) -> Response {
    let context = RequestContext::from_parts(request.method(), request.uri());

    let response = next.run(request).await;

    if let Some(RaisedFailure(failure)) = response.extensions().get::<RaisedFailure>().cloned() {
        return envelopes.translator.translate(&failure, &context);
    }

    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let failure = framework_failure(response).await;
        return envelopes.translator.translate(&failure, &context);
    }

    if !is_wrappable(&response) {
        return response;
    }

    envelopes.wrap_response(response, &context).await
}

/// Turn a handler panic into an unexpected fault
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_owned()))
        .unwrap_or_else(|| "non-string panic payload".to_owned());

    ServiceError::Unexpected(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

/// Rebuild an error status that never went through a handler result
async fn framework_failure(response: Response) -> ServiceError {
    let status = response.status();

    let text = axum::body::to_bytes(response.into_body(), FRAMEWORK_BODY_LIMIT)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_owned())
        .unwrap_or_default();

    if text.is_empty() {
        return ServiceError::http(status, status.canonical_reason().unwrap_or("Http Exception"));
    }

    match serde_json::from_str::<serde_json::Map<String, Value>>(&text) {
        Ok(object) => ServiceError::http(status, FailureBody::Object(object)),
        Err(_) => ServiceError::http(status, text),
    }
}

fn is_wrappable(response: &Response) -> bool {
    let status = response.status();

    if !status.is_success() || status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return false;
    }

    match response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        None => true,
        Some(content_type) => is_json(response.headers()) || content_type.starts_with("text/plain"),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            let essence = ct.split(';').next().unwrap_or_default().trim();
            essence == "application/json" || essence.ends_with("+json")
        })
}

/// Handler body as embedded JSON, never re-parsed into numbers
fn decode(bytes: &Bytes, json: bool) -> Result<Box<RawValue>, serde_json::Error> {
    if bytes.is_empty() {
        return RawValue::from_string("null".to_owned());
    }

    if json {
        serde_json::from_slice(bytes)
    } else {
        serde_json::value::to_raw_value(&String::from_utf8_lossy(bytes))
    }
}
