use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::value::RawValue;
use url::Url;

use crate::classify::{ErrorClassifier, UpstreamResponse};
use crate::error::ExecutorError;

/// Description of a single outbound call
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    /// JSON body, sent only when present
    body: Option<Payload>,
    /// Caller headers; these win over the defaults
    pub headers: HeaderMap,
    /// Query parameters appended to `url`
    pub params: Vec<(String, String)>,
    /// Upstream name reported in error records
    pub provider: String,
}

impl UpstreamRequest {
    pub fn new(method: Method, url: Url, provider: impl Into<String>) -> Self {
        Self {
            method,
            url,
            body: None,
            headers: HeaderMap::new(),
            params: Vec::new(),
            provider: provider.into(),
        }
    }

    /// Shorthand for a GET request
    pub fn get(url: &str, provider: impl Into<String>) -> Result<Self, ExecutorError> {
        Ok(Self::new(Method::GET, Url::parse(url)?, provider))
    }

    /// Shorthand for a POST request
    pub fn post(url: &str, provider: impl Into<String>) -> Result<Self, ExecutorError> {
        Ok(Self::new(Method::POST, Url::parse(url)?, provider))
    }

    /// Serialize `body` as the JSON payload
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ExecutorError> {
        let raw = serde_json::value::to_raw_value(body).map_err(ExecutorError::Encode)?;
        self.body = Some(Payload::Raw(raw));
        Ok(self)
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.body = Some(Payload::Value(data));
        self
    }

    /// Send already-encoded JSON byte for byte
    #[must_use]
    pub fn raw(mut self, raw: Box<RawValue>) -> Self {
        self.body = Some(Payload::Raw(raw));
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Value(Value),
    Raw(Box<RawValue>),
}

impl Payload {
    fn into_bytes(self) -> Result<Vec<u8>, ExecutorError> {
        match self {
            Self::Value(value) => serde_json::to_vec(&value).map_err(ExecutorError::Encode),
            Self::Raw(raw) => Ok(raw.get().as_bytes().to_vec()),
        }
    }
}

/// Outbound call executor
///
/// Every response status is a normal completion at the transport level;
/// the classifier alone decides whether the payload is accepted.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    classifier: ErrorClassifier,
}

impl UpstreamClient {
    /// Create a client with a fresh connection pool
    pub fn new() -> Result<Self, ExecutorError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http))
    }

    /// Reuse an existing `reqwest` client
    pub const fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            classifier: ErrorClassifier::new(),
        }
    }

    pub const fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Perform the call and return the accepted payload as a JSON value
    ///
    /// Numbers outside the `i64`/`u64`/`f64` range are rounded by
    /// [`Value`]; use [`Self::request_verbatim`] to keep them exact.
    ///
    /// # Errors
    ///
    /// [`ExecutorError::Rejected`] for any status other than 200/201;
    /// transport faults are passed through unclassified.
    pub async fn request_raw(&self, request: UpstreamRequest) -> Result<Value, ExecutorError> {
        let (status, bytes, provider) = self.send(request).await?;

        let response = UpstreamResponse::new(status, decode_body(&bytes));
        self.classifier
            .validate_response(response, &provider)
            .map_err(ExecutorError::Rejected)
    }

    /// Perform the call and return the accepted payload byte for byte
    ///
    /// Empty bodies become `null` and non-JSON bodies a JSON string, as with
    /// [`Self::request_raw`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_raw`]
    pub async fn request_verbatim(&self, request: UpstreamRequest) -> Result<Box<RawValue>, ExecutorError> {
        let (status, bytes, provider) = self.send(request).await?;

        if !self.classifier.accepts(status) {
            let response = UpstreamResponse::new(status, decode_body(&bytes));
            let never = self.classifier.reject(response, &provider)?;
            match never {}
        }

        verbatim_body(&bytes)
    }

    /// Perform the call and deserialize the accepted payload
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_raw`], plus [`ExecutorError::Decode`] when the
    /// payload does not match `T`.
    pub async fn request<T: DeserializeOwned>(&self, request: UpstreamRequest) -> Result<T, ExecutorError> {
        let raw = self.request_verbatim(request).await?;
        serde_json::from_str(raw.get()).map_err(ExecutorError::Decode)
    }

    async fn send(&self, request: UpstreamRequest) -> Result<(StatusCode, Bytes, String), ExecutorError> {
        let UpstreamRequest {
            method,
            url,
            body,
            headers,
            params,
            provider,
        } = request;

        tracing::debug!(%method, %url, provider = %provider, "calling upstream");

        let mut builder = self
            .http
            .request(method, url)
            .headers(merge_headers(headers));

        if !params.is_empty() {
            builder = builder.query(&params);
        }

        if let Some(body) = body {
            builder = builder.body(body.into_bytes()?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), provider = %provider, "upstream responded");

        Ok((status, bytes, provider))
    }
}

/// Default JSON content type overlaid with the caller's headers
fn merge_headers(caller: HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for name in caller.keys() {
        headers.remove(name);
    }

    for (name, value) in &caller {
        headers.append(name.clone(), value.clone());
    }

    headers
}

/// Empty bodies are absent, non-JSON bodies are kept as text
fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }

    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}

/// Accepted body without re-parsing numbers
fn verbatim_body(bytes: &[u8]) -> Result<Box<RawValue>, ExecutorError> {
    if bytes.is_empty() {
        return RawValue::from_string("null".to_owned()).map_err(ExecutorError::Decode);
    }

    serde_json::from_slice(bytes).or_else(|_| {
        serde_json::value::to_raw_value(&String::from_utf8_lossy(bytes)).map_err(ExecutorError::Encode)
    })
}
