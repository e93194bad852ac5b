use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::routing::any;
use axum::{Json, Router};
use herald_config::UpstreamConfig;
use herald_core::ErrorFormatConfig;
use herald_upstream::{UpstreamClient, UpstreamRequest};
use http::{HeaderMap, Method, StatusCode};
use indexmap::IndexMap;
use serde_json::value::RawValue;
use url::Url;

use crate::error::{Result, ServiceError};

/// Provider named on failures the gateway raises itself
const GATEWAY_PROVIDER: &str = "herald";

/// A resolved upstream: where to send calls and what to send with them
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    base_url: Url,
    headers: HeaderMap,
}

impl UpstreamTarget {
    pub const fn new(base_url: Url, headers: HeaderMap) -> Self {
        Self { base_url, headers }
    }

    /// Append `path` below the base URL, keeping the base path
    fn url_for(&self, path: &str, query: Option<&str>) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("upstream base url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        url.set_query(query.filter(|q| !q.is_empty()));

        Ok(url)
    }
}

/// Shared state of the pass-through route
#[derive(Debug, Clone)]
pub struct Gateway {
    client: UpstreamClient,
    targets: Arc<IndexMap<String, UpstreamTarget>>,
}

impl Gateway {
    pub fn new(client: UpstreamClient, targets: IndexMap<String, UpstreamTarget>) -> Self {
        Self {
            client,
            targets: Arc::new(targets),
        }
    }

    /// Build the gateway from the configured upstreams
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or an
    /// upstream carries an invalid header
    pub fn from_config(upstreams: &IndexMap<String, UpstreamConfig>) -> anyhow::Result<Self> {
        let client = UpstreamClient::new()?;

        let targets = upstreams
            .iter()
            .map(|(name, upstream)| {
                let target = UpstreamTarget::new(upstream.base_url.clone(), upstream.header_map()?);
                Ok((name.clone(), target))
            })
            .collect::<anyhow::Result<IndexMap<_, _>>>()?;

        tracing::debug!(count = targets.len(), "upstreams registered");

        Ok(Self::new(client, targets))
    }

    /// Forward one call to the named upstream and return its payload
    ///
    /// Bodies travel as raw JSON in both directions so numbers reach the
    /// caller exactly as the upstream wrote them.
    ///
    /// # Errors
    ///
    /// A custom 404 when `name` is not configured; otherwise whatever the
    /// executor raises for the call.
    pub async fn forward(
        &self,
        name: &str,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<Box<RawValue>>,
    ) -> Result<Box<RawValue>> {
        let Some(target) = self.targets.get(name) else {
            let never = self.client.classifier().handle_custom_error(
                StatusCode::NOT_FOUND.as_u16(),
                GATEWAY_PROVIDER,
                ErrorFormatConfig::new()
                    .message(format!("Unknown upstream '{name}'"))
                    .code("upstream_not_found")
                    .field("upstream", name),
                None,
            )?;
            match never {}
        };

        let url = target.url_for(path, query)?;

        let mut request = UpstreamRequest::new(method, url, name).headers(target.headers.clone());
        if let Some(body) = body {
            request = request.raw(body);
        }

        Ok(self.client.request_verbatim(request).await?)
    }
}

/// Router exposing `ANY /upstreams/{name}/{*path}`
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/upstreams/{name}/{*path}", any(forward_handler))
        .with_state(gateway)
}

async fn forward_handler(
    State(gateway): State<Gateway>,
    method: Method,
    Path((name, path)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<Box<RawValue>>> {
    let body = if body.is_empty() {
        None
    } else {
        let raw = serde_json::from_slice(&body)
            .map_err(|e| ServiceError::http(StatusCode::BAD_REQUEST, format!("Request body must be JSON: {e}")))?;
        Some(raw)
    };

    let payload = gateway
        .forward(&name, method, &path, query.as_deref(), body)
        .await?;

    Ok(Json(payload))
}
