use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

/// A named upstream provider
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL; request paths are appended to it
    pub base_url: Url,
    /// Static headers sent with every call
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

impl UpstreamConfig {
    /// Static headers as a typed header map
    ///
    /// # Errors
    ///
    /// Returns an error if a name or value is not a valid HTTP header token
    pub fn header_map(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());

        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| anyhow::anyhow!("invalid header name '{name}': {e}"))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| anyhow::anyhow!("invalid value for header '{name}': {e}"))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}
