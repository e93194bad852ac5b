use http::Method;

/// The slice of the inbound request that error envelopes report
///
/// Captured once at the service boundary and handed to the translator
/// explicitly, so the translator never reaches into framework state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method of the inbound request
    pub method: Method,
    /// Request target as received, path plus query string
    pub path: String,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Context for failures raised outside any HTTP request
    pub fn empty() -> Self {
        Self::new(Method::GET, "/")
    }

    /// Build from the request head
    pub fn from_parts(method: &Method, uri: &http::Uri) -> Self {
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());

        Self::new(method.clone(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_query_string() {
        let uri: http::Uri = "http://localhost/stores?category=books".parse().unwrap();
        let ctx = RequestContext::from_parts(&Method::POST, &uri);

        assert_eq!(ctx.method, Method::POST);
        assert_eq!(ctx.path, "/stores?category=books");
    }

    #[test]
    fn empty_context_is_root_get() {
        let ctx = RequestContext::empty();
        assert_eq!(ctx.method, Method::GET);
        assert_eq!(ctx.path, "/");
    }
}
