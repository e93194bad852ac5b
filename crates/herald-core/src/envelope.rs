use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Uniform wire shape for every response, successful or not
///
/// On the success path `data` is set and `error` is absent; on the failure
/// path `data` is `null` and `error` is present. `success` and `timestamp`
/// may be switched off for success responses but are always written for
/// failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    /// Success envelope with every field populated
    pub fn success(data: T, timestamp: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: Some(true),
            timestamp: Some(timestamp.into()),
        }
    }

    /// Failure envelope; shares the error's timestamp
    pub fn failure(error: ErrorEnvelope) -> Self {
        let timestamp = error.timestamp.clone();

        Self {
            data: None,
            error: Some(error),
            success: Some(false),
            timestamp: Some(timestamp),
        }
    }

    pub const fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Error half of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status: u16,
    pub status_code: u16,
    /// Always a list, even for a single message
    pub message: Vec<String>,
    pub error: String,
    pub timestamp: String,
    pub path: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_fields: Option<Map<String, Value>>,
}

/// Coerce an arbitrary message value into a list of strings
///
/// Arrays keep one entry per element, strings pass through, objects are
/// JSON-encoded and everything else uses its JSON text.
pub fn message_lines(message: &Value) -> Vec<String> {
    match message {
        Value::Array(items) => items.iter().map(stringify).collect(),
        other => vec![stringify(other)],
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_error() -> ErrorEnvelope {
        ErrorEnvelope {
            status: 404,
            status_code: 404,
            message: vec!["Not Found".to_owned()],
            error: "API Error from store-api".to_owned(),
            timestamp: "2024-01-01T00:00:00.000Z".to_owned(),
            path: "/stores/1".to_owned(),
            method: "GET".to_owned(),
            provider: Some("store-api".to_owned()),
            code: None,
            additional_fields: None,
        }
    }

    #[test]
    fn message_lines_cover_every_shape() {
        assert_eq!(message_lines(&json!("boom")), vec!["boom"]);
        assert_eq!(message_lines(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(message_lines(&json!({ "field": "email" })), vec![r#"{"field":"email"}"#]);
        assert_eq!(message_lines(&json!(42)), vec!["42"]);
        assert_eq!(message_lines(&Value::Null), vec!["null"]);
        assert_eq!(message_lines(&json!(["a", 1])), vec!["a", "1"]);
    }

    #[test]
    fn failure_envelope_serializes_camel_case() {
        let envelope = ResponseEnvelope::<Value>::failure(sample_error());

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "data": null,
                "error": {
                    "status": 404,
                    "statusCode": 404,
                    "message": ["Not Found"],
                    "error": "API Error from store-api",
                    "timestamp": "2024-01-01T00:00:00.000Z",
                    "path": "/stores/1",
                    "method": "GET",
                    "provider": "store-api"
                },
                "success": false,
                "timestamp": "2024-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn failure_parses_back_with_flag_matching_error() {
        let raw = serde_json::to_string(&ResponseEnvelope::<Value>::failure(sample_error())).unwrap();
        let parsed: ResponseEnvelope<Value> = serde_json::from_str(&raw).unwrap();

        assert!(parsed.is_failure());
        assert_eq!(parsed.success, Some(false));
        assert_eq!(parsed.error.unwrap().message, vec!["Not Found"]);
    }

    #[test]
    fn success_envelope_has_no_error_key() {
        let envelope = ResponseEnvelope::success(json!([1, 2, 3]), "2024-01-01T00:00:00.000Z");

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({ "data": [1, 2, 3], "success": true, "timestamp": "2024-01-01T00:00:00.000Z" })
        );
    }
}
