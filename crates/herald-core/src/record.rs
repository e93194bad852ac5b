use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys that are first-class on an error record and never land in the
/// envelope's `additionalFields` bucket
pub const RESERVED_FIELDS: [&str; 5] = ["message", "status", "provider", "response", "code"];

/// Message used when neither the caller nor the upstream supplies one
pub const DEFAULT_ERROR_MESSAGE: &str = "Error occurred";

/// Whether `key` collides with a first-class record field
pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// Canonical description of a failed upstream call
///
/// Built once per failure and never mutated afterwards. `response` holds the
/// raw upstream body and is `null` when the upstream sent nothing, so the
/// serialized form is always the same shape. Extra keys ride along in a
/// flattened map and survive serialization unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    message: String,
    status: u16,
    provider: String,
    #[serde(default)]
    response: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ErrorRecord {
    /// Create a record with the three mandatory fields
    pub fn new(message: impl Into<String>, status: u16, provider: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            provider: provider.into(),
            response: Value::Null,
            code: None,
            extra: Map::new(),
        }
    }

    /// Build a record from a caller's formatting overrides
    ///
    /// `custom_message` replaces the generic message, `custom_code` becomes
    /// `code`, and every non-reserved additional field is carried as an
    /// extra key. Reserved keys in `additional_fields` are dropped because
    /// the first-class fields already own them.
    pub fn from_format(
        status: u16,
        provider: impl Into<String>,
        format: ErrorFormatConfig,
        original_payload: Option<Value>,
    ) -> Self {
        let ErrorFormatConfig {
            custom_message,
            custom_code,
            additional_fields,
        } = format;

        let record = Self::new(
            custom_message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_owned()),
            status,
            provider,
        )
        .with_response(original_payload)
        .with_extra(additional_fields);

        match custom_code {
            Some(code) => record.with_code(code),
            None => record,
        }
    }

    /// Attach the raw upstream body, normalizing an absent body to `null`
    #[must_use]
    pub fn with_response(mut self, response: Option<Value>) -> Self {
        self.response = response.unwrap_or(Value::Null);
        self
    }

    /// Attach a machine-readable error code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Merge extra keys into the record, skipping reserved names
    #[must_use]
    pub fn with_extra(mut self, fields: Map<String, Value>) -> Self {
        self.extra
            .extend(fields.into_iter().filter(|(key, _)| !is_reserved_field(key)));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Raw upstream body, `Value::Null` when there was none
    pub const fn response(&self) -> &Value {
        &self.response
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Keys beyond the reserved ones
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Caller-supplied overrides for a custom error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFormatConfig {
    /// Replaces the generic provider message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
    /// Becomes the record's `code`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    /// Merged on top of the record
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_fields: Map<String, Value>,
}

impl ErrorFormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.custom_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_fields.insert(key.into(), value.into());
        self
    }
}
