use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured result returned by every permission operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    /// HTTP-style status code
    pub status_code: u16,

    /// Machine-readable reason, see [`status_reasons`]
    pub status_reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Extra information such as `total` for `list`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    /// Human-readable detail for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceResponse {
    pub fn new(status_code: u16, status_reason: impl Into<String>) -> Self {
        Self {
            status_code,
            status_reason: status_reason.into(),
            data: None,
            meta: None,
            message: None,
        }
    }

    /// 200 response carrying `data`.
    pub fn ok(status_reason: impl Into<String>, data: Value) -> Self {
        Self::new(200, status_reason).with_data(data)
    }

    /// Failure response with a detail message.
    pub fn error(
        status_code: u16,
        status_reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(status_code, status_reason)
        }
    }

    /// Generic 500 for store and unexpected failures.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::error(500, status_reasons::INTERNAL_ERROR, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Status reason constants
pub mod status_reasons {
    pub const PERMISSIONS_GIVEN: &str = "PERMISSIONS_GIVEN";

    /// `give` found nothing new to grant
    pub const PERMISSIONS_ALREADY_GIVEN: &str = "PERMISSIONS_ALREADY_GIVEN";

    pub const PERMISSIONS_LOST: &str = "PERMISSIONS_LOST";

    pub const PERMISSIONS_FOUND: &str = "PERMISSIONS_FOUND";

    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

    /// A `{placeholder}` had no value in `data`
    pub const TEMPLATE_KEY_MISSING: &str = "TEMPLATE_KEY_MISSING";

    /// No trusted creator was supplied by the caller environment
    pub const CREATOR_REQUIRED: &str = "CREATOR_REQUIRED";

    pub const UNKNOWN_OPERATION: &str = "UNKNOWN_OPERATION";

    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
