//! API response envelope
//!
//! Serialized with the outcome in `status`:
//! `{"status":"ok","data":...}` or
//! `{"status":"error","code":...,"message":...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};

const SERIALIZATION_FALLBACK: &str = r#"{"status":"error","code":"DOCREG_SERIALIZATION_ERROR","message":"response serialization failed"}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Response {
    #[serde(rename = "ok")]
    Success { data: Value },
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

impl Response {
    pub fn success(data: Value) -> Self {
        Response::Success { data }
    }

    pub fn error(err: &ApiError) -> Self {
        Self::failure(err.code(), err.message())
    }

    /// Error envelope for failures raised outside the API layer
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_result(result: ApiResult<Value>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(&e),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| SERIALIZATION_FALLBACK.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// Error code, if this is an error envelope
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Response::Success { .. } => None,
            Response::Error { code, .. } => Some(code),
        }
    }
}
