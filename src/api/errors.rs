//! API error types
//!
//! Registry errors pass through with their code and severity unchanged; the
//! API adds only request-shape codes of its own.

use std::fmt;

use crate::registry::{RegistryError, Severity};

/// API-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Request is not valid JSON or lacks a field
    DocregInvalidRequest,
    /// `op` names no catalog operation
    DocregUnknownOperation,
}

impl ApiErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::DocregInvalidRequest => "DOCREG_INVALID_REQUEST",
            ApiErrorCode::DocregUnknownOperation => "DOCREG_UNKNOWN_OPERATION",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error with preserved registry error information
#[derive(Debug)]
pub struct ApiError {
    code: String,
    message: String,
    severity: Severity,
}

impl ApiError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::DocregInvalidRequest.code().to_string(),
            message: reason.into(),
            severity: Severity::Error,
        }
    }

    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::DocregUnknownOperation.code().to_string(),
            message: format!("Unknown operation: {}", op.into()),
            severity: Severity::Error,
        }
    }

    /// Pass-through; details are folded into the message
    pub fn from_registry_error(err: RegistryError) -> Self {
        let message = match err.details() {
            Some(details) => format!("{} ({})", err.message(), details),
            None => err.message().to_string(),
        };
        Self {
            code: err.code().code().to_string(),
            message,
            severity: err.severity(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self::from_registry_error(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
