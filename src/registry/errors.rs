//! Registry error types
//!
//! Error codes:
//! - DOCREG_NOT_FOUND (ERROR) - point lookup on a missing document
//! - DOCREG_STORE_FAILURE (ERROR) - the host ledger failed a get/put/scan
//! - DOCREG_SERIALIZATION_ERROR (ERROR) - a record could not be encoded or decoded
//! - DOCREG_INVALID_ARGUMENT (ERROR) - a request could not be interpreted
//! - DOCREG_AUDIT_CONFLICT (FATAL) - an audit key was about to be overwritten
//!
//! Every error aborts the host transaction that produced it.

use std::fmt;

use crate::ledger::LedgerError;

/// Severity levels for registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, registry continues
    Error,
    /// An append-only guarantee was about to be broken
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorCode {
    DocregNotFound,
    DocregStoreFailure,
    DocregSerializationError,
    DocregInvalidArgument,
    DocregAuditConflict,
}

impl RegistryErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryErrorCode::DocregNotFound => "DOCREG_NOT_FOUND",
            RegistryErrorCode::DocregStoreFailure => "DOCREG_STORE_FAILURE",
            RegistryErrorCode::DocregSerializationError => "DOCREG_SERIALIZATION_ERROR",
            RegistryErrorCode::DocregInvalidArgument => "DOCREG_INVALID_ARGUMENT",
            RegistryErrorCode::DocregAuditConflict => "DOCREG_AUDIT_CONFLICT",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RegistryErrorCode::DocregAuditConflict => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for RegistryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug)]
pub struct RegistryError {
    code: RegistryErrorCode,
    message: String,
    /// Key or request context
    details: Option<String>,
    source: Option<LedgerError>,
}

impl RegistryError {
    fn new(code: RegistryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// No document stored under `document_id`
    pub fn not_found(document_id: &str) -> Self {
        Self {
            details: Some(format!("document_id: {}", document_id)),
            ..Self::new(RegistryErrorCode::DocregNotFound, "document not found")
        }
    }

    /// The host ledger failed
    pub fn store_failure(message: impl Into<String>, source: LedgerError) -> Self {
        Self {
            source: Some(source),
            ..Self::new(RegistryErrorCode::DocregStoreFailure, message)
        }
    }

    /// A record at `key` could not be encoded or decoded
    pub fn serialization(key: &str, reason: impl fmt::Display) -> Self {
        Self {
            details: Some(format!("key: {}", key)),
            ..Self::new(
                RegistryErrorCode::DocregSerializationError,
                format!("malformed record: {}", reason),
            )
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RegistryErrorCode::DocregInvalidArgument, message)
    }

    /// An entry already exists at audit key `key`
    pub fn audit_conflict(key: &str) -> Self {
        Self {
            details: Some(format!("key: {}", key)),
            ..Self::new(
                RegistryErrorCode::DocregAuditConflict,
                "audit entry already exists for this transaction",
            )
        }
    }

    pub fn code(&self) -> RegistryErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn is_not_found(&self) -> bool {
        self.code == RegistryErrorCode::DocregNotFound
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<LedgerError> for RegistryError {
    fn from(e: LedgerError) -> Self {
        RegistryError::store_failure("ledger operation failed", e)
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
