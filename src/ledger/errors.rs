//! # Ledger Errors

use std::io;

use thiserror::Error;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures raised by the host ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The host refused a read or write
    #[error("Ledger rejected {operation} on {collection}/{key}: {reason}")]
    Rejected {
        operation: &'static str,
        collection: String,
        key: String,
        reason: String,
    },

    /// Snapshot file could not be read or written
    #[error("Ledger I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot checksum or structure did not verify
    #[error("Ledger snapshot corrupted: {0}")]
    Corrupted(String),

    /// Snapshot could not be encoded or decoded
    #[error("Ledger encoding error: {0}")]
    Encoding(String),
}

impl LedgerError {
    /// Shorthand for a rejected operation
    pub fn rejected(
        operation: &'static str,
        collection: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LedgerError::Rejected {
            operation,
            collection: collection.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether the persisted ledger must not be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(self, LedgerError::Corrupted(_))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Encoding(e.to_string())
    }
}
