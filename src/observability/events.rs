//! Observable events of the registry

use std::fmt;

/// Every event the registry and its host wiring log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Host lifecycle
    ConfigLoaded,
    LedgerOpened,
    LedgerPersisted,
    TxCommitted,
    TxAborted,

    // Mutations
    DocumentCreated,
    DocumentStateUpdated,
    AuditAppended,
    /// An audit key already existed; the append was refused
    AuditConflict,

    // Queries
    /// A stored value could not be decoded and was left out of a scan
    RecordSkipped,
    QueryComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::LedgerOpened => "LEDGER_OPENED",
            Event::LedgerPersisted => "LEDGER_PERSISTED",
            Event::TxCommitted => "TX_COMMITTED",
            Event::TxAborted => "TX_ABORTED",
            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::DocumentStateUpdated => "DOCUMENT_STATE_UPDATED",
            Event::AuditAppended => "AUDIT_APPENDED",
            Event::AuditConflict => "AUDIT_CONFLICT",
            Event::RecordSkipped => "RECORD_SKIPPED",
            Event::QueryComplete => "QUERY_COMPLETE",
        }
    }

    /// Events that indicate something went wrong but execution continued
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::RecordSkipped | Event::TxAborted)
    }

    /// Events that indicate a broken invariant
    pub fn is_error(&self) -> bool {
        matches!(self, Event::AuditConflict)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
