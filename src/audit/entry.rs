//! Audit log entries

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::TxContext;
use crate::registry::DocumentKind;

/// Mutating operation an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    Create,
    UpdateState,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOperation::Create => "create",
            AuditOperation::UpdateState => "update_state",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of one mutating operation
///
/// Holds a copy of the document attributes at the time of the mutation; the
/// only links back are `document_id` and `tx_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub document_id: String,
    pub institution: String,
    pub user_id: String,
    pub operation: AuditOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_state: Option<String>,
    /// RFC 3339, derived from the transaction's commit time
    pub timestamp: String,
}

impl AuditLogEntry {
    /// Entry for the creation of `document`
    pub fn for_create<D: DocumentKind>(ctx: &TxContext, document: &D) -> Self {
        Self {
            tx_id: ctx.tx_id().to_string(),
            document_id: document.document_id().to_string(),
            institution: document.institution().to_string(),
            user_id: document.user_id().to_string(),
            operation: AuditOperation::Create,
            old_state: None,
            new_state: document.initial_state().map(str::to_string),
            timestamp: ctx.audit_timestamp(),
        }
    }

    /// Entry for a state change of `document`, which already holds `new_state`
    pub fn for_state_change<D: DocumentKind>(
        ctx: &TxContext,
        document: &D,
        old_state: String,
        new_state: String,
    ) -> Self {
        Self {
            tx_id: ctx.tx_id().to_string(),
            document_id: document.document_id().to_string(),
            institution: document.institution().to_string(),
            user_id: document.user_id().to_string(),
            operation: AuditOperation::UpdateState,
            old_state: Some(old_state),
            new_state: Some(new_state),
            timestamp: ctx.audit_timestamp(),
        }
    }

    /// Parsed `timestamp`, or `None` if it is not valid RFC 3339
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
