//! Append-only audit trail
//!
//! Entries live in the scope's audit collection under `AUDIT_<txId>`. The
//! host guarantees transaction ids are unique, so concurrent mutations never
//! share a key; `append` additionally refuses to write over an existing key,
//! which also limits each transaction to one mutating operation.

use crate::ledger::{Collection, KeyRange, LedgerTx, Scope};
use crate::observability::{log_event, Event, RegistryMetrics};
use crate::query::{collect_matching, RangeScan, Records};
use crate::registry::{RegistryError, RegistryResult};

use super::entry::AuditLogEntry;
use super::filter::{AuditOrder, AuditQuery};

/// Sentinel every audit key starts with
pub const AUDIT_KEY_PREFIX: &str = "AUDIT_";

/// Storage key of the entry written by transaction `tx_id`
pub fn audit_key(tx_id: &str) -> String {
    format!("{}{}", AUDIT_KEY_PREFIX, tx_id)
}

/// Audit trail of one scope
#[derive(Debug, Clone, Copy)]
pub struct AuditTrail {
    collection: Collection,
}

impl AuditTrail {
    pub fn new(scope: Scope) -> Self {
        Self {
            collection: Collection::audit(scope),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Writes `entry` under the current transaction's audit key
    pub fn append<T: LedgerTx + ?Sized>(
        &self,
        tx: &mut T,
        entry: &AuditLogEntry,
        metrics: &RegistryMetrics,
    ) -> RegistryResult<()> {
        let key = audit_key(tx.context().tx_id().as_str());

        let existing = tx
            .get(&self.collection, &key)
            .map_err(|e| RegistryError::store_failure("audit key lookup failed", e))?;
        if existing.is_some() {
            log_event(
                Event::AuditConflict,
                &[("collection", self.collection.name()), ("key", key.as_str())],
            );
            return Err(RegistryError::audit_conflict(&key));
        }

        let bytes =
            serde_json::to_vec(entry).map_err(|e| RegistryError::serialization(&key, e))?;
        tx.put(&self.collection, &key, bytes)
            .map_err(|e| RegistryError::store_failure("audit append failed", e))?;

        metrics.increment_audit_entries();
        log_event(
            Event::AuditAppended,
            &[
                ("collection", self.collection.name()),
                ("document_id", entry.document_id.as_str()),
                ("key", key.as_str()),
                ("operation", entry.operation.as_str()),
            ],
        );
        Ok(())
    }

    /// Entries accepted by `query`, in the requested order
    pub fn scan_window<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        query: &AuditQuery,
        order: AuditOrder,
        page_size: usize,
        metrics: &RegistryMetrics,
    ) -> RegistryResult<Vec<AuditLogEntry>> {
        if query.is_vacuous() {
            return Ok(Vec::new());
        }

        let scan = RangeScan::new(
            tx,
            self.collection,
            KeyRange::prefix(AUDIT_KEY_PREFIX),
            page_size,
        );
        let mut records: Records<'_, T, AuditLogEntry> = Records::new(scan);
        let result = collect_matching(records.by_ref(), query);
        metrics.add_records_skipped(records.skipped());

        let mut entries = result?;
        order.apply(&mut entries);
        Ok(entries)
    }
}
