//! Audit Trail Invariant Tests
//!
//! - A mutation and its audit entry persist together or not at all
//! - One entry per mutation, keyed by transaction id, never overwritten
//! - Time windows are inclusive on both ends
//! - Unrecognized filter types match nothing
//! - Corrupt entries, including unknown operations, are skipped, not fatal

use std::sync::Arc;

use docregistry::audit::{audit_key, AuditLogEntry, AuditOperation, AuditOrder};
use docregistry::ledger::{
    Collection, CollectionKind, KeyRange, LedgerError, LedgerResult, LedgerTx, MemoryLedger,
    MemoryTx, ScanPage, Scope, TxContext, TxId,
};
use docregistry::observability::RegistryMetrics;
use docregistry::registry::{
    PrivateDocument, PrivateRegistry, PublicDocument, PublicRegistry, Registry, RegistryOptions,
};

fn ctx(id: &str, seconds: i64) -> TxContext {
    TxContext::from_unix(TxId::new(id), seconds, 0).unwrap()
}

fn public_registry() -> PublicRegistry {
    Registry::new(RegistryOptions::default(), Arc::new(RegistryMetrics::new()))
}

fn private_registry(order: AuditOrder) -> PrivateRegistry {
    let options = RegistryOptions {
        audit_order: order,
        ..RegistryOptions::default()
    };
    Registry::new(options, Arc::new(RegistryMetrics::new()))
}

fn draft(id: &str) -> PrivateDocument {
    PrivateDocument {
        document_id: id.into(),
        institution: "BankB".into(),
        user_id: "u2".into(),
        name: "file.pdf".into(),
        path: "/path".into(),
        hash: "h123".into(),
        state: "DRAFT".into(),
    }
}

/// Host transaction that refuses every write to an audit collection.
struct AuditRejectingTx<'a> {
    inner: MemoryTx<'a>,
}

impl<'a> LedgerTx for AuditRejectingTx<'a> {
    fn context(&self) -> &TxContext {
        self.inner.context()
    }

    fn get(&self, collection: &Collection, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.inner.get(collection, key)
    }

    fn put(&mut self, collection: &Collection, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        if collection.kind() == CollectionKind::AuditLog {
            return Err(LedgerError::rejected("put", collection.name(), key, "audit quota exceeded"));
        }
        self.inner.put(collection, key, value)
    }

    fn scan_page(
        &self,
        collection: &Collection,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> LedgerResult<ScanPage> {
        self.inner.scan_page(collection, range, after, limit)
    }
}

// =============================================================================
// Atomicity
// =============================================================================

/// A failed audit append fails the operation; the host aborts and the
/// document write never becomes visible.
#[test]
fn test_failed_audit_append_leaves_nothing() {
    let registry = public_registry();
    let mut ledger = MemoryLedger::new();

    let mut tx = AuditRejectingTx {
        inner: ledger.begin(ctx("tx1", 1_714_557_600)),
    };
    let err = registry
        .create(&mut tx, PublicDocument::new("d1", "BankA", "u1"))
        .unwrap_err();
    assert_eq!(err.code().code(), "DOCREG_STORE_FAILURE");
    tx.inner.abort();

    assert!(ledger.is_empty());
    assert_eq!(ledger.height(), 0);
    assert_eq!(registry.metrics().snapshot().documents_created, 0);
}

/// A failed state change leaves the previous state and no new entry.
#[test]
fn test_failed_update_keeps_previous_state() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();

    let mut tx = ledger.begin(ctx("tx1", 1_714_557_600));
    registry.create(&mut tx, draft("d2")).unwrap();
    tx.commit().unwrap();

    let mut tx = AuditRejectingTx {
        inner: ledger.begin(ctx("tx2", 1_714_557_660)),
    };
    assert!(registry.update_state(&mut tx, "d2", "APPROVED").is_err());
    tx.inner.abort();

    let tx = ledger.begin(ctx("tx3", 1_714_557_720));
    assert_eq!(registry.get_document_by_id(&tx, "d2").unwrap().state, "DRAFT");
    let logs = registry
        .query_audit_logs(&tx, "all", "", "2024-01-01T00:00:00Z", "2025-01-01T00:00:00Z")
        .unwrap();
    assert_eq!(logs.len(), 1);
}

// =============================================================================
// Uniqueness
// =============================================================================

/// Distinct transactions produce distinct entries under their own keys.
#[test]
fn test_distinct_transactions_distinct_entries() {
    let registry = public_registry();
    let mut ledger = MemoryLedger::new();

    for (tx_id, doc) in [("txA", "d1"), ("txB", "d2")] {
        let mut tx = ledger.begin(ctx(tx_id, 1_714_557_600));
        registry
            .create(&mut tx, PublicDocument::new(doc, "BankA", "u1"))
            .unwrap();
        tx.commit().unwrap();
    }

    let audit = Collection::audit(Scope::Public);
    assert_eq!(ledger.len(&audit), 2);
    for (tx_id, doc) in [("txA", "d1"), ("txB", "d2")] {
        let bytes = ledger.get_committed(&audit, &audit_key(tx_id)).unwrap();
        let entry: AuditLogEntry = serde_json::from_slice(bytes).unwrap();
        assert_eq!(entry.document_id, doc);
        assert_eq!(entry.tx_id, tx_id);
    }
}

/// A second mutation in one transaction would reuse the audit key and is refused.
#[test]
fn test_second_mutation_in_one_transaction_refused() {
    let registry = public_registry();
    let mut ledger = MemoryLedger::new();

    let mut tx = ledger.begin(ctx("tx1", 1_714_557_600));
    registry
        .create(&mut tx, PublicDocument::new("d1", "BankA", "u1"))
        .unwrap();
    let err = registry
        .create(&mut tx, PublicDocument::new("d2", "BankA", "u1"))
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.code().code(), "DOCREG_AUDIT_CONFLICT");
}

// =============================================================================
// Time Windows and Filters
// =============================================================================

fn three_entries(registry: &PrivateRegistry, ledger: &mut MemoryLedger) {
    // 10:00:00, 10:00:30, 10:01:00 on 2024-05-01
    for (tx_id, seconds) in [("txC", 1_714_557_600), ("txA", 1_714_557_630), ("txB", 1_714_557_660)] {
        let mut tx = ledger.begin(ctx(tx_id, seconds));
        registry.create(&mut tx, draft(&format!("doc-{}", tx_id))).unwrap();
        tx.commit().unwrap();
    }
}

/// Entries exactly at start or end are included.
#[test]
fn test_window_is_inclusive() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    let logs = registry
        .query_audit_logs(&tx, "all", "", "2024-05-01T10:00:00Z", "2024-05-01T10:01:00Z")
        .unwrap();
    assert_eq!(logs.len(), 3);

    let inner = registry
        .query_audit_logs(&tx, "all", "", "2024-05-01T10:00:01Z", "2024-05-01T10:00:59Z")
        .unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].tx_id, "txA");
}

/// Bounds in another offset compare as instants.
#[test]
fn test_window_with_offsets() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    let logs = registry
        .query_audit_logs(&tx, "all", "", "2024-05-01T12:00:00+02:00", "2024-05-01T12:00:00+02:00")
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].tx_id, "txC");
}

/// A window with no entries yields an empty result.
#[test]
fn test_empty_future_window() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    let logs = registry
        .query_audit_logs(&tx, "all", "", "2999-01-01T00:00:00Z", "2999-12-31T00:00:00Z")
        .unwrap();
    assert!(logs.is_empty());
}

/// Unrecognized filter types match nothing and are not errors.
#[test]
fn test_unrecognized_filter_type_is_empty() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    for filter_type in ["hash", "DocumentId", ""] {
        let logs = registry
            .query_audit_logs(&tx, filter_type, "BankB", "2024-01-01T00:00:00Z", "2025-01-01T00:00:00Z")
            .unwrap();
        assert!(logs.is_empty(), "filter type {:?} matched", filter_type);
    }
}

/// An empty start leaves the window open below.
#[test]
fn test_empty_start_bound_keeps_entries() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    let logs = registry
        .query_audit_logs(&tx, "all", "", "", "2025-01-01T00:00:00Z")
        .unwrap();
    assert_eq!(logs.len(), 3);
}

/// A malformed end closes the window before every entry.
#[test]
fn test_malformed_end_bound_is_empty() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    let logs = registry
        .query_audit_logs(&tx, "all", "", "2024-01-01T00:00:00Z", "yesterday")
        .unwrap();
    assert!(logs.is_empty());

    let logs = registry
        .query_audit_logs(&tx, "all", "", "", "not a date")
        .unwrap();
    assert!(logs.is_empty());
}

// =============================================================================
// Ordering and Corruption
// =============================================================================

/// Key order by default; chronological on request.
#[test]
fn test_result_order() {
    let by_key = private_registry(AuditOrder::Key);
    let by_time = private_registry(AuditOrder::Chronological);
    let mut ledger = MemoryLedger::new();
    three_entries(&by_key, &mut ledger);

    let tx = ledger.begin(ctx("read", 1_714_557_700));
    let window = ("2024-01-01T00:00:00Z", "2025-01-01T00:00:00Z");

    let keys: Vec<_> = by_key
        .query_audit_logs(&tx, "all", "", window.0, window.1)
        .unwrap()
        .into_iter()
        .map(|e| e.tx_id)
        .collect();
    assert_eq!(keys, vec!["txA", "txB", "txC"]);

    let times: Vec<_> = by_time
        .query_audit_logs(&tx, "all", "", window.0, window.1)
        .unwrap()
        .into_iter()
        .map(|e| e.tx_id)
        .collect();
    assert_eq!(times, vec!["txC", "txA", "txB"]);
}

/// Corrupt or untimestamped entries are skipped; the rest still return.
#[test]
fn test_corrupt_entries_are_skipped() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let audit = Collection::audit(Scope::Private);
    let bad_time = AuditLogEntry {
        tx_id: "txBad".into(),
        document_id: "doc-x".into(),
        institution: "BankB".into(),
        user_id: "u2".into(),
        operation: AuditOperation::Create,
        old_state: None,
        new_state: Some("DRAFT".into()),
        timestamp: "not a time".into(),
    };
    let mut tx = ledger.begin(ctx("writer", 1_714_557_700));
    tx.put(&audit, "AUDIT_garbage", b"\xff\xfe".to_vec()).unwrap();
    tx.put(&audit, "AUDIT_txBad", serde_json::to_vec(&bad_time).unwrap())
        .unwrap();
    tx.commit().unwrap();

    let tx = ledger.begin(ctx("read", 1_714_557_800));
    let logs = registry
        .query_audit_logs(&tx, "institution", "BankB", "2024-01-01T00:00:00Z", "2025-01-01T00:00:00Z")
        .unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(registry.metrics().snapshot().records_skipped, 1);
}

/// An entry naming an operation outside create/update_state does not decode.
#[test]
fn test_unknown_operation_entry_is_skipped() {
    let registry = private_registry(AuditOrder::Key);
    let mut ledger = MemoryLedger::new();
    three_entries(&registry, &mut ledger);

    let audit = Collection::audit(Scope::Private);
    let recreate = serde_json::json!({
        "txID": "txR",
        "documentId": "doc-r",
        "institution": "BankB",
        "userId": "u2",
        "operation": "recreate",
        "timestamp": "2024-05-01T10:02:00Z"
    });
    let mut tx = ledger.begin(ctx("writer", 1_714_557_700));
    tx.put(&audit, "AUDIT_txR", serde_json::to_vec(&recreate).unwrap())
        .unwrap();
    tx.commit().unwrap();

    let tx = ledger.begin(ctx("read", 1_714_557_800));
    let logs = registry
        .query_audit_logs(&tx, "all", "", "2024-01-01T00:00:00Z", "2025-01-01T00:00:00Z")
        .unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|e| e.tx_id != "txR"));
    assert_eq!(registry.metrics().snapshot().records_skipped, 1);
}
