//! Registry counters
//!
//! Counters only, monotonic, reset on process start. Relaxed atomics: the
//! values are exact once the transaction that produced them has returned.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct RegistryMetrics {
    documents_created: AtomicU64,
    state_updates: AtomicU64,
    audit_entries_appended: AtomicU64,
    queries_executed: AtomicU64,
    records_skipped: AtomicU64,
    transactions_committed: AtomicU64,
    transactions_aborted: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_created: u64,
    pub state_updates: u64,
    pub audit_entries_appended: u64,
    pub queries_executed: u64,
    pub records_skipped: u64,
    pub transactions_committed: u64,
    pub transactions_aborted: u64,
}

impl RegistryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_documents_created(&self) {
        self.documents_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_state_updates(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_audit_entries(&self) {
        self.audit_entries_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_skipped(&self, count: u64) {
        if count > 0 {
            self.records_skipped.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn increment_commits(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aborts(&self) {
        self.transactions_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_created: self.documents_created.load(Ordering::Relaxed),
            state_updates: self.state_updates.load(Ordering::Relaxed),
            audit_entries_appended: self.audit_entries_appended.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            transactions_aborted: self.transactions_aborted.load(Ordering::Relaxed),
        }
    }
}
