//! Document registry
//!
//! One implementation serves both scopes. Mutations write the document and
//! then append the audit entry inside the caller's transaction; if either
//! step fails the error is returned and the host aborts, so neither persists.

use std::sync::Arc;

use crate::audit::{AuditFilter, AuditLogEntry, AuditOrder, AuditQuery, AuditTrail, TimeWindow};
use crate::ledger::{LedgerTx, Scope};
use crate::observability::{log_event, Event, RegistryMetrics};
use crate::query::{collect_matching, DocumentFilter};

use super::document::{DocumentKind, StatefulDocument};
use super::errors::RegistryResult;
use super::store::DocumentStore;

/// Default number of entries fetched per scan page
pub const DEFAULT_SCAN_PAGE_SIZE: usize = 100;

/// Tunables shared by both registries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    pub scan_page_size: usize,
    pub audit_order: AuditOrder,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
            audit_order: AuditOrder::Key,
        }
    }
}

/// Registry of one document kind and its audit trail
#[derive(Debug, Clone)]
pub struct Registry<D> {
    store: DocumentStore<D>,
    trail: AuditTrail,
    options: RegistryOptions,
    metrics: Arc<RegistryMetrics>,
}

/// Registry of public documents
pub type PublicRegistry = Registry<super::PublicDocument>;

/// Registry of private documents
pub type PrivateRegistry = Registry<super::PrivateDocument>;

impl<D: DocumentKind> Registry<D> {
    pub fn new(options: RegistryOptions, metrics: Arc<RegistryMetrics>) -> Self {
        Self {
            store: DocumentStore::new(),
            trail: AuditTrail::new(D::SCOPE),
            options,
            metrics,
        }
    }

    pub fn scope(&self) -> Scope {
        D::SCOPE
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    /// Stores `document` and records its creation
    ///
    /// An existing document with the same id is overwritten; the audit entry
    /// does not distinguish this from a first creation.
    pub fn create<T: LedgerTx + ?Sized>(&self, tx: &mut T, document: D) -> RegistryResult<()> {
        self.store.put(tx, &document)?;

        let entry = AuditLogEntry::for_create(tx.context(), &document);
        self.trail.append(tx, &entry, &self.metrics)?;

        self.metrics.increment_documents_created();
        log_event(
            Event::DocumentCreated,
            &[
                ("document_id", document.document_id()),
                ("scope", D::SCOPE.as_str()),
                ("tx_id", tx.context().tx_id().as_str()),
            ],
        );
        Ok(())
    }

    pub fn get_document_by_id<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        document_id: &str,
    ) -> RegistryResult<D> {
        self.store.get(tx, document_id)
    }

    /// Every document whose institution equals `institution`
    pub fn query_by_institution<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        institution: &str,
    ) -> RegistryResult<Vec<D>> {
        self.query_documents(tx, DocumentFilter::Institution(institution.to_string()))
    }

    /// Every document whose user equals `user_id`
    pub fn query_by_user<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        user_id: &str,
    ) -> RegistryResult<Vec<D>> {
        self.query_documents(tx, DocumentFilter::UserId(user_id.to_string()))
    }

    fn query_documents<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        filter: DocumentFilter,
    ) -> RegistryResult<Vec<D>> {
        let mut records = self.store.scan_all(tx, self.options.scan_page_size);
        let result = collect_matching(records.by_ref(), &filter);
        self.metrics.add_records_skipped(records.skipped());

        let documents = result?;
        self.record_query("documents", documents.len());
        Ok(documents)
    }

    /// Audit entries matching `filter_type`/`filter_value` whose timestamp
    /// lies in `[start_date, end_date]`
    ///
    /// An unrecognized `filter_type` yields an empty result. A bound that
    /// is not RFC 3339 is read as the zero instant.
    pub fn query_audit_logs<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        filter_type: &str,
        filter_value: &str,
        start_date: &str,
        end_date: &str,
    ) -> RegistryResult<Vec<AuditLogEntry>> {
        let window = TimeWindow::parse(start_date, end_date);
        let query = AuditQuery::new(AuditFilter::parse(filter_type, filter_value), window);
        self.audit_logs(tx, &query)
    }

    /// Typed form of [`Registry::query_audit_logs`]
    pub fn audit_logs<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        query: &AuditQuery,
    ) -> RegistryResult<Vec<AuditLogEntry>> {
        let entries = self.trail.scan_window(
            tx,
            query,
            self.options.audit_order,
            self.options.scan_page_size,
            &self.metrics,
        )?;
        self.record_query("audit", entries.len());
        Ok(entries)
    }

    fn record_query(&self, target: &str, returned: usize) {
        self.metrics.increment_queries();
        let returned = returned.to_string();
        log_event(
            Event::QueryComplete,
            &[
                ("returned", returned.as_str()),
                ("scope", D::SCOPE.as_str()),
                ("target", target),
            ],
        );
    }
}

impl<D: StatefulDocument> Registry<D> {
    /// Replaces the state of an existing document and records the change
    ///
    /// Any string is accepted, including the current state; a no-op
    /// transition still produces an audit entry.
    pub fn update_state<T: LedgerTx + ?Sized>(
        &self,
        tx: &mut T,
        document_id: &str,
        new_state: &str,
    ) -> RegistryResult<()> {
        let mut document = self.store.get(&*tx, document_id)?;
        let old_state = document.replace_state(new_state.to_string());
        self.store.put(tx, &document)?;

        let entry = AuditLogEntry::for_state_change(
            tx.context(),
            &document,
            old_state.clone(),
            new_state.to_string(),
        );
        self.trail.append(tx, &entry, &self.metrics)?;

        self.metrics.increment_state_updates();
        log_event(
            Event::DocumentStateUpdated,
            &[
                ("document_id", document_id),
                ("new_state", new_state),
                ("old_state", old_state.as_str()),
                ("scope", D::SCOPE.as_str()),
            ],
        );
        Ok(())
    }
}
