//! Document store
//!
//! Maps a document id to its JSON record in the scope's document collection.
//! Writes overwrite; nothing here checks for an existing record.

use std::marker::PhantomData;

use crate::ledger::{Collection, KeyRange, LedgerTx};
use crate::query::{RangeScan, Records};

use super::document::DocumentKind;
use super::errors::{RegistryError, RegistryResult};

#[derive(Debug, Clone)]
pub struct DocumentStore<D> {
    collection: Collection,
    _kind: PhantomData<fn() -> D>,
}

impl<D: DocumentKind> DocumentStore<D> {
    pub fn new() -> Self {
        Self {
            collection: Collection::documents(D::SCOPE),
            _kind: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn put<T: LedgerTx + ?Sized>(&self, tx: &mut T, document: &D) -> RegistryResult<()> {
        let id = document.document_id();
        let bytes = serde_json::to_vec(document).map_err(|e| RegistryError::serialization(id, e))?;
        tx.put(&self.collection, id, bytes)
            .map_err(|e| RegistryError::store_failure("document write failed", e))
    }

    /// Fails with NotFound if nothing is stored at `id`, and with a
    /// serialization error if the stored bytes do not decode
    pub fn get<T: LedgerTx + ?Sized>(&self, tx: &T, id: &str) -> RegistryResult<D> {
        let bytes = tx
            .get(&self.collection, id)
            .map_err(|e| RegistryError::store_failure("document read failed", e))?
            .ok_or_else(|| RegistryError::not_found(id))?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::serialization(id, e))
    }

    /// Every decodable record in the collection, in key order
    pub fn scan_all<'t, T: LedgerTx + ?Sized>(
        &self,
        tx: &'t T,
        page_size: usize,
    ) -> Records<'t, T, D> {
        Records::new(RangeScan::new(tx, self.collection, KeyRange::all(), page_size))
    }
}

impl<D: DocumentKind> Default for DocumentStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{MemoryLedger, Scope, TxContext, TxId};
    use crate::registry::{PrivateDocument, PublicDocument};

    fn ctx(id: &str) -> TxContext {
        TxContext::from_unix(TxId::new(id), 1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let store = DocumentStore::<PublicDocument>::new();
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(ctx("tx1"));
        store.put(&mut tx, &PublicDocument::new("d1", "BankA", "u1")).unwrap();

        let doc = store.get(&tx, "d1").unwrap();
        assert_eq!(doc, PublicDocument::new("d1", "BankA", "u1"));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = DocumentStore::<PublicDocument>::new();
        let mut ledger = MemoryLedger::new();
        let tx = ledger.begin(ctx("tx1"));
        assert!(store.get(&tx, "nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_malformed_is_serialization_error() {
        let store = DocumentStore::<PrivateDocument>::new();
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(ctx("tx1"));
        tx.put(&store.collection(), "d1", b"[1,2,3]".to_vec()).unwrap();

        let err = store.get(&tx, "d1").unwrap_err();
        assert_eq!(err.code().code(), "DOCREG_SERIALIZATION_ERROR");
    }

    #[test]
    fn test_put_overwrites() {
        let store = DocumentStore::<PublicDocument>::new();
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(ctx("tx1"));
        store.put(&mut tx, &PublicDocument::new("d1", "BankA", "u1")).unwrap();
        store.put(&mut tx, &PublicDocument::new("d1", "BankZ", "u9")).unwrap();

        assert_eq!(store.get(&tx, "d1").unwrap().institution, "BankZ");
    }

    #[test]
    fn test_scopes_use_separate_collections() {
        assert_eq!(
            DocumentStore::<PublicDocument>::new().collection(),
            Collection::documents(Scope::Public)
        );
        assert_eq!(
            DocumentStore::<PrivateDocument>::new().collection(),
            Collection::documents(Scope::Private)
        );
    }

    #[test]
    fn test_scan_all_skips_foreign_records() {
        let store = DocumentStore::<PrivateDocument>::new();
        let mut ledger = MemoryLedger::new();
        let mut tx = ledger.begin(ctx("tx1"));
        tx.put(&store.collection(), "a", b"{\"documentId\":\"a\"}".to_vec()).unwrap();
        tx.commit().unwrap();

        let tx = ledger.begin(ctx("tx2"));
        let mut records = store.scan_all(&tx, 10);
        assert!(records.next().is_none());
        assert_eq!(records.skipped(), 1);
    }
}
