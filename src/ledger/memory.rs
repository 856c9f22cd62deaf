//! In-process reference host
//!
//! `MemoryLedger` holds the committed state; `MemoryTx` stages writes on top
//! of it. Hosts are serialized: holding a `MemoryTx` borrows the ledger
//! mutably, so one transaction runs at a time and its snapshot is stable.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::context::{TxContext, TxId};
use super::errors::LedgerResult;
use super::keys::{Collection, KeyRange};
use super::store::{LedgerTx, ScanPage};

pub(crate) type CollectionMap = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Committed key-value state of every collection
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryLedger {
    pub(crate) collections: CollectionMap,
    pub(crate) height: u64,
}

/// Summary of a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: TxId,
    /// Number of keys written
    pub writes: usize,
    /// Ledger height after the commit
    pub height: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed transactions that wrote at least one key
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Opens a transaction over the current committed state
    pub fn begin(&mut self, context: TxContext) -> MemoryTx<'_> {
        MemoryTx {
            ledger: self,
            context,
            staged: BTreeMap::new(),
        }
    }

    /// Committed value at `key`
    pub fn get_committed(&self, collection: &Collection, key: &str) -> Option<&[u8]> {
        self.collections
            .get(collection.name())
            .and_then(|c| c.get(key))
            .map(Vec::as_slice)
    }

    /// Number of committed keys in a collection
    pub fn len(&self, collection: &Collection) -> usize {
        self.collections.get(collection.name()).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(BTreeMap::is_empty)
    }

    fn scan_committed(
        &self,
        collection: &Collection,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> ScanPage {
        let Some(entries) = self.collections.get(collection.name()) else {
            return ScanPage::default();
        };

        let lower = match after {
            Some(cursor) if cursor >= range.start() => Bound::Excluded(cursor),
            _ => Bound::Included(range.start()),
        };
        let upper = match range.end() {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        if let (Bound::Excluded(lo) | Bound::Included(lo), Bound::Excluded(hi)) = (lower, upper) {
            // BTreeMap::range panics on inverted bounds
            if lo >= hi {
                return ScanPage::default();
            }
        }

        let page: Vec<(String, Vec<u8>)> = entries
            .range::<str, _>((lower, upper))
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        ScanPage::from_entries(page, limit)
    }
}

/// A transaction staged against a [`MemoryLedger`]
#[derive(Debug)]
pub struct MemoryTx<'a> {
    ledger: &'a mut MemoryLedger,
    context: TxContext,
    staged: BTreeMap<(&'static str, String), Vec<u8>>,
}

impl<'a> MemoryTx<'a> {
    /// Number of staged writes
    pub fn staged_writes(&self) -> usize {
        self.staged.len()
    }

    /// Applies every staged write in one step
    pub fn commit(self) -> LedgerResult<CommitReceipt> {
        let MemoryTx {
            ledger,
            context,
            staged,
        } = self;

        let writes = staged.len();
        for ((collection, key), value) in staged {
            ledger
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(key, value);
        }
        if writes > 0 {
            ledger.height += 1;
        }

        Ok(CommitReceipt {
            tx_id: context.tx_id().clone(),
            writes,
            height: ledger.height,
        })
    }

    /// Discards every staged write
    pub fn abort(self) {}
}

impl<'a> LedgerTx for MemoryTx<'a> {
    fn context(&self) -> &TxContext {
        &self.context
    }

    fn get(&self, collection: &Collection, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        if let Some(value) = self.staged.get(&(collection.name(), key.to_string())) {
            return Ok(Some(value.clone()));
        }
        Ok(self.ledger.get_committed(collection, key).map(<[u8]>::to_vec))
    }

    fn put(&mut self, collection: &Collection, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        self.staged
            .insert((collection.name(), key.to_string()), value);
        Ok(())
    }

    fn scan_page(
        &self,
        collection: &Collection,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> LedgerResult<ScanPage> {
        Ok(self.ledger.scan_committed(collection, range, after, limit))
    }
}
