//! The transaction stub a host exposes to the registry

use super::context::TxContext;
use super::errors::LedgerResult;
use super::keys::{Collection, KeyRange};

/// One bounded page of a range scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Entries in ascending key order
    pub entries: Vec<(String, Vec<u8>)>,
    /// Key to resume after, present only when the page was filled
    pub next_cursor: Option<String>,
}

impl ScanPage {
    /// Builds a page from at most `limit` entries
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>, limit: usize) -> Self {
        let next_cursor = if entries.len() >= limit {
            entries.last().map(|(key, _)| key.clone())
        } else {
            None
        };
        Self {
            entries,
            next_cursor,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// A single host-provided transaction
///
/// All writes are staged and become visible to other transactions only when
/// the host commits. If any operation returns an error the host aborts, so
/// a document write and its audit entry persist together or not at all.
pub trait LedgerTx {
    /// Identity and commit time of this transaction
    fn context(&self) -> &TxContext;

    /// Point lookup, observing writes already staged by this transaction
    fn get(&self, collection: &Collection, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Stage a write
    fn put(&mut self, collection: &Collection, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    /// Read up to `limit` committed entries of `range` strictly after `after`
    fn scan_page(
        &self,
        collection: &Collection,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> LedgerResult<ScanPage>;
}
