//! Lazy, paged range scans
//!
//! A scan asks the host for one page at a time and resumes after the last
//! key it received, so no single host call has to return the whole range.
//! Scans are finite and cannot be restarted; a store error is yielded once
//! and ends the scan.

use std::collections::VecDeque;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::ledger::{Collection, KeyRange, LedgerResult, LedgerTx};
use crate::observability::{log_event, Event};
use crate::registry::{RegistryError, RegistryResult};

/// Raw `(key, bytes)` iterator over a key range of one collection
pub struct RangeScan<'t, T: LedgerTx + ?Sized> {
    tx: &'t T,
    collection: Collection,
    range: KeyRange,
    page_size: usize,
    buffer: VecDeque<(String, Vec<u8>)>,
    cursor: Option<String>,
    pages_fetched: usize,
    exhausted: bool,
}

impl<'t, T: LedgerTx + ?Sized> RangeScan<'t, T> {
    pub fn new(tx: &'t T, collection: Collection, range: KeyRange, page_size: usize) -> Self {
        Self {
            tx,
            collection,
            range,
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            cursor: None,
            pages_fetched: 0,
            exhausted: false,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Number of host calls made so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> LedgerResult<()> {
        let page = self.tx.scan_page(
            &self.collection,
            &self.range,
            self.cursor.as_deref(),
            self.page_size,
        )?;
        self.pages_fetched += 1;

        // a cursor that does not advance would loop forever
        let advanced = page.next_cursor.is_some() && page.next_cursor != self.cursor;
        self.exhausted = page.entries.is_empty() || !advanced;
        self.cursor = page.next_cursor;
        self.buffer.extend(page.entries);
        Ok(())
    }
}

impl<'t, T: LedgerTx + ?Sized> Iterator for RangeScan<'t, T> {
    type Item = LedgerResult<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Some(Ok(entry));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

/// Decodes scanned values as JSON records of type `R`
///
/// Values that fail to decode are skipped and counted; they never fail the
/// scan. Store errors are propagated.
pub struct Records<'t, T: LedgerTx + ?Sized, R> {
    scan: RangeScan<'t, T>,
    skipped: u64,
    _record: PhantomData<fn() -> R>,
}

impl<'t, T: LedgerTx + ?Sized, R: DeserializeOwned> Records<'t, T, R> {
    pub fn new(scan: RangeScan<'t, T>) -> Self {
        Self {
            scan,
            skipped: 0,
            _record: PhantomData,
        }
    }

    /// Number of malformed values left out so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<'t, T: LedgerTx + ?Sized, R: DeserializeOwned> Iterator for Records<'t, T, R> {
    type Item = RegistryResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, bytes) = match self.scan.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let message = format!("range scan of {} failed", self.scan.collection());
                    return Some(Err(RegistryError::store_failure(message, e)));
                }
            };

            match serde_json::from_slice::<R>(&bytes) {
                Ok(record) => return Some(Ok(record)),
                Err(e) => {
                    self.skipped += 1;
                    let collection = self.scan.collection();
                    let reason = e.to_string();
                    log_event(
                        Event::RecordSkipped,
                        &[
                            ("collection", collection.name()),
                            ("key", key.as_str()),
                            ("reason", reason.as_str()),
                        ],
                    );
                }
            }
        }
    }
}
