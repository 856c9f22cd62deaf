//! Host ledger contract
//!
//! The registry runs inside transactions provided by a replicated,
//! transactional key-value ledger. This module defines what the registry
//! needs from such a host:
//!
//! - `LedgerTx` - point get/put plus paged range scans within one transaction
//! - `TxContext` - the transaction's identity and commit time
//! - `Collection` / `KeyRange` - key namespaces and scan bounds
//!
//! `MemoryLedger` is an in-process host with atomic commit and a
//! checksum-verified snapshot file, used by the CLI and the tests.

mod context;
mod errors;
mod keys;
mod memory;
mod snapshot;
mod store;

pub use context::{TxContext, TxId};
pub use errors::{LedgerError, LedgerResult};
pub use keys::{Collection, CollectionKind, KeyRange, Scope};
pub use memory::{CommitReceipt, MemoryLedger, MemoryTx};
pub use snapshot::compute_checksum;
pub use store::{LedgerTx, ScanPage};
