//! docregistry - document registry with an append-only audit trail
//!
//! Documents live in a public or a private scope of a transactional
//! key-value ledger. Every create or state change writes its audit entry in
//! the same transaction, so the two persist together or not at all.
//!
//! The host ledger is reached only through [`ledger::LedgerTx`];
//! [`ledger::MemoryLedger`] is the reference host used by the CLI and tests.

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod observability;
pub mod query;
pub mod registry;
