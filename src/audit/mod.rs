//! Audit trail
//!
//! Every successful create or state change writes exactly one entry, in the
//! same transaction as the document write. Entries are never rewritten or
//! deleted.
//!
//! Queries scan the scope's `AUDIT_` range, drop entries whose timestamp
//! does not parse or falls outside the window, and apply the field filter.

mod entry;
mod filter;
mod trail;

pub use entry::{AuditLogEntry, AuditOperation};
pub use filter::{AuditFilter, AuditOrder, AuditQuery, TimeWindow};
pub use trail::{audit_key, AuditTrail, AUDIT_KEY_PREFIX};
