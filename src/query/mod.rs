//! Query engine
//!
//! Filter-and-scan over a collection, shared by document queries and audit
//! queries:
//!
//! 1. `RangeScan` pages through the key range
//! 2. `Records` decodes each value, skipping malformed ones
//! 3. `collect_matching` keeps the records a `Filter` accepts
//!
//! There are no secondary indexes; every query reads its whole range.

mod filters;
mod scan;

pub use filters::{collect_matching, DocumentFilter, Filter};
pub use scan::{RangeScan, Records};
