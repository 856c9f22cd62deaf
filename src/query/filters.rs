//! Record filters
//!
//! Exact string matches only. No coercion, no patterns, no case folding.

use crate::registry::{DocumentKind, RegistryResult};

/// Predicate over a decoded record
pub trait Filter<R> {
    fn matches(&self, record: &R) -> bool;
}

/// Exact match on one indexed document attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFilter {
    Institution(String),
    UserId(String),
}

impl<D: DocumentKind> Filter<D> for DocumentFilter {
    fn matches(&self, document: &D) -> bool {
        match self {
            DocumentFilter::Institution(value) => document.institution() == value,
            DocumentFilter::UserId(value) => document.user_id() == value,
        }
    }
}

/// Drains `records`, keeping those accepted by `filter`
///
/// Stops at the first error.
pub fn collect_matching<R, I, F>(records: I, filter: &F) -> RegistryResult<Vec<R>>
where
    I: Iterator<Item = RegistryResult<R>>,
    F: Filter<R> + ?Sized,
{
    let mut matched = Vec::new();
    for record in records {
        let record = record?;
        if filter.matches(&record) {
            matched.push(record);
        }
    }
    Ok(matched)
}
