//! Audit query predicates
//!
//! An audit query is a field filter plus an inclusive time window. Filter
//! types that are not recognized match nothing; they are not errors.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::query::Filter;

use super::entry::AuditLogEntry;

/// Field an audit query matches on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFilter {
    DocumentId(String),
    Institution(String),
    UserId(String),
    All,
    /// Filter type outside the catalog; keeps nothing
    Unrecognized(String),
}

impl AuditFilter {
    /// Interprets a `(filterType, filterValue)` pair; never fails
    pub fn parse(filter_type: &str, filter_value: &str) -> Self {
        match filter_type {
            "documentId" => AuditFilter::DocumentId(filter_value.to_string()),
            "institution" => AuditFilter::Institution(filter_value.to_string()),
            "userId" => AuditFilter::UserId(filter_value.to_string()),
            "all" => AuditFilter::All,
            other => AuditFilter::Unrecognized(other.to_string()),
        }
    }

    /// Whether any entry could match
    pub fn can_match(&self) -> bool {
        !matches!(self, AuditFilter::Unrecognized(_))
    }
}

impl Filter<AuditLogEntry> for AuditFilter {
    fn matches(&self, entry: &AuditLogEntry) -> bool {
        match self {
            AuditFilter::DocumentId(value) => entry.document_id == *value,
            AuditFilter::Institution(value) => entry.institution == *value,
            AuditFilter::UserId(value) => entry.user_id == *value,
            AuditFilter::All => true,
            AuditFilter::Unrecognized(_) => false,
        }
    }
}

/// Closed interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parses RFC 3339 bounds; a bound that does not parse is the zero
    /// instant `0001-01-01T00:00:00Z`
    ///
    /// An empty or malformed start therefore leaves the window open below,
    /// and a malformed end closes it before any real entry.
    pub fn parse(start: &str, end: &str) -> Self {
        Self::new(parse_bound(start), parse_bound(end))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Inclusive on both ends
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

fn parse_bound(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| zero_instant())
}

/// `0001-01-01T00:00:00Z`
fn zero_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Field filter and time window applied together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub filter: AuditFilter,
    pub window: TimeWindow,
}

impl AuditQuery {
    pub fn new(filter: AuditFilter, window: TimeWindow) -> Self {
        Self { filter, window }
    }

    /// Whether the scan can be skipped outright
    pub fn is_vacuous(&self) -> bool {
        !self.filter.can_match() || self.window.is_empty()
    }
}

impl Filter<AuditLogEntry> for AuditQuery {
    /// Entries with an unparseable timestamp never match
    fn matches(&self, entry: &AuditLogEntry) -> bool {
        match entry.parsed_timestamp() {
            Some(instant) if self.window.contains(instant) => self.filter.matches(entry),
            _ => false,
        }
    }
}

/// Order of audit query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOrder {
    /// Storage key order, i.e. by transaction id
    #[default]
    Key,
    /// By timestamp, ties kept in key order
    Chronological,
}

impl AuditOrder {
    pub fn apply(&self, entries: &mut [AuditLogEntry]) {
        if *self == AuditOrder::Chronological {
            entries.sort_by(|a, b| compare_timestamps(a, b));
        }
    }
}

fn compare_timestamps(a: &AuditLogEntry, b: &AuditLogEntry) -> Ordering {
    a.parsed_timestamp().cmp(&b.parsed_timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditOperation;

    fn entry(tx: &str, doc: &str, timestamp: &str) -> AuditLogEntry {
        AuditLogEntry {
            tx_id: tx.into(),
            document_id: doc.into(),
            institution: "BankA".into(),
            user_id: "u1".into(),
            operation: AuditOperation::Create,
            old_state: None,
            new_state: None,
            timestamp: timestamp.into(),
        }
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end)
    }

    #[test]
    fn test_parse_filter_types() {
        assert_eq!(
            AuditFilter::parse("documentId", "d1"),
            AuditFilter::DocumentId("d1".into())
        );
        assert_eq!(
            AuditFilter::parse("institution", "BankA"),
            AuditFilter::Institution("BankA".into())
        );
        assert_eq!(AuditFilter::parse("userId", "u1"), AuditFilter::UserId("u1".into()));
        assert_eq!(AuditFilter::parse("all", "ignored"), AuditFilter::All);
        assert_eq!(
            AuditFilter::parse("DocumentID", "d1"),
            AuditFilter::Unrecognized("DocumentID".into())
        );
    }

    #[test]
    fn test_unrecognized_matches_nothing() {
        let filter = AuditFilter::parse("hash", "h123");
        assert!(!filter.can_match());
        assert!(!filter.matches(&entry("t1", "d1", "2024-01-01T00:00:00Z")));
    }

    #[test]
    fn test_window_inclusive_on_both_ends() {
        let w = window("2024-01-01T00:00:00Z", "2024-01-31T00:00:00Z");
        let q = AuditQuery::new(AuditFilter::All, w);
        assert!(q.matches(&entry("t1", "d1", "2024-01-01T00:00:00Z")));
        assert!(q.matches(&entry("t2", "d1", "2024-01-31T00:00:00Z")));
        assert!(!q.matches(&entry("t3", "d1", "2023-12-31T23:59:59Z")));
        assert!(!q.matches(&entry("t4", "d1", "2024-01-31T00:00:01Z")));
    }

    #[test]
    fn test_unparseable_entry_timestamp_excluded() {
        let q = AuditQuery::new(AuditFilter::All, window("1970-01-01T00:00:00Z", "9999-01-01T00:00:00Z"));
        assert!(!q.matches(&entry("t1", "d1", "not a time")));
    }

    #[test]
    fn test_unparseable_bound_is_zero_instant() {
        let w = TimeWindow::parse("2024-13-01", "2024-01-01T00:00:00Z");
        assert_eq!(w.start(), zero_instant());
        assert_eq!(w.start().to_rfc3339(), "0001-01-01T00:00:00+00:00");
        assert!(w.contains(Utc.with_ymd_and_hms(1990, 6, 1, 0, 0, 0).unwrap()));

        let w = TimeWindow::parse("", "");
        assert!(!w.is_empty());
        assert!(!w.contains(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_inverted_window_is_vacuous() {
        let q = AuditQuery::new(
            AuditFilter::All,
            window("2024-02-01T00:00:00Z", "2024-01-01T00:00:00Z"),
        );
        assert!(q.is_vacuous());
    }

    #[test]
    fn test_chronological_order_is_stable() {
        let mut entries = vec![
            entry("a", "d1", "2024-03-01T00:00:00Z"),
            entry("b", "d2", "2024-01-01T00:00:00Z"),
            entry("c", "d3", "2024-03-01T00:00:00Z"),
            entry("d", "d4", "2024-02-01T00:00:00Z"),
        ];
        AuditOrder::Chronological.apply(&mut entries);
        let txs: Vec<_> = entries.iter().map(|e| e.tx_id.as_str()).collect();
        assert_eq!(txs, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_key_order_leaves_entries_alone() {
        let mut entries = vec![
            entry("a", "d1", "2024-03-01T00:00:00Z"),
            entry("b", "d2", "2024-01-01T00:00:00Z"),
        ];
        AuditOrder::Key.apply(&mut entries);
        assert_eq!(entries[0].tx_id, "a");
    }

    #[test]
    fn test_audit_order_serde() {
        let order: AuditOrder = serde_json::from_str("\"chronological\"").unwrap();
        assert_eq!(order, AuditOrder::Chronological);
        assert_eq!(AuditOrder::default(), AuditOrder::Key);
    }
}
