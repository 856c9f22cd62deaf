//! Transaction context supplied by the host
//!
//! The core never reads a clock or invents identities: both come from the
//! transaction the host is executing, so every replica computes the same
//! audit keys and timestamps.

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use uuid::Uuid;

/// Identity of a host transaction, unique per transaction
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId(String);

impl TxId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh random identity, for hosts without their own transaction ids
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity and commit time of the transaction an operation runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    tx_id: TxId,
    timestamp: DateTime<Utc>,
}

impl TxContext {
    pub fn new(tx_id: TxId, timestamp: DateTime<Utc>) -> Self {
        Self { tx_id, timestamp }
    }

    /// Builds a context from a protobuf-style `(seconds, nanos)` timestamp
    ///
    /// Returns `None` if the instant is out of range.
    pub fn from_unix(tx_id: TxId, seconds: i64, nanos: u32) -> Option<Self> {
        let timestamp = Utc.timestamp_opt(seconds, nanos).single()?;
        Some(Self::new(tx_id, timestamp))
    }

    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// RFC 3339 rendering stored in audit entries (UTC, whole seconds)
    pub fn audit_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
