//! Key namespaces of the ledger
//!
//! Every value lives in a named collection. Collections never overlap, and
//! keys inside a collection are ordered lexicographically by their UTF-8 bytes,
//! which is also the order `scan_page` yields them in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Isolation boundary deciding which participants can read a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Replicated to every participant
    Public,
    /// Shared only with the members of the private collection
    Private,
}

impl Scope {
    /// Returns the scope name
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Public => "public",
            Scope::Private => "private",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a collection holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Documents,
    AuditLog,
}

/// A named key namespace within one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collection {
    scope: Scope,
    kind: CollectionKind,
}

impl Collection {
    /// Document namespace of a scope
    pub fn documents(scope: Scope) -> Self {
        Self {
            scope,
            kind: CollectionKind::Documents,
        }
    }

    /// Audit namespace of a scope
    pub fn audit(scope: Scope) -> Self {
        Self {
            scope,
            kind: CollectionKind::AuditLog,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Stable name used by hosts to address the collection
    pub fn name(&self) -> &'static str {
        match (self.scope, self.kind) {
            (Scope::Public, CollectionKind::Documents) => "public.documents",
            (Scope::Public, CollectionKind::AuditLog) => "public.audit",
            (Scope::Private, CollectionKind::Documents) => "private.documents",
            (Scope::Private, CollectionKind::AuditLog) => "private.audit",
        }
    }

    /// Every collection a host must be able to serve
    pub fn all() -> [Collection; 4] {
        [
            Collection::documents(Scope::Public),
            Collection::audit(Scope::Public),
            Collection::documents(Scope::Private),
            Collection::audit(Scope::Private),
        ]
    }

    /// Resolves a name produced by [`Collection::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Half-open lexicographic key range `[start, end)`
///
/// `end == None` means unbounded above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    start: String,
    end: Option<String>,
}

impl KeyRange {
    /// The full key space of a collection
    pub fn all() -> Self {
        Self {
            start: String::new(),
            end: None,
        }
    }

    /// Every key beginning with `prefix`
    pub fn prefix(prefix: &str) -> Self {
        Self {
            start: prefix.to_string(),
            end: prefix_successor(prefix),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    /// Whether `key` falls within the range
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && self.end.as_deref().map_or(true, |end| key < end)
    }
}

/// Smallest string greater than every string starting with `prefix`
///
/// Returns `None` when no such string exists (empty prefix or a prefix made
/// only of `char::MAX`).
fn prefix_successor(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = next_char(last) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn next_char(c: char) -> Option<char> {
    let mut code = c as u32 + 1;
    // skip the surrogate block
    if (0xD800..=0xDFFF).contains(&code) {
        code = 0xE000;
    }
    char::from_u32(code)
}
