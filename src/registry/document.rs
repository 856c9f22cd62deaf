//! Document kinds
//!
//! The public and private registries share one implementation parameterized
//! by `DocumentKind`. Only kinds that carry a lifecycle state implement
//! `StatefulDocument`, which is what makes `update_state` available.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ledger::Scope;

/// A record the registry can store, look up and query
pub trait DocumentKind: Serialize + DeserializeOwned + Clone + Debug {
    /// Scope whose namespaces hold this kind
    const SCOPE: Scope;

    fn document_id(&self) -> &str;
    fn institution(&self) -> &str;
    fn user_id(&self) -> &str;

    /// State recorded as `newState` in the creation audit entry
    fn initial_state(&self) -> Option<&str>;
}

/// A document with a free-form lifecycle state
pub trait StatefulDocument: DocumentKind {
    fn state(&self) -> &str;

    /// Sets the state, returning the previous one
    fn replace_state(&mut self, new_state: String) -> String;
}

/// Attribute-minimal document visible to every participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDocument {
    pub document_id: String,
    pub institution: String,
    pub user_id: String,
}

impl PublicDocument {
    pub fn new(
        document_id: impl Into<String>,
        institution: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            institution: institution.into(),
            user_id: user_id.into(),
        }
    }
}

impl DocumentKind for PublicDocument {
    const SCOPE: Scope = Scope::Public;

    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn institution(&self) -> &str {
        &self.institution
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn initial_state(&self) -> Option<&str> {
        None
    }
}

/// Document held in the private collection, with content metadata and state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDocument {
    pub document_id: String,
    pub institution: String,
    pub user_id: String,
    pub name: String,
    pub path: String,
    /// Content fingerprint, opaque to the registry
    pub hash: String,
    pub state: String,
}

impl DocumentKind for PrivateDocument {
    const SCOPE: Scope = Scope::Private;

    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn institution(&self) -> &str {
        &self.institution
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn initial_state(&self) -> Option<&str> {
        Some(&self.state)
    }
}

impl StatefulDocument for PrivateDocument {
    fn state(&self) -> &str {
        &self.state
    }

    fn replace_state(&mut self, new_state: String) -> String {
        std::mem::replace(&mut self.state, new_state)
    }
}
