//! API request types
//!
//! JSON request parsing for the operation catalog. Every request names its
//! operation in `op` and the scope it targets in `scope`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ledger::Scope;

use super::errors::{ApiError, ApiResult};

/// Create request; `document` is decoded against the scope's record shape
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDocumentRequest {
    pub scope: Scope,
    pub document: Value,
}

/// State change request; private scope only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStateRequest {
    pub scope: Scope,
    pub document_id: String,
    pub new_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDocumentRequest {
    pub scope: Scope,
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionQueryRequest {
    pub scope: Scope,
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQueryRequest {
    pub scope: Scope,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQueryRequest {
    pub scope: Scope,
    pub filter_type: String,
    pub filter_value: String,
    pub start_date: String,
    pub end_date: String,
}

/// Unified request envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateDocument(CreateDocumentRequest),
    UpdateState(UpdateStateRequest),
    GetDocumentById(GetDocumentRequest),
    QueryByInstitution(InstitutionQueryRequest),
    QueryByUser(UserQueryRequest),
    QueryAuditLogs(AuditQueryRequest),
}

/// Raw request for parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    op: String,
    #[serde(default)]
    scope: Option<Scope>,
    #[serde(default)]
    document: Option<Value>,
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    new_state: Option<String>,
    #[serde(default)]
    institution: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    filter_type: Option<String>,
    #[serde(default)]
    filter_value: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

fn required<T>(field: Option<T>, name: &str) -> ApiResult<T> {
    field.ok_or_else(|| ApiError::invalid_request(format!("Missing {}", name)))
}

impl Request {
    /// Parse a request from JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        let raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;

        let op = raw.op.as_str();
        let known = matches!(
            op,
            "createDocument"
                | "updateState"
                | "getDocumentById"
                | "queryByInstitution"
                | "queryByUser"
                | "queryAuditLogs"
        );
        if !known {
            return Err(ApiError::unknown_operation(op));
        }
        let scope = required(raw.scope, "scope")?;

        let request = match op {
            "createDocument" => Request::CreateDocument(CreateDocumentRequest {
                scope,
                document: required(raw.document, "document")?,
            }),
            "updateState" => Request::UpdateState(UpdateStateRequest {
                scope,
                document_id: required(raw.document_id, "documentId")?,
                new_state: required(raw.new_state, "newState")?,
            }),
            "getDocumentById" => Request::GetDocumentById(GetDocumentRequest {
                scope,
                document_id: required(raw.document_id, "documentId")?,
            }),
            "queryByInstitution" => Request::QueryByInstitution(InstitutionQueryRequest {
                scope,
                institution: required(raw.institution, "institution")?,
            }),
            "queryByUser" => Request::QueryByUser(UserQueryRequest {
                scope,
                user_id: required(raw.user_id, "userId")?,
            }),
            _ => Request::QueryAuditLogs(AuditQueryRequest {
                scope,
                filter_type: required(raw.filter_type, "filterType")?,
                filter_value: raw.filter_value.unwrap_or_default(),
                start_date: required(raw.start_date, "startDate")?,
                end_date: required(raw.end_date, "endDate")?,
            }),
        };
        Ok(request)
    }

    pub fn op(&self) -> &'static str {
        match self {
            Request::CreateDocument(_) => "createDocument",
            Request::UpdateState(_) => "updateState",
            Request::GetDocumentById(_) => "getDocumentById",
            Request::QueryByInstitution(_) => "queryByInstitution",
            Request::QueryByUser(_) => "queryByUser",
            Request::QueryAuditLogs(_) => "queryAuditLogs",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Request::CreateDocument(r) => r.scope,
            Request::UpdateState(r) => r.scope,
            Request::GetDocumentById(r) => r.scope,
            Request::QueryByInstitution(r) => r.scope,
            Request::QueryByUser(r) => r.scope,
            Request::QueryAuditLogs(r) => r.scope,
        }
    }

    /// Whether a successful run leaves writes the host must commit
    pub fn is_mutating(&self) -> bool {
        matches!(self, Request::CreateDocument(_) | Request::UpdateState(_))
    }
}
