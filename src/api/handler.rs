//! API handler
//!
//! Dispatches catalog requests to the public and private registries within
//! the transaction the host supplies. The handler never commits; the host
//! commits when a mutating request succeeds and aborts otherwise.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::ledger::{LedgerTx, Scope};
use crate::observability::RegistryMetrics;
use crate::registry::{
    PrivateDocument, PrivateRegistry, PublicDocument, PublicRegistry, Registry, RegistryError,
    RegistryOptions,
};

use super::errors::{ApiError, ApiResult};
use super::request::{AuditQueryRequest, CreateDocumentRequest, Request};
use super::response::Response;

pub struct ApiHandler {
    public: PublicRegistry,
    private: PrivateRegistry,
    metrics: Arc<RegistryMetrics>,
}

fn to_data<S: Serialize>(value: &S) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::from_registry_error(RegistryError::serialization("response", e)))
}

impl ApiHandler {
    pub fn new(options: RegistryOptions, metrics: Arc<RegistryMetrics>) -> Self {
        Self {
            public: Registry::new(options, metrics.clone()),
            private: Registry::new(options, metrics.clone()),
            metrics,
        }
    }

    pub fn public(&self) -> &PublicRegistry {
        &self.public
    }

    pub fn private(&self) -> &PrivateRegistry {
        &self.private
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    /// Handle a raw JSON request string
    pub fn handle_json<T: LedgerTx + ?Sized>(&self, tx: &mut T, json_request: &str) -> Response {
        let request = match Request::parse(json_request) {
            Ok(r) => r,
            Err(e) => return Response::error(&e),
        };
        Response::from_result(self.handle(tx, &request))
    }

    /// Execute one parsed request
    pub fn handle<T: LedgerTx + ?Sized>(&self, tx: &mut T, request: &Request) -> ApiResult<Value> {
        match request {
            Request::CreateDocument(r) => self.handle_create(tx, r),
            Request::UpdateState(r) => match r.scope {
                Scope::Private => {
                    self.private
                        .update_state(tx, &r.document_id, &r.new_state)?;
                    Ok(Value::Null)
                }
                Scope::Public => Err(RegistryError::invalid_argument(
                    "public documents carry no state",
                )
                .into()),
            },
            Request::GetDocumentById(r) => match r.scope {
                Scope::Public => to_data(&self.public.get_document_by_id(&*tx, &r.document_id)?),
                Scope::Private => to_data(&self.private.get_document_by_id(&*tx, &r.document_id)?),
            },
            Request::QueryByInstitution(r) => match r.scope {
                Scope::Public => to_data(&self.public.query_by_institution(&*tx, &r.institution)?),
                Scope::Private => {
                    to_data(&self.private.query_by_institution(&*tx, &r.institution)?)
                }
            },
            Request::QueryByUser(r) => match r.scope {
                Scope::Public => to_data(&self.public.query_by_user(&*tx, &r.user_id)?),
                Scope::Private => to_data(&self.private.query_by_user(&*tx, &r.user_id)?),
            },
            Request::QueryAuditLogs(r) => self.handle_audit_query(tx, r),
        }
    }

    fn handle_create<T: LedgerTx + ?Sized>(
        &self,
        tx: &mut T,
        req: &CreateDocumentRequest,
    ) -> ApiResult<Value> {
        let invalid = |e: serde_json::Error| {
            ApiError::invalid_request(format!("Invalid {} document: {}", req.scope, e))
        };
        match req.scope {
            Scope::Public => {
                let document: PublicDocument =
                    serde_json::from_value(req.document.clone()).map_err(invalid)?;
                self.public.create(tx, document)?;
            }
            Scope::Private => {
                let document: PrivateDocument =
                    serde_json::from_value(req.document.clone()).map_err(invalid)?;
                self.private.create(tx, document)?;
            }
        }
        Ok(Value::Null)
    }

    fn handle_audit_query<T: LedgerTx + ?Sized>(
        &self,
        tx: &T,
        req: &AuditQueryRequest,
    ) -> ApiResult<Value> {
        let entries = match req.scope {
            Scope::Public => self.public.query_audit_logs(
                tx,
                &req.filter_type,
                &req.filter_value,
                &req.start_date,
                &req.end_date,
            )?,
            Scope::Private => self.private.query_audit_logs(
                tx,
                &req.filter_type,
                &req.filter_value,
                &req.start_date,
                &req.end_date,
            )?,
        };
        to_data(&entries)
    }
}
