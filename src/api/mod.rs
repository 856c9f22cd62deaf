//! API layer
//!
//! The operation catalog as JSON requests, dispatched to the public and
//! private registries inside a host transaction.
//!
//! # Supported Operations
//!
//! - createDocument
//! - updateState (private scope only)
//! - getDocumentById
//! - queryByInstitution
//! - queryByUser
//! - queryAuditLogs

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult};
pub use handler::ApiHandler;
pub use request::{
    AuditQueryRequest, CreateDocumentRequest, GetDocumentRequest, InstitutionQueryRequest,
    Request, UpdateStateRequest, UserQueryRequest,
};
pub use response::Response;
