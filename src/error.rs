//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("entity config '{0}' has no endpoint")]
    MissingEndpoint(String),
    #[error("entity config '{0}' has no id key")]
    MissingIdKey(String),
    #[error("duplicate field key: {0}")]
    DuplicateFieldKey(String),
    #[error("duplicate column key: {0}")]
    DuplicateColumnKey(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Gateway operation, used as the prefix of synthesized failure messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Show,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Get => "GET",
            Operation::Show => "SHOW",
            Operation::Post => "POST",
            Operation::Put => "PUT",
            Operation::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was received.
    Transport,
    /// Non-2xx response.
    Status,
    /// Record is still referenced elsewhere.
    Conflict,
    /// 2xx response whose body could not be decoded.
    Decode,
}

/// A request failure after normalization. `message` is the text already shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    pub operation: Operation,
    pub status: Option<u16>,
    pub kind: FailureKind,
    pub message: String,
}

impl GatewayError {
    pub fn is_conflict(&self) -> bool {
        self.kind == FailureKind::Conflict
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Why a list response could not be turned into page state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("unexpected list payload: {0}")]
    UnexpectedShape(&'static str),
    #[error("item {index} is not an object")]
    NonObjectRecord { index: usize },
    #[error("item {index} has no '{id_key}'")]
    MissingIdentity { index: usize, id_key: String },
    #[error("list mapper: {0}")]
    Mapper(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{entity} {id} is still referenced by {count} record(s)")]
    InUse {
        entity: &'static str,
        id: i64,
        count: usize,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Body extraction failed; keeps the extractor's status (400, 413, 415, 422).
    #[error("rejected body: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => AppError::NotFound(e.to_string()),
            StoreError::InUse { .. } => AppError::Conflict(e.to_string()),
        }
    }
}

/// Unparseable or mistyped request bodies get the same envelope as every other error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Rejected { status, .. } => (*status, rejection_code(*status)),
        };
        let message = match self {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::BadRequest(m)
            | AppError::Rejected { message: m, .. } => m,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

fn rejection_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
        StatusCode::UNPROCESSABLE_ENTITY => "validation_error",
        _ => "bad_request",
    }
}
