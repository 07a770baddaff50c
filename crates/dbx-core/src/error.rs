//! dbx error types and error response structures.
//!
//! Error codes:
//! - DBX-1xxx: Request and configuration errors
//! - DBX-2xxx: Connection errors
//! - DBX-3xxx: Query errors
//! - DBX-4xxx: Schema errors
//! - DBX-9xxx: Internal errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// dbx error type covering every failure a connector surfaces to the UI.
///
/// Nothing in this taxonomy is retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum DbxError {
    // ─────────────────────────────────────────────────────────────────────────
    // Request errors (DBX-1xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Connection errors (DBX-2xxx)
    // ─────────────────────────────────────────────────────────────────────────
    /// Bad endpoint, auth rejection, network failure.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        status_code: Option<u16>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Query errors (DBX-3xxx)
    // ─────────────────────────────────────────────────────────────────────────
    /// The server rejected or failed the query.
    #[error("Query error: {message}")]
    Query {
        message: String,
        /// Raw error objects as returned by the server.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        errors: Vec<serde_json::Value>,
    },

    #[error("No active connection")]
    NoActiveConnection,

    // ─────────────────────────────────────────────────────────────────────────
    // Schema errors (DBX-4xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Schema build error: {message}")]
    SchemaBuild { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Internal errors (DBX-9xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbxError {
    /// Shorthand for an invalid request.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "DBX-1001",
            Self::Config { .. } => "DBX-1002",
            Self::Connection { .. } => "DBX-2001",
            Self::Query { .. } => "DBX-3001",
            Self::NoActiveConnection => "DBX-3002",
            Self::SchemaBuild { .. } => "DBX-4001",
            Self::Internal { .. } => "DBX-9001",
        }
    }

    /// Convert to wire response format.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let hint = match self {
            Self::NoActiveConnection => Some("Connect to an endpoint before running queries.".into()),
            Self::Connection {
                status_code: Some(401 | 403),
                ..
            } => Some("Check the authorization token.".into()),
            _ => None,
        };

        ErrorResponse {
            code: self.code().into(),
            message: self.to_string(),
            details: self.details(),
            hint,
        }
    }

    /// Extract structured details for the error.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Connection {
                status_code: Some(status),
                ..
            } => Some(serde_json::json!({ "status_code": status })),
            Self::Query { errors, .. } if !errors.is_empty() => {
                Some(serde_json::json!({ "errors": errors }))
            }
            _ => None,
        }
    }
}

/// Result type alias for dbx operations.
pub type DbxResult<T> = Result<T, DbxError>;

/// Wire format for error responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "DBX-2001")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Recovery hint for the UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
