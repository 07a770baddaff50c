//! Error types for the GraphQL client.

use dbx_core::DbxError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP error information captured from reqwest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorInfo {
    /// Error message.
    pub message: String,
    /// HTTP status code (if available).
    pub status_code: Option<u16>,
    /// Whether the error was a timeout.
    pub is_timeout: bool,
    /// Whether the error was a connection failure.
    pub is_connect: bool,
    /// Whether the request could not be built (e.g. malformed endpoint).
    pub is_builder: bool,
}

impl From<reqwest::Error> for HttpErrorInfo {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status_code: err.status().map(|status| status.as_u16()),
            is_timeout: err.is_timeout(),
            is_connect: err.is_connect(),
            is_builder: err.is_builder(),
        }
    }
}

/// GraphQL error location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlErrorLocation {
    /// Line number in the query (1-based).
    pub line: u32,
    /// Column number in the query (1-based).
    pub column: u32,
}

/// GraphQL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphqlPathSegment {
    /// Field name.
    Key(String),
    /// Array index.
    Index(i64),
}

/// GraphQL error (per GraphQL spec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    /// Human-readable error message.
    pub message: String,
    /// Location(s) within the query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphqlErrorLocation>,
    /// Path within the response where the error occurred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<GraphqlPathSegment>,
    /// Extensions metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// Error type for GraphQL client operations.
#[derive(Debug, Clone, Error)]
pub enum GraphqlClientError {
    /// HTTP/network error.
    #[error("HTTP error: {}", .0.message)]
    Http(HttpErrorInfo),

    /// HTTP response status error.
    #[error("HTTP status {status} with body: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: StatusCode,
        /// Response body (truncated if needed).
        body: String,
        /// GraphQL errors carried in the body, if it was a GraphQL response.
        errors: Vec<GraphqlError>,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(String),

    /// GraphQL-level errors returned by the server.
    #[error("GraphQL errors: {}", join_messages(.errors))]
    GraphqlErrors {
        /// GraphQL error list.
        errors: Vec<GraphqlError>,
    },

    /// GraphQL protocol violation.
    #[error("GraphQL protocol error: {message}")]
    Protocol {
        /// Details.
        message: String,
    },

    /// Credentials that cannot be sent, such as a token with a line break.
    #[error("invalid credentials: {message}")]
    InvalidCredentials {
        /// Which credential was rejected.
        message: String,
    },
}

impl From<reqwest::Error> for GraphqlClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(HttpErrorInfo::from(err))
    }
}

impl From<serde_json::Error> for GraphqlClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl GraphqlClientError {
    /// HTTP status of the failed exchange, if one was received.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(info) => info.status_code,
            Self::HttpStatus { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    /// Classify a failure that happened while establishing a connection.
    ///
    /// Every failure during connect, including a server that refuses
    /// introspection, is a connection error.
    #[must_use]
    pub fn into_connection_error(self) -> DbxError {
        let status_code = self.status_code();
        let message = match &self {
            Self::GraphqlErrors { errors } => {
                format!("introspection rejected: {}", join_messages(errors))
            }
            _ => self.to_string(),
        };
        DbxError::Connection {
            message,
            status_code,
        }
    }

    /// Classify a failure that happened while running a user query.
    ///
    /// Errors reported by the GraphQL layer become query errors; transport
    /// failures stay connection errors.
    #[must_use]
    pub fn into_query_error(self) -> DbxError {
        match self {
            Self::GraphqlErrors { errors } => query_error(&errors),
            Self::HttpStatus { ref errors, .. } if !errors.is_empty() => query_error(errors),
            Self::Protocol { message } => DbxError::Query {
                message,
                errors: Vec::new(),
            },
            other => other.into_connection_error(),
        }
    }
}

fn query_error(errors: &[GraphqlError]) -> DbxError {
    DbxError::Query {
        message: join_messages(errors),
        errors: errors
            .iter()
            .filter_map(|err| serde_json::to_value(err).ok())
            .collect(),
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    if errors.is_empty() {
        return "GraphQL error".to_string();
    }
    errors
        .iter()
        .map(|err| err.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gql_error(message: &str) -> GraphqlError {
        GraphqlError {
            message: message.to_string(),
            locations: vec![GraphqlErrorLocation { line: 1, column: 3 }],
            path: Vec::new(),
            extensions: None,
        }
    }

    #[test]
    fn graphql_errors_classify_as_query_errors() {
        let err = GraphqlClientError::GraphqlErrors {
            errors: vec![gql_error("Cannot query field \"nope\""), gql_error("second")],
        };
        match err.into_query_error() {
            DbxError::Query { message, errors } => {
                assert_eq!(message, "Cannot query field \"nope\"; second");
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0]["locations"][0]["column"], 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bad_request_with_graphql_body_is_a_query_error() {
        let err = GraphqlClientError::HttpStatus {
            status: StatusCode::BAD_REQUEST,
            body: "{}".into(),
            errors: vec![gql_error("Syntax Error: Unexpected Name")],
        };
        assert!(matches!(err.into_query_error(), DbxError::Query { .. }));
    }

    #[test]
    fn plain_http_status_is_a_connection_error() {
        let err = GraphqlClientError::HttpStatus {
            status: StatusCode::UNAUTHORIZED,
            body: "unauthorized".into(),
            errors: Vec::new(),
        };
        match err.into_query_error() {
            DbxError::Connection { status_code, .. } => assert_eq!(status_code, Some(401)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn invalid_credentials_are_a_connection_error() {
        let err = GraphqlClientError::InvalidCredentials {
            message: "bearer token is not a valid header value".into(),
        };
        match err.into_connection_error() {
            DbxError::Connection {
                message,
                status_code,
            } => {
                assert!(message.starts_with("invalid credentials"));
                assert_eq!(status_code, None);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejected_introspection_is_a_connection_error() {
        let err = GraphqlClientError::GraphqlErrors {
            errors: vec![gql_error("introspection disabled")],
        };
        match err.into_connection_error() {
            DbxError::Connection { message, .. } => {
                assert!(message.contains("introspection disabled"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
