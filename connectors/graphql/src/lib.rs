//! dbx GraphQL Connector
//!
//! Connects dbx to any GraphQL endpoint:
//! - Credential form with endpoint and optional bearer token.
//! - Connect by introspection, run queries, normalize results into a grid.
//! - Editor hint/lint options and Markdown docs from the client schema.
//! - A line-oriented JSON-RPC host for the `dbx-graphql-connector` binary.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod connector;
pub mod credentials;
pub mod format;
pub mod host;
pub mod presentation;
pub mod state;

pub use config::{ConfigError, GraphqlConnectorConfig};
pub use connector::GraphqlConnector;
pub use credentials::{CredentialField, Credentials};
pub use format::QueryResult;
pub use host::ConnectorHost;
pub use presentation::{CredentialForm, EditorOptions, FormAction, docs, reference};
pub use state::{AppState, CONNECTOR_KEY, SCHEMA_SLOT};
