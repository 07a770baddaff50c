//! dbx GraphQL - GraphQL client infrastructure for dbx connectors.
//!
//! This crate provides:
//! - An HTTP client that posts GraphQL requests with optional bearer auth.
//! - The standard introspection query and its result type.
//! - Client-schema construction from introspection, with SDL printing.
//! - A single-slot schema cache keyed by introspection-result identity.
//! - Error classification into the dbx taxonomy.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]

mod cache;
mod client;
mod error;
mod introspection;
mod operation;
mod schema;
mod sdl;

pub use cache::{SchemaCache, SchemaCacheStats};
pub use client::{
    GraphqlClient, GraphqlClientBuilder, GraphqlClientConfig, GraphqlClientMetrics,
    GraphqlClientMetricsSnapshot,
};
pub use error::{
    GraphqlClientError, GraphqlError, GraphqlErrorLocation, GraphqlPathSegment, HttpErrorInfo,
};
pub use introspection::{
    INTROSPECTION_QUERY, IntrospectionQuery, IntrospectionResult, NoVariables, TypeKind,
};
pub use operation::{GraphqlOperation, GraphqlQuery, GraphqlRequest, GraphqlResponse};
pub use schema::{
    ClientSchema, DirectiveDef, EnumValueDef, FieldDef, FieldType, InputValueDef, NamedType,
    SchemaBuildError,
};
