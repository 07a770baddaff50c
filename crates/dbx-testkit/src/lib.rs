//! dbx Test Kit - Testing utilities for dbx connectors
//!
//! This crate provides:
//!
//! - [`MockGraphqlServer`] - wiremock-backed GraphQL endpoint that can
//!   answer introspection and user queries
//! - [`LogCapture`] - structured JSONL test log with schema validation
//! - Introspection and response fixtures
//! - Tracing configuration for test output
//!
//! # Example
//!
//! ```rust,ignore
//! use dbx_testkit::{MockGraphqlServer, fixtures};
//!
//! #[tokio::test]
//! async fn connects() {
//!     dbx_testkit::init_test_tracing();
//!
//!     let server = MockGraphqlServer::start().await;
//!     server.expect_introspection(fixtures::pokemon_introspection()).await;
//!
//!     let client = GraphqlClientBuilder::new(server.endpoint()).build().unwrap();
//!     client.introspect().await.unwrap();
//!     assert_eq!(server.introspection_count().await, 1);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod fixtures;
mod log_capture;
mod mock_server;
mod tracing_config;

pub use log_capture::*;
pub use mock_server::*;
pub use tracing_config::*;
