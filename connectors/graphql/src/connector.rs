//! dbx GraphQL connector implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dbx_core::{ConnectionStatus, ConnectorDescriptor, DbConnector, DbxError, DbxResult};
use dbx_graphql::{
    ClientSchema, GraphqlClient, GraphqlClientBuilder, GraphqlClientError, SchemaCache,
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::config::GraphqlConnectorConfig;
use crate::format::QueryResult;
use crate::presentation::{self, CredentialForm, EditorOptions};
use crate::state::{AppState, CONNECTOR_KEY};

/// dbx GraphQL connector.
///
/// Owns the schema cache and request counters. Session data lives in the
/// [`AppState`] passed to each operation.
#[derive(Debug)]
pub struct GraphqlConnector {
    service_name: String,
    timeout: Duration,
    sample_endpoint: String,
    cache: SchemaCache,
    connects_total: AtomicU64,
    connects_error: AtomicU64,
    runs_total: AtomicU64,
    runs_error: AtomicU64,
}

impl Default for GraphqlConnector {
    fn default() -> Self {
        Self::new(&GraphqlConnectorConfig::default())
    }
}

impl GraphqlConnector {
    /// Create a connector from configuration.
    #[must_use]
    pub fn new(config: &GraphqlConnectorConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            timeout: config.timeout(),
            sample_endpoint: config.sample_endpoint.clone(),
            cache: SchemaCache::new(),
            connects_total: AtomicU64::new(0),
            connects_error: AtomicU64::new(0),
            runs_total: AtomicU64::new(0),
            runs_error: AtomicU64::new(0),
        }
    }

    /// Endpoint offered by the sample shortcut.
    #[must_use]
    pub fn sample_endpoint(&self) -> &str {
        &self.sample_endpoint
    }

    /// Connect using the credentials in `state`.
    ///
    /// Introspects the endpoint and stores the client and the result. Any
    /// failure leaves the state disconnected and is reported as a connection
    /// error.
    #[instrument(skip(self, state), fields(endpoint = %state.credentials().endpoint()))]
    pub async fn connect(&self, state: &mut AppState) -> DbxResult<()> {
        self.connects_total.fetch_add(1, Ordering::Relaxed);
        state.set_status(ConnectionStatus::Connecting);

        let client = match self.build_client(state) {
            Ok(client) => client,
            Err(err) => return Err(self.fail_connect(state, err)),
        };

        match client.introspect().await {
            Ok(result) => {
                state.attach(client, Arc::new(result));
                state.set_status(ConnectionStatus::Connected);
                info!("GraphQL connector connected");
                Ok(())
            }
            Err(err) => Err(self.fail_connect(state, err.into_connection_error())),
        }
    }

    /// Drop the client and schema. Safe to call when already disconnected.
    #[instrument(skip(self, state))]
    pub fn disconnect(&self, state: &mut AppState) {
        state.detach();
        state.set_status(ConnectionStatus::Disconnected);
        self.cache.clear();
    }

    /// Connect to `endpoint` without a token.
    #[instrument(skip(self, state))]
    pub async fn connect_to_sample(&self, state: &mut AppState, endpoint: &str) -> DbxResult<()> {
        let credentials = state.credentials_mut();
        credentials.set_token(Some(String::new()));
        credentials.set_endpoint(endpoint);
        self.connect(state).await
    }

    /// Run `query` against the active connection.
    ///
    /// On success the schema is introspected again and replaced.
    #[instrument(skip(self, state, query), fields(query_len = query.len()))]
    pub async fn run(&self, state: &mut AppState, query: &str) -> DbxResult<QueryResult> {
        let Some(client) = state.client().cloned() else {
            return Err(DbxError::NoActiveConnection);
        };
        self.runs_total.fetch_add(1, Ordering::Relaxed);

        let data = client.request(query, None, None).await.map_err(|err| {
            self.runs_error.fetch_add(1, Ordering::Relaxed);
            let err = err.into_query_error();
            warn!(code = err.code(), error = %err, "GraphQL query failed");
            err
        })?;
        let result = QueryResult::from_data(query, &data);

        // TODO: refresh only when the query was a mutation instead of on every run.
        let refreshed = client.introspect().await.map_err(|err| {
            self.runs_error.fetch_add(1, Ordering::Relaxed);
            let err = err.into_connection_error();
            warn!(error = %err, "schema refresh after query failed");
            err
        })?;
        state.replace_schema(Arc::new(refreshed));

        info!(rows = result.row_count(), "GraphQL query completed");
        Ok(result)
    }

    /// Client schema for the stored introspection result, memoized.
    pub fn client_schema(&self, state: &AppState) -> DbxResult<Option<Arc<ClientSchema>>> {
        self.cache.get(state.schema()).map_err(|err| {
            warn!(error = %err, "failed to build client schema");
            DbxError::from(err)
        })
    }

    /// Credential form for the current state.
    #[must_use]
    pub fn form(&self, state: &AppState) -> CredentialForm {
        presentation::credential_form(state, &self.sample_endpoint)
    }

    /// Query editor options.
    pub fn editor_options(&self, state: &AppState) -> DbxResult<EditorOptions> {
        Ok(presentation::editor_options(self.client_schema(state)?))
    }

    /// Schema documentation, if a schema is loaded.
    pub fn docs(&self, state: &AppState) -> DbxResult<Option<String>> {
        let schema = self.client_schema(state)?;
        Ok(presentation::docs(schema.as_deref()))
    }

    /// Schema as SDL, if a schema is loaded.
    pub fn sdl(&self, state: &AppState) -> DbxResult<Option<String>> {
        let schema = self.client_schema(state)?;
        Ok(schema.map(|schema| schema.to_sdl()))
    }

    /// Health and counters.
    #[must_use]
    pub fn health(&self, state: &AppState) -> Value {
        let cache = self.cache.stats();
        let status = state.status();
        json!({
            "status": if status.is_connected() { "healthy" } else { "not_connected" },
            "connection": status,
            "endpoint": state.client().map(GraphqlClient::endpoint),
            "metrics": {
                "connects_total": self.connects_total.load(Ordering::Relaxed),
                "connects_error": self.connects_error.load(Ordering::Relaxed),
                "runs_total": self.runs_total.load(Ordering::Relaxed),
                "runs_error": self.runs_error.load(Ordering::Relaxed),
                "client": state.client().map(GraphqlClient::metrics),
                "schema_cache": { "hits": cache.hits, "builds": cache.builds }
            }
        })
    }

    fn build_client(&self, state: &AppState) -> DbxResult<GraphqlClient> {
        let credentials = state.credentials();
        let mut builder = GraphqlClientBuilder::new(credentials.endpoint())
            .with_service_name(self.service_name.as_str())
            .with_timeout(self.timeout);
        if let Some(token) = credentials.bearer_token() {
            builder = builder.with_bearer_token(token);
        }
        builder.build().map_err(|err| match err {
            GraphqlClientError::InvalidCredentials { .. } => err.into_connection_error(),
            other => DbxError::Internal {
                message: format!("Failed to create HTTP client: {other}"),
            },
        })
    }

    fn fail_connect(&self, state: &mut AppState, err: DbxError) -> DbxError {
        self.connects_error.fetch_add(1, Ordering::Relaxed);
        state.detach();
        state.set_status(ConnectionStatus::Disconnected);
        warn!(code = err.code(), error = %err, "GraphQL connect failed");
        err
    }
}

impl DbConnector for GraphqlConnector {
    fn descriptor(&self) -> ConnectorDescriptor {
        ConnectorDescriptor::new(CONNECTOR_KEY, "GraphQL", "graphql", env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_names_the_connector() {
        let descriptor = GraphqlConnector::default().descriptor();
        assert_eq!(descriptor.key, "graphql");
        assert_eq!(descriptor.name, "GraphQL");
        assert_eq!(descriptor.syntax, "graphql");
        assert_eq!(descriptor.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let connector = GraphqlConnector::default();
        let mut state = AppState::default();
        connector.disconnect(&mut state);
        connector.disconnect(&mut state);
        assert_eq!(state.status(), ConnectionStatus::Disconnected);
        assert!(state.client().is_none());
        assert!(state.last_transition().is_none());
    }

    #[tokio::test]
    async fn run_without_connection_fails_fast() {
        let connector = GraphqlConnector::default();
        let mut state = AppState::default();
        let err = connector.run(&mut state, "{ a }").await.unwrap_err();
        assert_eq!(err, DbxError::NoActiveConnection);
    }

    #[test]
    fn nothing_to_show_without_schema() {
        let connector = GraphqlConnector::default();
        let state = AppState::default();
        assert!(connector.client_schema(&state).unwrap().is_none());
        assert!(connector.docs(&state).unwrap().is_none());
        assert!(connector.sdl(&state).unwrap().is_none());
        let health = connector.health(&state);
        assert_eq!(health["status"], "not_connected");
        assert_eq!(health["endpoint"], Value::Null);
    }
}
