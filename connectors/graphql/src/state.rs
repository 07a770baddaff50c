//! Connector state addressed by dotted paths.

use std::sync::Arc;

use dbx_core::{ConnectionStatus, DbxError, DbxResult, StatePath, StatusTransition};
use dbx_graphql::{GraphqlClient, IntrospectionResult};
use serde_json::{Value, json};
use tracing::info;

use crate::credentials::{CredentialField, Credentials};

/// Connector key used in credential paths.
pub const CONNECTOR_KEY: &str = "graphql";

/// Name of the `connect.*` slot holding the introspection result.
pub const SCHEMA_SLOT: &str = "graphqlschema";

/// Session data under `connect.*`.
#[derive(Debug, Default)]
pub struct ConnectState {
    status: ConnectionStatus,
    db: Option<GraphqlClient>,
    graphql_schema: Option<Arc<IntrospectionResult>>,
}

/// Everything the connector reads and writes.
///
/// Lifecycle fields change only through connector operations; the host may
/// write the two credential fields.
#[derive(Debug, Default)]
pub struct AppState {
    connect: ConnectState,
    credentials: Credentials,
    last_transition: Option<StatusTransition>,
}

impl AppState {
    /// Create state with initial credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// `connect.status`
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.connect.status
    }

    /// `connect._db`
    #[must_use]
    pub const fn client(&self) -> Option<&GraphqlClient> {
        self.connect.db.as_ref()
    }

    /// `connect.graphqlschema`
    #[must_use]
    pub const fn schema(&self) -> Option<&Arc<IntrospectionResult>> {
        self.connect.graphql_schema.as_ref()
    }

    /// `config.credentials.graphql`
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Most recent status change.
    #[must_use]
    pub const fn last_transition(&self) -> Option<&StatusTransition> {
        self.last_transition.as_ref()
    }

    /// Write one credential field. No validation.
    pub fn set_credential(&mut self, field: CredentialField, value: impl Into<String>) {
        self.credentials.set(field, value);
    }

    /// Read any path as JSON.
    ///
    /// The client handle is shown as `{ "endpoint": ... }`; the schema slot
    /// as the raw introspection data.
    pub fn get(&self, path: &StatePath) -> DbxResult<Value> {
        match path {
            StatePath::ConnectStatus => Ok(json!(self.status())),
            StatePath::ConnectDb => Ok(self
                .client()
                .map_or(Value::Null, |client| json!({ "endpoint": client.endpoint() }))),
            StatePath::ConnectSlot(slot) if slot == SCHEMA_SLOT => Ok(self
                .schema()
                .map_or(Value::Null, |schema| schema.data().clone())),
            StatePath::Credential { connector, field } if connector == CONNECTOR_KEY => {
                match field.parse::<CredentialField>()? {
                    CredentialField::Endpoint => Ok(json!(self.credentials.endpoint())),
                    CredentialField::Token => Ok(json!(self.credentials.token())),
                }
            }
            other => Err(DbxError::invalid_request(format!("Unknown state path: {other}"))),
        }
    }

    /// Write a credential path. Every other path is read-only.
    pub fn set(&mut self, path: &StatePath, value: &Value) -> DbxResult<()> {
        let StatePath::Credential { connector, field } = path else {
            return Err(DbxError::invalid_request(format!(
                "State path is read-only: {path}"
            )));
        };
        if connector != CONNECTOR_KEY {
            return Err(DbxError::invalid_request(format!("Unknown state path: {path}")));
        }
        let field = field.parse::<CredentialField>()?;
        match (field, value) {
            (_, Value::String(text)) => self.set_credential(field, text.as_str()),
            (CredentialField::Token, Value::Null) => self.credentials.set_token(None),
            _ => {
                return Err(DbxError::invalid_request(format!(
                    "{path} expects a string"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    pub(crate) fn set_status(&mut self, to: ConnectionStatus) {
        let from = self.connect.status;
        if from == to {
            return;
        }
        let transition = from.transition(to);
        info!(from = %transition.from, to = %transition.to, "connection status changed");
        self.connect.status = to;
        self.last_transition = Some(transition);
    }

    pub(crate) fn attach(&mut self, client: GraphqlClient, schema: Arc<IntrospectionResult>) {
        self.connect.db = Some(client);
        self.connect.graphql_schema = Some(schema);
    }

    pub(crate) fn replace_schema(&mut self, schema: Arc<IntrospectionResult>) {
        self.connect.graphql_schema = Some(schema);
    }

    pub(crate) fn detach(&mut self) {
        self.connect.db = None;
        self.connect.graphql_schema = None;
    }
}
