//! Line-oriented JSON-RPC host protocol.

use dbx_core::{DbConnector, DbxError, DbxResult, StatePath};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::GraphqlConnectorConfig;
use crate::connector::GraphqlConnector;
use crate::credentials::CredentialField;
use crate::presentation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SetCredentialParams {
    field: CredentialField,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GetParams {
    path: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectSampleParams {
    #[serde(default)]
    endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunParams {
    query: String,
}

#[derive(Debug, Deserialize)]
struct ReferenceParams {
    name: String,
}

/// Owns the connector and its state and answers host requests.
#[derive(Debug)]
pub struct ConnectorHost {
    connector: GraphqlConnector,
    state: AppState,
    shutdown: bool,
}

impl ConnectorHost {
    /// Create a host from configuration.
    #[must_use]
    pub fn new(config: &GraphqlConnectorConfig) -> Self {
        Self {
            connector: GraphqlConnector::new(config),
            state: AppState::new(config.credentials.clone()),
            shutdown: false,
        }
    }

    /// Connector state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Whether `shutdown` has been received.
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Dispatch one method call.
    pub async fn handle(&mut self, method: &str, params: Value) -> DbxResult<Value> {
        debug!(method, "handling request");
        match method {
            "describe" => to_value(self.connector.descriptor()),
            "form" => to_value(self.connector.form(&self.state)),
            "set_credential" => {
                let params: SetCredentialParams = parse_params(params)?;
                self.state.set_credential(params.field, params.value);
                Ok(json!({ "status": "ok" }))
            }
            "get" => {
                let params: GetParams = parse_params(params)?;
                let path: StatePath = params.path.parse()?;
                self.state.get(&path)
            }
            "connect" => {
                self.connector.connect(&mut self.state).await?;
                Ok(json!({ "status": self.state.status() }))
            }
            "connect_sample" => {
                let params: ConnectSampleParams = if params.is_null() {
                    ConnectSampleParams::default()
                } else {
                    parse_params(params)?
                };
                let endpoint = params
                    .endpoint
                    .unwrap_or_else(|| self.connector.sample_endpoint().to_string());
                self.connector
                    .connect_to_sample(&mut self.state, &endpoint)
                    .await?;
                Ok(json!({ "status": self.state.status() }))
            }
            "disconnect" => {
                self.connector.disconnect(&mut self.state);
                Ok(json!({ "status": self.state.status() }))
            }
            "run" => {
                let params: RunParams = parse_params(params)?;
                to_value(self.connector.run(&mut self.state, &params.query).await?)
            }
            "editor_options" => to_value(self.connector.editor_options(&self.state)?),
            "docs" => Ok(self
                .connector
                .docs(&self.state)?
                .map_or(Value::Null, Value::String)),
            "sdl" => Ok(self
                .connector
                .sdl(&self.state)?
                .map_or(Value::Null, Value::String)),
            "reference" => {
                let params: ReferenceParams = parse_params(params)?;
                Ok(Value::String(presentation::reference(&params.name)))
            }
            "health" => Ok(self.connector.health(&self.state)),
            "shutdown" => {
                self.connector.disconnect(&mut self.state);
                self.shutdown = true;
                info!("GraphQL connector shutting down");
                Ok(json!({ "status": "shutdown" }))
            }
            _ => Err(DbxError::invalid_request(format!("Unknown method: {method}"))),
        }
    }

    /// Handle one protocol line and build the response envelope.
    pub async fn handle_message(&mut self, message: &str) -> Value {
        let request: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(err) => {
                return envelope(
                    None,
                    Err(DbxError::invalid_request(format!("Invalid JSON: {err}"))),
                );
            }
        };

        let method = request.get("method").and_then(Value::as_str).unwrap_or("");
        let id = request.get("id").cloned();
        let params = request.get("params").cloned().unwrap_or(Value::Null);

        let result = self.handle(method, params).await;
        envelope(id, result)
    }
}

fn envelope(id: Option<Value>, result: DbxResult<Value>) -> Value {
    let mut response = match result {
        Ok(value) => json!({ "jsonrpc": "2.0", "result": value }),
        Err(err) => json!({ "jsonrpc": "2.0", "error": err.to_response() }),
    };
    if let Some(id) = id {
        response["id"] = id;
    }
    response
}

fn parse_params<T: DeserializeOwned>(params: Value) -> DbxResult<T> {
    serde_json::from_value(params)
        .map_err(|err| DbxError::invalid_request(format!("Invalid params: {err}")))
}

fn to_value<T: serde::Serialize>(value: T) -> DbxResult<Value> {
    serde_json::to_value(value).map_err(|err| DbxError::Internal {
        message: format!("Failed to serialize response: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ConnectorHost {
        ConnectorHost::new(&GraphqlConnectorConfig::default())
    }

    #[tokio::test]
    async fn unknown_method_is_invalid_request() {
        let mut host = host();
        let response = host
            .handle_message(r#"{"jsonrpc":"2.0","id":7,"method":"explode"}"#)
            .await;
        assert_eq!(response["id"], 7);
        assert_eq!(response["error"]["code"], "DBX-1001");
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_request() {
        let response = host().handle_message("{not json").await;
        assert_eq!(response["error"]["code"], "DBX-1001");
        assert!(response.get("id").is_none());
    }

    #[tokio::test]
    async fn missing_params_are_invalid_request() {
        let mut host = host();
        let err = host.handle("run", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "DBX-1001");
        let err = host
            .handle("set_credential", json!({"field": "password", "value": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DBX-1001");
    }

    #[tokio::test]
    async fn credentials_round_trip_through_paths() {
        let mut host = host();
        host.handle(
            "set_credential",
            json!({"field": "endpoint", "value": "http://localhost:1/graphql"}),
        )
        .await
        .unwrap();

        let value = host
            .handle("get", json!({"path": "config.credentials.graphql.endpoint"}))
            .await
            .unwrap();
        assert_eq!(value, "http://localhost:1/graphql");
    }

    #[tokio::test]
    async fn describe_reference_and_shutdown() {
        let mut host = host();
        let described = host.handle("describe", Value::Null).await.unwrap();
        assert_eq!(described["key"], "graphql");

        let reference = host
            .handle("reference", json!({"name": "Pokemon"}))
            .await
            .unwrap();
        assert_eq!(reference, "#Pokemon");

        assert!(!host.is_shutdown());
        host.handle("shutdown", Value::Null).await.unwrap();
        assert!(host.is_shutdown());
    }

    #[tokio::test]
    async fn run_before_connect_reports_no_connection() {
        let mut host = host();
        let response = host
            .handle_message(r#"{"id":"a","method":"run","params":{"query":"{ a }"}}"#)
            .await;
        assert_eq!(response["id"], "a");
        assert_eq!(response["error"]["code"], "DBX-3002");
    }
}
