//! GraphQL-over-HTTP client bound to one user-supplied endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{GraphqlClientError, GraphqlError};
use crate::introspection::{IntrospectionQuery, IntrospectionResult, NoVariables};
use crate::operation::{GraphqlOperation, GraphqlQuery, GraphqlRequest, GraphqlResponse};

const MAX_ERROR_BODY: usize = 4096;

/// Request counters shared by clones of a client.
#[derive(Debug, Default)]
#[allow(clippy::struct_field_names)]
pub struct GraphqlClientMetrics {
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_error: AtomicU64,
}

impl GraphqlClientMetrics {
    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> GraphqlClientMetricsSnapshot {
        GraphqlClientMetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_error: self.requests_error.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`GraphqlClientMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_field_names)]
pub struct GraphqlClientMetricsSnapshot {
    /// Total requests sent.
    pub requests_total: u64,
    /// Requests answered without errors.
    pub requests_success: u64,
    /// Requests that failed at the HTTP or GraphQL layer.
    pub requests_error: u64,
}

/// Settings applied to every request a client sends.
#[derive(Debug, Clone)]
pub struct GraphqlClientConfig {
    /// Service name used in log fields.
    pub service_name: String,
    /// Default headers applied to every request.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GraphqlClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            service_name: "graphql".to_string(),
            headers,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Builds a [`GraphqlClient`] from an endpoint and credentials.
#[derive(Debug, Clone)]
pub struct GraphqlClientBuilder {
    endpoint: String,
    config: GraphqlClientConfig,
    rejected: Option<GraphqlClientError>,
}

impl GraphqlClientBuilder {
    /// Start from defaults for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            config: GraphqlClientConfig::default(),
            rejected: None,
        }
    }

    /// Name reported in log fields.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.config.service_name = service_name.into();
        self
    }

    /// Add an `Authorization: Bearer <token>` header.
    ///
    /// An empty token adds nothing. A token that is not a valid header value
    /// makes [`build`](Self::build) fail with
    /// [`GraphqlClientError::InvalidCredentials`].
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        let token = token.as_ref();
        if token.is_empty() {
            return self;
        }
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut header) => {
                header.set_sensitive(true);
                self.config.headers.insert(AUTHORIZATION, header);
            }
            Err(_) => {
                self.rejected = Some(GraphqlClientError::InvalidCredentials {
                    message: "bearer token is not a valid header value".to_string(),
                });
            }
        }
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the underlying HTTP client.
    pub fn build(self) -> Result<GraphqlClient, GraphqlClientError> {
        if let Some(err) = self.rejected {
            return Err(err);
        }
        GraphqlClient::with_config(self.endpoint, self.config)
    }
}

/// GraphQL client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
    config: GraphqlClientConfig,
    metrics: Arc<GraphqlClientMetrics>,
}

impl GraphqlClient {
    /// Create a client for `endpoint`. The endpoint is not validated until the first send.
    pub fn with_config(
        endpoint: impl Into<String>,
        config: GraphqlClientConfig,
    ) -> Result<Self, GraphqlClientError> {
        let http = reqwest::Client::builder()
            .default_headers(config.headers.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            config,
            metrics: Arc::new(GraphqlClientMetrics::default()),
        })
    }

    /// Endpoint URL this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether requests carry an `Authorization` header.
    #[must_use]
    pub fn has_authorization(&self) -> bool {
        self.config.headers.contains_key(AUTHORIZATION)
    }

    /// Counters so far.
    #[must_use]
    pub fn metrics(&self) -> GraphqlClientMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Execute a typed operation and return the full response.
    pub async fn execute<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        let request = GraphqlRequest::new(GraphqlQuery::from_static(O::QUERY))
            .with_variables(variables)
            .with_operation_name(O::OPERATION_NAME);
        self.execute_request(request).await
    }

    /// Execute an arbitrary request and return the full response.
    ///
    /// GraphQL errors in a 2xx response are returned inside the response; a
    /// non-2xx response is an [`GraphqlClientError::HttpStatus`].
    pub async fn execute_request<V, R>(
        &self,
        request: GraphqlRequest<V>,
    ) -> Result<GraphqlResponse<R>, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(&request)?;
        let bytes = self.send_once(body).await?;
        let response: GraphqlResponse<R> = serde_json::from_slice(&bytes)?;

        if response.is_ok() {
            self.metrics
                .requests_success
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.metrics.requests_error.fetch_add(1, Ordering::Relaxed);
        }
        Ok(response)
    }

    /// Send `query` and return the response `data`.
    ///
    /// A response with GraphQL errors fails with
    /// [`GraphqlClientError::GraphqlErrors`] even when partial data is
    /// present; a response without errors and without data is a protocol
    /// error.
    pub async fn request(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        operation_name: Option<&str>,
    ) -> Result<serde_json::Value, GraphqlClientError> {
        let mut request = GraphqlRequest::new(GraphqlQuery::new(query));
        request.variables = variables;
        request.operation_name = operation_name.map(str::to_string);

        let response: GraphqlResponse<serde_json::Value> = self.execute_request(request).await?;
        into_data(response)
    }

    /// Run the standard introspection query.
    pub async fn introspect(&self) -> Result<IntrospectionResult, GraphqlClientError> {
        let response = self.execute::<IntrospectionQuery>(NoVariables {}).await?;
        let data = into_data(response)?;
        if data.get("__schema").is_none_or(serde_json::Value::is_null) {
            return Err(GraphqlClientError::Protocol {
                message: "introspection response has no __schema".to_string(),
            });
        }
        Ok(IntrospectionResult::new(data))
    }

    async fn send_once(&self, body: Vec<u8>) -> Result<Vec<u8>, GraphqlClientError> {
        self.metrics.requests_total.fetch_add(1, Ordering::Relaxed);
        debug!(
            service = %self.config.service_name,
            endpoint = %self.endpoint,
            bytes = body.len(),
            "sending GraphQL request"
        );

        let response = match self.http.post(&self.endpoint).body(body).send().await {
            Ok(response) => response,
            Err(err) => {
                self.metrics.requests_error.fetch_add(1, Ordering::Relaxed);
                return Err(err.into());
            }
        };

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            self.metrics.requests_error.fetch_add(1, Ordering::Relaxed);
            let errors = serde_json::from_slice::<GraphqlResponse<serde_json::Value>>(&bytes)
                .map(|parsed| parsed.errors)
                .unwrap_or_default();
            return Err(GraphqlClientError::HttpStatus {
                status,
                body: truncate_body(&bytes),
                errors,
            });
        }

        Ok(bytes.to_vec())
    }

    /// Wrap a server error list.
    #[must_use]
    pub const fn graphql_errors(errors: Vec<GraphqlError>) -> GraphqlClientError {
        GraphqlClientError::GraphqlErrors { errors }
    }
}

fn into_data(
    response: GraphqlResponse<serde_json::Value>,
) -> Result<serde_json::Value, GraphqlClientError> {
    if !response.errors.is_empty() {
        return Err(GraphqlClient::graphql_errors(response.errors));
    }
    response.data.ok_or_else(|| GraphqlClientError::Protocol {
        message: "missing GraphQL data".to_string(),
    })
}

fn truncate_body(bytes: &[u8]) -> String {
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_adds_no_authorization() {
        let client = GraphqlClientBuilder::new("http://localhost:1/")
            .with_bearer_token("")
            .build()
            .unwrap();
        assert!(!client.has_authorization());
    }

    #[test]
    fn token_adds_sensitive_authorization() {
        let builder = GraphqlClientBuilder::new("http://localhost:1/").with_bearer_token("abc");
        let header = builder.config.headers.get(AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
        assert!(header.is_sensitive());
    }

    #[test]
    fn invalid_token_fails_the_build() {
        let err = GraphqlClientBuilder::new("http://localhost:1/")
            .with_bearer_token("bad\ntoken")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphqlClientError::InvalidCredentials { .. }));
        assert!(!err.to_string().contains("bad"));
    }

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let truncated = truncate_body(body.as_bytes());
        assert!(truncated.ends_with('…'));
        assert!(truncated.len() <= MAX_ERROR_BODY + '…'.len_utf8());
    }

    #[test]
    fn errors_win_over_partial_data() {
        let response: GraphqlResponse<serde_json::Value> = serde_json::from_value(
            serde_json::json!({"data": {"a": 1}, "errors": [{"message": "boom"}]}),
        )
        .unwrap();
        assert!(matches!(
            into_data(response),
            Err(GraphqlClientError::GraphqlErrors { .. })
        ));
    }

    #[test]
    fn missing_data_is_a_protocol_error() {
        let response: GraphqlResponse<serde_json::Value> =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(
            into_data(response),
            Err(GraphqlClientError::Protocol { .. })
        ));
    }
}
