//! Mock GraphQL endpoint for testing connectors.
//!
//! Wraps wiremock with matchers for the shapes a GraphQL client posts.

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Path the mock endpoint is served on.
pub const GRAPHQL_PATH: &str = "/graphql";

const INTROSPECTION_OPERATION: &str = "IntrospectionQuery";

/// A mock GraphQL server.
///
/// Responses are JSON bodies; key order in the fixture is the key order on
/// the wire.
pub struct MockGraphqlServer {
    server: MockServer,
}

impl MockGraphqlServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Full GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{GRAPHQL_PATH}", self.server.uri())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Response Setup
    // ─────────────────────────────────────────────────────────────────────────────

    /// Answer the introspection query with `{ "data": introspection }`.
    pub async fn expect_introspection(&self, introspection: Value) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_partial_json(
                json!({ "operationName": INTROSPECTION_OPERATION }),
            ))
            .respond_with(json_response(200, json!({ "data": introspection })))
            .mount(&self.server)
            .await;
    }

    /// Answer the introspection query only when the bearer token matches.
    pub async fn expect_introspection_with_token(&self, token: &str, introspection: Value) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .and(body_partial_json(
                json!({ "operationName": INTROSPECTION_OPERATION }),
            ))
            .respond_with(json_response(200, json!({ "data": introspection })))
            .mount(&self.server)
            .await;
    }

    /// Answer requests whose `query` equals `query` with `{ "data": data }`.
    pub async fn expect_query(&self, query: &str, data: Value) {
        self.expect_query_body(query, json!({ "data": data })).await;
    }

    /// Answer requests whose `query` equals `query` with GraphQL errors.
    pub async fn expect_graphql_errors(&self, query: &str, errors: Value) {
        self.expect_query_body(query, json!({ "errors": errors }))
            .await;
    }

    /// Answer requests whose `query` equals `query` with a raw 200 body.
    pub async fn expect_query_body(&self, query: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_partial_json(json!({ "query": query })))
            .respond_with(json_response(200, body))
            .mount(&self.server)
            .await;
    }

    /// Answer every request with `status` and a JSON body.
    pub async fn expect_status(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .respond_with(json_response(status, body))
            .mount(&self.server)
            .await;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────────

    /// Get all received requests for manual inspection.
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// JSON bodies of all received requests, in arrival order.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.received_requests()
            .await
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// `Authorization` header of each received request.
    pub async fn authorization_headers(&self) -> Vec<Option<String>> {
        self.received_requests()
            .await
            .iter()
            .map(|request| {
                request
                    .headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string)
            })
            .collect()
    }

    /// Number of introspection requests received.
    pub async fn introspection_count(&self) -> usize {
        self.received_bodies()
            .await
            .iter()
            .filter(|body| is_introspection(body))
            .count()
    }

    /// Number of non-introspection requests received.
    pub async fn query_count(&self) -> usize {
        self.received_bodies()
            .await
            .iter()
            .filter(|body| !is_introspection(body))
            .count()
    }

    /// Verify that a specific number of requests were received.
    ///
    /// # Panics
    ///
    /// Panics if the count doesn't match.
    pub async fn assert_request_count(&self, expected: usize) {
        let received = self.received_requests().await;
        assert_eq!(
            received.len(),
            expected,
            "Expected {} requests but received {}",
            expected,
            received.len()
        );
    }

    /// Verify that no requests were received.
    ///
    /// # Panics
    ///
    /// Panics if any requests were received.
    pub async fn assert_no_requests(&self) {
        self.assert_request_count(0).await;
    }

    /// Reset the mock server, clearing mounted mocks and recorded requests.
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}

fn is_introspection(body: &Value) -> bool {
    body.get("operationName").and_then(Value::as_str) == Some(INTROSPECTION_OPERATION)
}

fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_json(body)
        .insert_header("content-type", "application/json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_introspection_by_operation_name() {
        let mock = MockGraphqlServer::start().await;
        mock.expect_introspection(json!({"__schema": {}})).await;

        let response = reqwest::Client::new()
            .post(mock.endpoint())
            .json(&json!({"query": "query IntrospectionQuery { __schema { types { name } } }", "operationName": "IntrospectionQuery"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"data": {"__schema": {}}}));
        assert_eq!(mock.introspection_count().await, 1);
        assert_eq!(mock.query_count().await, 0);
    }

    #[tokio::test]
    async fn answers_queries_by_text() {
        let mock = MockGraphqlServer::start().await;
        mock.expect_query("{ a }", json!({"a": 1})).await;

        let body: Value = reqwest::Client::new()
            .post(mock.endpoint())
            .json(&json!({"query": "{ a }"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["data"]["a"], 1);
        assert_eq!(mock.authorization_headers().await, vec![None]);
        mock.assert_request_count(1).await;
    }

    #[tokio::test]
    async fn unmatched_request_is_not_found() {
        let mock = MockGraphqlServer::start().await;
        mock.expect_query("{ a }", json!({"a": 1})).await;

        let response = reqwest::Client::new()
            .post(mock.endpoint())
            .json(&json!({"query": "{ b }"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }
}
