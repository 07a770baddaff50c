//! Wire types for GraphQL-over-HTTP requests and responses.

use serde::{Deserialize, Serialize};

use crate::error::GraphqlError;

/// Query document text, serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphqlQuery {
    query: String,
}

impl GraphqlQuery {
    /// Wrap query text.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Wrap a compile-time query such as the introspection query.
    #[must_use]
    pub fn from_static(query: &'static str) -> Self {
        Self::new(query)
    }

    /// Query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.query
    }
}

/// A fixed query the connector issues with known variable and data types.
pub trait GraphqlOperation {
    type Variables: Serialize + Send + Sync;
    type ResponseData: for<'de> Deserialize<'de> + Send + Sync;

    /// Document text.
    const QUERY: &'static str;
    /// Sent as `operationName`.
    const OPERATION_NAME: &'static str;
}

/// Request body posted to the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<V> {
    pub query: GraphqlQuery,
    /// Variables; omitted from the wire when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
    /// Omitted from the wire when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl<V> GraphqlRequest<V> {
    /// Request with only a query.
    #[must_use]
    pub const fn new(query: GraphqlQuery) -> Self {
        Self {
            query,
            variables: None,
            operation_name: None,
        }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: V) -> Self {
        self.variables = Some(variables);
        self
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Response body: `data`, `errors` and `extensions`, all optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    /// Empty when the server sent none.
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl<T> GraphqlResponse<T> {
    /// No GraphQL errors were reported.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_absent_fields() {
        let request: GraphqlRequest<serde_json::Value> =
            GraphqlRequest::new(GraphqlQuery::new("{ viewer { id } }"));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, serde_json::json!({"query": "{ viewer { id } }"}));
    }

    #[test]
    fn request_uses_wire_field_names() {
        let request = GraphqlRequest::new(GraphqlQuery::new("query Q($id: ID!) { node(id: $id) { id } }"))
            .with_variables(serde_json::json!({"id": "1"}))
            .with_operation_name("Q");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["operationName"], "Q");
        assert_eq!(body["variables"]["id"], "1");
    }

    #[test]
    fn response_defaults_missing_errors() {
        let response: GraphqlResponse<serde_json::Value> =
            serde_json::from_value(serde_json::json!({"data": {"a": 1}})).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.data.unwrap()["a"], 1);
    }
}
