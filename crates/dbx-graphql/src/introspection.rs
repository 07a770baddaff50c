//! The standard introspection query and the shapes it returns.

use serde::{Deserialize, Serialize};

use crate::operation::GraphqlOperation;

/// Standard introspection query, including descriptions and deprecations.
///
/// `TypeRef` nesting goes seven levels deep, enough for `[[T!]!]!`-style
/// wrappers used in practice.
pub const INTROSPECTION_QUERY: &str = r"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
";

/// Typed operation for [`INTROSPECTION_QUERY`].
///
/// The response stays an untyped JSON value; decoding happens when a
/// [`crate::ClientSchema`] is built from it.
#[derive(Debug, Clone, Copy)]
pub struct IntrospectionQuery;

/// No variables.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

impl GraphqlOperation for IntrospectionQuery {
    type Variables = NoVariables;
    type ResponseData = serde_json::Value;

    const QUERY: &'static str = INTROSPECTION_QUERY;
    const OPERATION_NAME: &'static str = "IntrospectionQuery";
}

/// Raw result of the introspection query (`{ "__schema": ... }`).
///
/// Opaque to the connector. Hold it behind an `Arc`: the schema cache keys on
/// the `Arc`'s identity, not on the contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntrospectionResult {
    data: serde_json::Value,
}

impl IntrospectionResult {
    /// Wrap raw response data.
    #[must_use]
    pub const fn new(data: serde_json::Value) -> Self {
        Self { data }
    }

    /// The raw response data.
    #[must_use]
    pub const fn data(&self) -> &serde_json::Value {
        &self.data
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire shapes of `__schema`
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a `__Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionSchema {
    #[serde(default)]
    pub description: Option<String>,
    pub query_type: Option<RootTypeRef>,
    #[serde(default)]
    pub mutation_type: Option<RootTypeRef>,
    #[serde(default)]
    pub subscription_type: Option<RootTypeRef>,
    pub types: Vec<IntrospectionType>,
    #[serde(default)]
    pub directives: Vec<IntrospectionDirective>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RootTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionType {
    pub kind: TypeKind,
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<IntrospectionField>>,
    #[serde(default)]
    pub input_fields: Option<Vec<IntrospectionInputValue>>,
    #[serde(default)]
    pub interfaces: Option<Vec<IntrospectionTypeRef>>,
    #[serde(default)]
    pub enum_values: Option<Vec<IntrospectionEnumValue>>,
    #[serde(default)]
    pub possible_types: Option<Vec<IntrospectionTypeRef>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub ty: IntrospectionTypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionInputValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: IntrospectionTypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionEnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionDirective {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectionTypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<IntrospectionTypeRef>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_selects_the_schema_roots() {
        assert!(INTROSPECTION_QUERY.starts_with("query IntrospectionQuery"));
        assert!(INTROSPECTION_QUERY.contains("queryType { name }"));
        assert!(INTROSPECTION_QUERY.contains("fragment TypeRef on __Type"));
    }

    #[test]
    fn decodes_nested_type_refs() {
        let raw = serde_json::json!({
            "kind": "NON_NULL",
            "name": null,
            "ofType": {"kind": "LIST", "name": null, "ofType": {"kind": "SCALAR", "name": "Int", "ofType": null}}
        });
        let decoded: IntrospectionTypeRef = serde_json::from_value(raw).unwrap();
        assert_eq!(decoded.kind, TypeKind::NonNull);
        let inner = decoded.of_type.unwrap().of_type.unwrap();
        assert_eq!(inner.name.as_deref(), Some("Int"));
    }

    #[test]
    fn result_is_transparent_json() {
        let result = IntrospectionResult::new(serde_json::json!({"__schema": {}}));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"__schema": {}})
        );
    }
}
