//! Client-side schema built from an introspection result.

use std::collections::HashMap;
use std::fmt;

use dbx_core::DbxError;
use serde::Serialize;
use thiserror::Error;

use crate::introspection::{
    IntrospectionDirective, IntrospectionEnumValue, IntrospectionField, IntrospectionInputValue,
    IntrospectionResult, IntrospectionSchema, IntrospectionType, IntrospectionTypeRef, TypeKind,
};

/// Failure to build a [`ClientSchema`] from an introspection payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBuildError {
    /// The payload has no `__schema` object.
    #[error("invalid or incomplete introspection result: missing __schema")]
    MissingSchema,

    /// `__schema` does not have the expected shape.
    #[error("invalid introspection result: {0}")]
    Decode(String),

    /// A named type entry without a name.
    #[error("introspection result contains a {kind} type without a name")]
    UnnamedType {
        /// Kind of the offending entry.
        kind: &'static str,
    },

    /// Two type entries share a name.
    #[error("introspection result contains duplicate type {0}")]
    DuplicateType(String),

    /// A reference to a type that the result does not define.
    #[error("invalid or incomplete schema, unknown type: {0}")]
    UnknownType(String),

    /// A `LIST` or `NON_NULL` wrapper with no inner type.
    #[error("decorated type deeper than introspection query in {context}")]
    MissingOfType {
        /// Where the reference was found.
        context: String,
    },

    /// A type entry lacks the member list its kind requires.
    #[error("introspection result missing {member} for {kind} type {type_name}")]
    MissingMembers {
        /// Type name.
        type_name: String,
        /// Type kind.
        kind: &'static str,
        /// Missing member list.
        member: &'static str,
    },

    /// A root operation type is not an object type.
    #[error("{operation} root type {name} must be an OBJECT type")]
    InvalidRootType {
        /// `query`, `mutation` or `subscription`.
        operation: &'static str,
        /// Offending type name.
        name: String,
    },
}

impl From<SchemaBuildError> for DbxError {
    fn from(err: SchemaBuildError) -> Self {
        Self::SchemaBuild {
            message: err.to_string(),
        }
    }
}

/// Type reference with list / non-null wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A named type.
    Named(String),
    /// `[T]`
    List(Box<FieldType>),
    /// `T!`
    NonNull(Box<FieldType>),
}

impl FieldType {
    /// Name of the innermost named type.
    #[must_use]
    pub fn named(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.named(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Argument or input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValueDef {
    /// Name as declared.
    pub name: String,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Default value as GraphQL source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Output field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    /// Name as declared.
    pub name: String,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<InputValueDef>,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Marked `@deprecated`.
    pub is_deprecated: bool,
    /// Reason given to `@deprecated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
}

/// Enum value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDef {
    /// Name as declared.
    pub name: String,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Marked `@deprecated`.
    pub is_deprecated: bool,
    /// Reason given to `@deprecated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
}

/// Directive definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveDef {
    /// Name as declared.
    pub name: String,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Locations the directive may appear in.
    pub locations: Vec<String>,
    /// Arguments in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<InputValueDef>,
}

/// A named type in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedType {
    /// Name as declared.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields of an object or interface.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
    /// Fields of an input object.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_fields: Vec<InputValueDef>,
    /// Interfaces an object or interface implements.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Members of a union or implementors of an interface.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub possible_types: Vec<String>,
    /// Values of an enum.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValueDef>,
}

impl NamedType {
    /// Introspection meta types (`__Schema`, `__Type`, ...).
    #[must_use]
    pub fn is_introspection_type(&self) -> bool {
        self.name.starts_with("__")
    }

    /// `String`, `Int`, `Float`, `Boolean` and `ID`.
    #[must_use]
    pub fn is_builtin_scalar(&self) -> bool {
        self.kind == TypeKind::Scalar
            && matches!(
                self.name.as_str(),
                "String" | "Int" | "Float" | "Boolean" | "ID"
            )
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Client-side schema: the structure editor hinting, linting and the docs
/// browser work from.
///
/// Built once per introspection result and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mutation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_type: Option<String>,
    types: Vec<NamedType>,
    directives: Vec<DirectiveDef>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ClientSchema {
    /// Build a schema from an introspection result.
    pub fn from_introspection(result: &IntrospectionResult) -> Result<Self, SchemaBuildError> {
        let raw = result
            .data()
            .get("__schema")
            .filter(|value| value.is_object())
            .ok_or(SchemaBuildError::MissingSchema)?;
        let schema: IntrospectionSchema = serde_json::from_value(raw.clone())
            .map_err(|err| SchemaBuildError::Decode(err.to_string()))?;
        SchemaBuilder::default().build(schema)
    }

    /// Schema description, if the server reports one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// All named types in server order.
    #[must_use]
    pub fn types(&self) -> &[NamedType] {
        &self.types
    }

    /// All directive definitions.
    #[must_use]
    pub fn directives(&self) -> &[DirectiveDef] {
        &self.directives
    }

    /// Look up a named type.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.index.get(name).map(|&idx| &self.types[idx])
    }

    /// Root query type.
    #[must_use]
    pub fn query_type(&self) -> Option<&NamedType> {
        self.query_type.as_deref().and_then(|name| self.get_type(name))
    }

    /// Root mutation type.
    #[must_use]
    pub fn mutation_type(&self) -> Option<&NamedType> {
        self.mutation_type
            .as_deref()
            .and_then(|name| self.get_type(name))
    }

    /// Root subscription type.
    #[must_use]
    pub fn subscription_type(&self) -> Option<&NamedType> {
        self.subscription_type
            .as_deref()
            .and_then(|name| self.get_type(name))
    }

    /// Fields of an object or interface type; empty for other kinds.
    #[must_use]
    pub fn fields_of(&self, type_name: &str) -> &[FieldDef] {
        self.get_type(type_name)
            .map(|named| named.fields.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn root_names(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            self.query_type.as_deref(),
            self.mutation_type.as_deref(),
            self.subscription_type.as_deref(),
        )
    }
}

#[derive(Default)]
struct SchemaBuilder {
    index: HashMap<String, usize>,
    kinds: Vec<TypeKind>,
}

impl SchemaBuilder {
    fn build(mut self, schema: IntrospectionSchema) -> Result<ClientSchema, SchemaBuildError> {
        for raw in &schema.types {
            let name = raw.name.clone().ok_or(SchemaBuildError::UnnamedType {
                kind: raw.kind.as_str(),
            })?;
            if self.index.contains_key(&name) {
                return Err(SchemaBuildError::DuplicateType(name));
            }
            self.index.insert(name, self.kinds.len());
            self.kinds.push(raw.kind);
        }

        let query_type = self.root("query", schema.query_type.map(|root| root.name))?;
        let mutation_type = self.root("mutation", schema.mutation_type.map(|root| root.name))?;
        let subscription_type =
            self.root("subscription", schema.subscription_type.map(|root| root.name))?;

        let types = schema
            .types
            .into_iter()
            .map(|raw| self.named_type(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let directives = schema
            .directives
            .into_iter()
            .map(|raw| self.directive(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClientSchema {
            description: schema.description,
            query_type,
            mutation_type,
            subscription_type,
            types,
            directives,
            index: self.index,
        })
    }

    fn root(
        &self,
        operation: &'static str,
        name: Option<String>,
    ) -> Result<Option<String>, SchemaBuildError> {
        let Some(name) = name else {
            return Ok(None);
        };
        match self.index.get(&name).map(|&idx| self.kinds[idx]) {
            None => Err(SchemaBuildError::UnknownType(name)),
            Some(TypeKind::Object) => Ok(Some(name)),
            Some(_) => Err(SchemaBuildError::InvalidRootType { operation, name }),
        }
    }

    fn named_type(&self, raw: IntrospectionType) -> Result<NamedType, SchemaBuildError> {
        let name = raw.name.unwrap_or_default();
        let kind = raw.kind;
        let missing = |member: &'static str| SchemaBuildError::MissingMembers {
            type_name: name.clone(),
            kind: kind.as_str(),
            member,
        };

        let mut named = NamedType {
            name: name.clone(),
            kind,
            description: raw.description,
            fields: Vec::new(),
            input_fields: Vec::new(),
            interfaces: Vec::new(),
            possible_types: Vec::new(),
            enum_values: Vec::new(),
        };

        match kind {
            TypeKind::Object | TypeKind::Interface => {
                let fields = raw.fields.ok_or_else(|| missing("fields"))?;
                named.fields = fields
                    .into_iter()
                    .map(|field| self.field(&name, field))
                    .collect::<Result<_, _>>()?;
                named.interfaces = raw
                    .interfaces
                    .unwrap_or_default()
                    .iter()
                    .map(|iface| self.reference_name(&name, iface))
                    .collect::<Result<_, _>>()?;
            }
            TypeKind::Union => {
                let members = raw.possible_types.ok_or_else(|| missing("possibleTypes"))?;
                named.possible_types = members
                    .iter()
                    .map(|member| self.reference_name(&name, member))
                    .collect::<Result<_, _>>()?;
            }
            TypeKind::Enum => {
                let values = raw.enum_values.ok_or_else(|| missing("enumValues"))?;
                named.enum_values = values.into_iter().map(enum_value).collect();
            }
            TypeKind::InputObject => {
                let inputs = raw.input_fields.ok_or_else(|| missing("inputFields"))?;
                named.input_fields = inputs
                    .into_iter()
                    .map(|input| self.input_value(&name, input))
                    .collect::<Result<_, _>>()?;
            }
            TypeKind::Scalar | TypeKind::List | TypeKind::NonNull => {}
        }

        Ok(named)
    }

    fn field(&self, owner: &str, raw: IntrospectionField) -> Result<FieldDef, SchemaBuildError> {
        let context = format!("{owner}.{}", raw.name);
        let args = raw
            .args
            .into_iter()
            .map(|arg| self.input_value(&context, arg))
            .collect::<Result<_, _>>()?;
        Ok(FieldDef {
            ty: self.field_type(&context, &raw.ty)?,
            name: raw.name,
            description: raw.description,
            args,
            is_deprecated: raw.is_deprecated,
            deprecation_reason: raw.deprecation_reason,
        })
    }

    fn input_value(
        &self,
        owner: &str,
        raw: IntrospectionInputValue,
    ) -> Result<InputValueDef, SchemaBuildError> {
        let context = format!("{owner}({})", raw.name);
        Ok(InputValueDef {
            ty: self.field_type(&context, &raw.ty)?,
            name: raw.name,
            description: raw.description,
            default_value: raw.default_value,
        })
    }

    fn directive(&self, raw: IntrospectionDirective) -> Result<DirectiveDef, SchemaBuildError> {
        let context = format!("@{}", raw.name);
        let args = raw
            .args
            .into_iter()
            .map(|arg| self.input_value(&context, arg))
            .collect::<Result<_, _>>()?;
        Ok(DirectiveDef {
            name: raw.name,
            description: raw.description,
            locations: raw.locations,
            args,
        })
    }

    fn field_type(
        &self,
        context: &str,
        raw: &IntrospectionTypeRef,
    ) -> Result<FieldType, SchemaBuildError> {
        match raw.kind {
            TypeKind::List | TypeKind::NonNull => {
                let inner = raw
                    .of_type
                    .as_deref()
                    .ok_or_else(|| SchemaBuildError::MissingOfType {
                        context: context.to_string(),
                    })?;
                let inner = Box::new(self.field_type(context, inner)?);
                Ok(if raw.kind == TypeKind::List {
                    FieldType::List(inner)
                } else {
                    FieldType::NonNull(inner)
                })
            }
            _ => self.reference_name(context, raw).map(FieldType::Named),
        }
    }

    fn reference_name(
        &self,
        context: &str,
        raw: &IntrospectionTypeRef,
    ) -> Result<String, SchemaBuildError> {
        let name = raw
            .name
            .clone()
            .ok_or_else(|| SchemaBuildError::Decode(format!("type reference without a name in {context}")))?;
        if self.index.contains_key(&name) {
            Ok(name)
        } else {
            Err(SchemaBuildError::UnknownType(name))
        }
    }
}

fn enum_value(raw: IntrospectionEnumValue) -> EnumValueDef {
    EnumValueDef {
        name: raw.name,
        description: raw.description,
        is_deprecated: raw.is_deprecated,
        deprecation_reason: raw.deprecation_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(kind: &str, name: &str) -> serde_json::Value {
        json!({"kind": kind, "name": name, "ofType": null})
    }

    fn scalar(name: &str) -> serde_json::Value {
        json!({"kind": "SCALAR", "name": name, "description": null})
    }

    fn sample() -> serde_json::Value {
        json!({
            "__schema": {
                "queryType": {"name": "Query"},
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "description": "Root query",
                        "fields": [
                            {
                                "name": "pokemons",
                                "description": null,
                                "args": [
                                    {"name": "first", "description": null, "type": {"kind": "NON_NULL", "name": null, "ofType": named("SCALAR", "Int")}, "defaultValue": null}
                                ],
                                "type": {"kind": "LIST", "name": null, "ofType": named("OBJECT", "Pokemon")},
                                "isDeprecated": false,
                                "deprecationReason": null
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "OBJECT",
                        "name": "Pokemon",
                        "description": null,
                        "fields": [
                            {"name": "id", "description": null, "args": [], "type": {"kind": "NON_NULL", "name": null, "ofType": named("SCALAR", "ID")}, "isDeprecated": false, "deprecationReason": null},
                            {"name": "name", "description": null, "args": [], "type": named("SCALAR", "String"), "isDeprecated": false, "deprecationReason": null}
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    scalar("Int"),
                    scalar("ID"),
                    scalar("String")
                ],
                "directives": []
            }
        })
    }

    fn build(value: serde_json::Value) -> Result<ClientSchema, SchemaBuildError> {
        ClientSchema::from_introspection(&IntrospectionResult::new(value))
    }

    #[test]
    fn builds_types_and_roots() {
        let schema = build(sample()).unwrap();
        assert_eq!(schema.query_type().unwrap().name, "Query");
        assert!(schema.mutation_type().is_none());
        assert_eq!(schema.types().len(), 5);

        let pokemons = schema.query_type().unwrap().field("pokemons").unwrap();
        assert_eq!(pokemons.ty.to_string(), "[Pokemon]");
        assert_eq!(pokemons.ty.named(), "Pokemon");
        assert_eq!(pokemons.args[0].ty.to_string(), "Int!");

        let fields: Vec<_> = schema
            .fields_of("Pokemon")
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        assert_eq!(fields, vec!["id", "name"]);
        assert!(schema.fields_of("Missing").is_empty());
    }

    #[test]
    fn missing_schema_is_rejected() {
        assert_eq!(
            build(json!({"data": {}})).unwrap_err(),
            SchemaBuildError::MissingSchema
        );
    }

    #[test]
    fn unknown_type_reference_is_rejected() {
        let mut raw = sample();
        raw["__schema"]["types"]
            .as_array_mut()
            .unwrap()
            .retain(|ty| ty["name"] != "ID");
        assert_eq!(
            build(raw).unwrap_err(),
            SchemaBuildError::UnknownType("ID".into())
        );
    }

    #[test]
    fn object_without_fields_is_rejected() {
        let mut raw = sample();
        raw["__schema"]["types"][1]["fields"] = serde_json::Value::Null;
        assert!(matches!(
            build(raw).unwrap_err(),
            SchemaBuildError::MissingMembers { member: "fields", .. }
        ));
    }

    #[test]
    fn wrapper_without_inner_type_is_rejected() {
        let mut raw = sample();
        raw["__schema"]["types"][1]["fields"][0]["type"]["ofType"] = serde_json::Value::Null;
        assert!(matches!(
            build(raw).unwrap_err(),
            SchemaBuildError::MissingOfType { .. }
        ));
    }

    #[test]
    fn root_type_must_be_an_object() {
        let mut raw = sample();
        raw["__schema"]["queryType"] = json!({"name": "String"});
        assert!(matches!(
            build(raw).unwrap_err(),
            SchemaBuildError::InvalidRootType { operation: "query", .. }
        ));
    }

    #[test]
    fn duplicate_types_are_rejected() {
        let mut raw = sample();
        raw["__schema"]["types"]
            .as_array_mut()
            .unwrap()
            .push(scalar("Int"));
        assert_eq!(
            build(raw).unwrap_err(),
            SchemaBuildError::DuplicateType("Int".into())
        );
    }

    #[test]
    fn build_error_maps_into_dbx_error() {
        let err: DbxError = SchemaBuildError::MissingSchema.into();
        assert!(matches!(err, DbxError::SchemaBuild { .. }));
    }
}
