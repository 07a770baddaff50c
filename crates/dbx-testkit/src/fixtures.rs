//! Test fixtures for GraphQL connectors.
//!
//! Provides introspection payloads and query responses shaped like the
//! public Pokemon demo API.

use serde_json::{Value, json};

/// Query used by the Pokemon list fixture.
pub const POKEMONS_QUERY: &str = "{ pokemons(first: 2) { number name } }";

/// Query used by the single-Pokemon fixture.
pub const POKEMON_QUERY: &str = "{ pokemon(name: \"Pikachu\") { number name } }";

// ─────────────────────────────────────────────────────────────────────────────
// Type reference helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `{ kind, name, ofType: null }`
#[must_use]
pub fn named(kind: &str, name: &str) -> Value {
    json!({ "kind": kind, "name": name, "ofType": null })
}

/// `[inner]`
#[must_use]
pub fn list(inner: Value) -> Value {
    json!({ "kind": "LIST", "name": null, "ofType": inner })
}

/// `inner!`
#[must_use]
pub fn non_null(inner: Value) -> Value {
    json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
}

fn field(name: &str, ty: Value) -> Value {
    json!({
        "name": name,
        "description": null,
        "args": [],
        "type": ty,
        "isDeprecated": false,
        "deprecationReason": null
    })
}

fn arg(name: &str, ty: Value) -> Value {
    json!({ "name": name, "description": null, "type": ty, "defaultValue": null })
}

fn scalar(name: &str, description: &str) -> Value {
    json!({
        "kind": "SCALAR",
        "name": name,
        "description": description,
        "fields": null,
        "inputFields": null,
        "interfaces": null,
        "enumValues": null,
        "possibleTypes": null
    })
}

fn object(name: &str, description: &str, fields: Vec<Value>) -> Value {
    json!({
        "kind": "OBJECT",
        "name": name,
        "description": description,
        "fields": fields,
        "inputFields": null,
        "interfaces": [],
        "enumValues": null,
        "possibleTypes": null
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Introspection fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Introspection `data` for a small Pokemon schema.
#[must_use]
pub fn pokemon_introspection() -> Value {
    let mut pokemon_field = field("pokemon", named("OBJECT", "Pokemon"));
    pokemon_field["args"] = json!([
        arg("id", named("SCALAR", "String")),
        arg("name", named("SCALAR", "String"))
    ]);
    let mut pokemons_field = field("pokemons", list(named("OBJECT", "Pokemon")));
    pokemons_field["args"] = json!([arg("first", non_null(named("SCALAR", "Int")))]);

    json!({
        "__schema": {
            "queryType": { "name": "Query" },
            "mutationType": null,
            "subscriptionType": null,
            "types": [
                object("Query", "Query any Pokemon by number or name", vec![
                    field("query", named("OBJECT", "Query")),
                    pokemons_field,
                    pokemon_field
                ]),
                object("Pokemon", "Represents a Pokemon", vec![
                    field("id", non_null(named("SCALAR", "ID"))),
                    field("number", named("SCALAR", "String")),
                    field("name", named("SCALAR", "String")),
                    field("types", list(named("SCALAR", "String"))),
                    field("attacks", named("OBJECT", "PokemonAttack"))
                ]),
                object("PokemonAttack", "Represents a Pokemon's attack types", vec![
                    field("fast", list(named("OBJECT", "Attack"))),
                    field("special", list(named("OBJECT", "Attack")))
                ]),
                object("Attack", "Represents a Pokemon's attack types", vec![
                    field("name", named("SCALAR", "String")),
                    field("type", named("SCALAR", "String")),
                    field("damage", named("SCALAR", "Int"))
                ]),
                scalar("ID", "The `ID` scalar type represents a unique identifier"),
                scalar("String", "The `String` scalar type represents textual data"),
                scalar("Int", "The `Int` scalar type represents non-fractional signed whole numeric values"),
                scalar("Boolean", "The `Boolean` scalar type represents `true` or `false`")
            ],
            "directives": [
                {
                    "name": "include",
                    "description": "Directs the executor to include this field or fragment only when the `if` argument is true.",
                    "locations": ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
                    "args": [arg("if", non_null(named("SCALAR", "Boolean")))]
                },
                {
                    "name": "skip",
                    "description": "Directs the executor to skip this field or fragment when the `if` argument is true.",
                    "locations": ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
                    "args": [arg("if", non_null(named("SCALAR", "Boolean")))]
                }
            ]
        }
    })
}

/// Introspection `data` with a single `hello: String` query field.
#[must_use]
pub fn minimal_introspection() -> Value {
    json!({
        "__schema": {
            "queryType": { "name": "Query" },
            "types": [
                object("Query", "", vec![field("hello", named("SCALAR", "String"))]),
                scalar("String", "")
            ],
            "directives": []
        }
    })
}

/// Introspection `data` that no schema can be built from.
#[must_use]
pub fn broken_introspection() -> Value {
    json!({
        "__schema": {
            "queryType": { "name": "Query" },
            "types": [
                object("Query", "", vec![field("missing", named("OBJECT", "Nowhere"))])
            ],
            "directives": []
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Query response fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// `data` for [`POKEMONS_QUERY`].
#[must_use]
pub fn pokemons_data() -> Value {
    json!({
        "pokemons": [
            { "number": "001", "name": "Bulbasaur" },
            { "number": "002", "name": "Ivysaur" }
        ]
    })
}

/// `data` for [`POKEMON_QUERY`].
#[must_use]
pub fn pokemon_data() -> Value {
    json!({
        "pokemon": { "number": "025", "name": "Pikachu" }
    })
}

/// A GraphQL error list as a server reports it.
#[must_use]
pub fn graphql_errors(message: &str) -> Value {
    json!([
        {
            "message": message,
            "locations": [{ "line": 1, "column": 3 }]
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokemon_schema_lists_root_and_builtins() {
        let introspection = pokemon_introspection();
        let types = introspection["__schema"]["types"].as_array().unwrap();
        assert_eq!(types[0]["name"], "Query");
        assert!(types.iter().any(|ty| ty["name"] == "Boolean"));
    }

    #[test]
    fn list_wraps_inner_reference() {
        let ty = non_null(list(named("SCALAR", "Int")));
        assert_eq!(ty["ofType"]["ofType"]["name"], "Int");
    }
}
