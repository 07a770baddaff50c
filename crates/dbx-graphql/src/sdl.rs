//! SDL printing for a [`ClientSchema`].

use std::fmt::Write;

use crate::introspection::TypeKind;
use crate::schema::{ClientSchema, DirectiveDef, FieldDef, InputValueDef, NamedType};

const BUILTIN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

impl ClientSchema {
    /// Print the schema as SDL.
    ///
    /// Built-in scalars, introspection types and built-in directives are
    /// omitted. The `schema { ... }` block is printed only when root type
    /// names differ from `Query` / `Mutation` / `Subscription`.
    #[must_use]
    pub fn to_sdl(&self) -> String {
        let mut blocks = Vec::new();

        if let Some(block) = self.schema_block() {
            blocks.push(block);
        }
        for directive in self.directives() {
            if !BUILTIN_DIRECTIVES.contains(&directive.name.as_str()) {
                blocks.push(print_directive(directive));
            }
        }
        for named in self.types() {
            if !named.is_introspection_type() && !named.is_builtin_scalar() {
                blocks.push(print_type(named));
            }
        }

        let mut sdl = blocks.join("\n\n");
        sdl.push('\n');
        sdl
    }

    fn schema_block(&self) -> Option<String> {
        let (query, mutation, subscription) = self.root_names();
        let conventional = query.is_none_or(|name| name == "Query")
            && mutation.is_none_or(|name| name == "Mutation")
            && subscription.is_none_or(|name| name == "Subscription");
        if conventional && self.description().is_none() {
            return None;
        }

        let mut out = description_block(self.description(), "");
        out.push_str("schema {\n");
        for (operation, name) in [
            ("query", query),
            ("mutation", mutation),
            ("subscription", subscription),
        ] {
            if let Some(name) = name {
                let _ = writeln!(out, "  {operation}: {name}");
            }
        }
        out.push('}');
        Some(out)
    }
}

fn print_type(named: &NamedType) -> String {
    let mut out = description_block(named.description.as_deref(), "");
    match named.kind {
        TypeKind::Scalar => {
            let _ = write!(out, "scalar {}", named.name);
        }
        TypeKind::Object | TypeKind::Interface => {
            let keyword = if named.kind == TypeKind::Object {
                "type"
            } else {
                "interface"
            };
            let _ = write!(out, "{keyword} {}", named.name);
            if !named.interfaces.is_empty() {
                let _ = write!(out, " implements {}", named.interfaces.join(" & "));
            }
            out.push_str(&print_fields(&named.fields));
        }
        TypeKind::Union => {
            let _ = write!(out, "union {}", named.name);
            if !named.possible_types.is_empty() {
                let _ = write!(out, " = {}", named.possible_types.join(" | "));
            }
        }
        TypeKind::Enum => {
            let _ = write!(out, "enum {}", named.name);
            let lines: Vec<String> = named
                .enum_values
                .iter()
                .map(|value| {
                    let mut line = description_block(value.description.as_deref(), "  ");
                    let _ = write!(line, "  {}", value.name);
                    line.push_str(&deprecation(
                        value.is_deprecated,
                        value.deprecation_reason.as_deref(),
                    ));
                    line
                })
                .collect();
            out.push_str(&braced(&lines));
        }
        TypeKind::InputObject => {
            let _ = write!(out, "input {}", named.name);
            let lines: Vec<String> = named
                .input_fields
                .iter()
                .map(|input| {
                    let mut line = description_block(input.description.as_deref(), "  ");
                    let _ = write!(line, "  {}", print_input_value(input));
                    line
                })
                .collect();
            out.push_str(&braced(&lines));
        }
        TypeKind::List | TypeKind::NonNull => {}
    }
    out
}

fn print_fields(fields: &[FieldDef]) -> String {
    let lines: Vec<String> = fields
        .iter()
        .map(|field| {
            let mut line = description_block(field.description.as_deref(), "  ");
            let _ = write!(line, "  {}{}: {}", field.name, print_args(&field.args), field.ty);
            line.push_str(&deprecation(
                field.is_deprecated,
                field.deprecation_reason.as_deref(),
            ));
            line
        })
        .collect();
    braced(&lines)
}

fn print_directive(directive: &DirectiveDef) -> String {
    let mut out = description_block(directive.description.as_deref(), "");
    let _ = write!(
        out,
        "directive @{}{} on {}",
        directive.name,
        print_args(&directive.args),
        directive.locations.join(" | ")
    );
    out
}

fn print_args(args: &[InputValueDef]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let args: Vec<String> = args.iter().map(print_input_value).collect();
    format!("({})", args.join(", "))
}

fn print_input_value(input: &InputValueDef) -> String {
    match &input.default_value {
        Some(default) => format!("{}: {} = {default}", input.name, input.ty),
        None => format!("{}: {}", input.name, input.ty),
    }
}

fn deprecation(is_deprecated: bool, reason: Option<&str>) -> String {
    if !is_deprecated {
        return String::new();
    }
    match reason {
        Some(reason) if reason != "No longer supported" => {
            format!(" @deprecated(reason: {})", quote(reason))
        }
        _ => " @deprecated".to_string(),
    }
}

fn braced(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    format!(" {{\n{}\n}}", lines.join("\n"))
}

fn description_block(description: Option<&str>, indent: &str) -> String {
    match description {
        Some(text) if !text.is_empty() => {
            if text.contains('\n') || text.contains('"') {
                let body = text.replace("\"\"\"", "\\\"\"\"");
                let body = body
                    .lines()
                    .map(|line| format!("{indent}{line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{indent}\"\"\"\n{body}\n{indent}\"\"\"\n")
            } else {
                format!("{indent}\"{text}\"\n")
            }
        }
        _ => String::new(),
    }
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use crate::{ClientSchema, IntrospectionResult};
    use serde_json::json;

    fn scalar_ref(name: &str) -> serde_json::Value {
        json!({"kind": "SCALAR", "name": name, "ofType": null})
    }

    fn schema(query_name: &str) -> ClientSchema {
        let raw = json!({
            "__schema": {
                "queryType": {"name": query_name},
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": query_name,
                        "description": "Entry point",
                        "fields": [
                            {
                                "name": "pokemon",
                                "args": [
                                    {"name": "name", "type": scalar_ref("String"), "defaultValue": "\"pikachu\""}
                                ],
                                "type": {"kind": "OBJECT", "name": "Pokemon", "ofType": null},
                                "isDeprecated": false
                            },
                            {
                                "name": "legacy",
                                "args": [],
                                "type": scalar_ref("String"),
                                "isDeprecated": true,
                                "deprecationReason": "use pokemon"
                            }
                        ],
                        "interfaces": []
                    },
                    {
                        "kind": "OBJECT",
                        "name": "Pokemon",
                        "fields": [
                            {"name": "kind", "args": [], "type": {"kind": "ENUM", "name": "Kind", "ofType": null}, "isDeprecated": false}
                        ],
                        "interfaces": []
                    },
                    {
                        "kind": "ENUM",
                        "name": "Kind",
                        "enumValues": [
                            {"name": "FIRE", "isDeprecated": false},
                            {"name": "WATER", "isDeprecated": false}
                        ]
                    },
                    {"kind": "SCALAR", "name": "String"},
                    {"kind": "OBJECT", "name": "__Schema", "fields": [], "interfaces": []}
                ],
                "directives": [
                    {"name": "skip", "locations": ["FIELD"], "args": []}
                ]
            }
        });
        ClientSchema::from_introspection(&IntrospectionResult::new(raw)).unwrap()
    }

    #[test]
    fn prints_types_fields_and_enums() {
        let sdl = schema("Query").to_sdl();
        let expected = r#""Entry point"
type Query {
  pokemon(name: String = "pikachu"): Pokemon
  legacy: String @deprecated(reason: "use pokemon")
}

type Pokemon {
  kind: Kind
}

enum Kind {
  FIRE
  WATER
}
"#;
        assert_eq!(sdl, expected);
    }

    #[test]
    fn prints_schema_block_for_unconventional_roots() {
        let sdl = schema("Root").to_sdl();
        assert!(sdl.starts_with("schema {\n  query: Root\n}\n\n"));
    }
}
