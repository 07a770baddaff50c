//! View models for the credential form, the query editor and the docs pane.
//!
//! Everything here is a pure function of state and serializes to the JSON
//! the rendering side consumes.

use std::sync::Arc;

use dbx_core::ConnectionStatus;
use dbx_graphql::{ClientSchema, FieldDef, FieldType, InputValueDef, NamedType, TypeKind};
use serde::Serialize;

use crate::credentials::CredentialField;
use crate::state::AppState;

/// Link text of the sample endpoint shortcut.
pub const SAMPLE_LABEL: &str = "Pokemon Example";

// ─────────────────────────────────────────────────────────────────────────────
// Credential form
// ─────────────────────────────────────────────────────────────────────────────

/// HTML input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Plain text.
    Text,
    /// Masked input.
    Password,
}

/// One editable credential field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// Credential this input writes.
    pub field: CredentialField,
    /// Icon name shown in the input.
    pub icon: &'static str,
    /// Placeholder text.
    pub placeholder: &'static str,
    /// Plain or masked.
    pub input_type: InputType,
    /// Current value.
    pub value: String,
    /// Locked while connecting or connected.
    pub disabled: bool,
}

/// The form's primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    /// Connect with the entered credentials.
    Connect {
        /// Set while a connect is in flight.
        disabled: bool,
    },
    /// Drop the active connection.
    Disconnect,
}

/// Shortcut that fills in a public demo endpoint and connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleLink {
    /// Link text.
    pub label: &'static str,
    /// Endpoint connected to on click.
    pub endpoint: String,
}

/// Credential form view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialForm {
    /// Connection status the form was built for.
    pub status: ConnectionStatus,
    /// Endpoint then token.
    pub fields: Vec<FormField>,
    /// Primary button.
    pub action: FormAction,
    /// Present only while not connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleLink>,
}

/// Build the credential form for the current state.
///
/// Inputs lock while connecting or connected. The sample link is offered only
/// while not connected.
#[must_use]
pub fn credential_form(state: &AppState, sample_endpoint: &str) -> CredentialForm {
    let status = state.status();
    let disabled = status.locks_credentials();
    let credentials = state.credentials();

    let fields = vec![
        FormField {
            field: CredentialField::Endpoint,
            icon: "globe",
            placeholder: "endpoint address",
            input_type: InputType::Text,
            value: credentials.endpoint().to_string(),
            disabled,
        },
        FormField {
            field: CredentialField::Token,
            icon: "lock",
            placeholder: "authorization token (optional)",
            input_type: InputType::Password,
            value: credentials.token().unwrap_or_default().to_string(),
            disabled,
        },
    ];

    let action = if status.is_connected() {
        FormAction::Disconnect
    } else {
        FormAction::Connect {
            disabled: !status.can_connect(),
        }
    };

    let sample = (!status.is_connected()).then(|| SampleLink {
        label: SAMPLE_LABEL,
        endpoint: sample_endpoint.to_string(),
    });

    CredentialForm {
        status,
        fields,
        action,
        sample,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor options
// ─────────────────────────────────────────────────────────────────────────────

/// Autocomplete settings.
#[derive(Debug, Clone, Serialize)]
pub struct HintOptions {
    /// Hint provider name.
    pub hint: &'static str,
    /// Schema to complete against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Arc<ClientSchema>>,
}

/// Query editor configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    /// Syntax mode.
    pub mode: &'static str,
    /// Autocomplete settings.
    pub hint_options: HintOptions,
    /// Schema to lint against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint: Option<Arc<ClientSchema>>,
}

/// Editor configuration for `schema`, or without schema support when absent.
#[must_use]
pub fn editor_options(schema: Option<Arc<ClientSchema>>) -> EditorOptions {
    EditorOptions {
        mode: "graphql",
        hint_options: HintOptions {
            hint: "graphql",
            schema: schema.clone(),
        },
        lint: schema,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Docs
// ─────────────────────────────────────────────────────────────────────────────

/// In-document link target for a named type.
#[must_use]
pub fn reference(name: &str) -> String {
    format!("#{name}")
}

/// Render schema documentation as Markdown, one anchored section per type.
#[must_use]
pub fn docs(schema: Option<&ClientSchema>) -> Option<String> {
    let schema = schema?;
    let mut out = String::from("# Schema\n");

    if let Some(description) = schema.description() {
        out.push_str(&format!("\n{description}\n"));
    }

    let roots = [
        ("query", schema.query_type()),
        ("mutation", schema.mutation_type()),
        ("subscription", schema.subscription_type()),
    ];
    let roots: Vec<String> = roots
        .iter()
        .filter_map(|(operation, root)| {
            root.map(|named| format!("- {operation}: {}", type_link(&named.name)))
        })
        .collect();
    if !roots.is_empty() {
        out.push_str(&format!("\n{}\n", roots.join("\n")));
    }

    for named in schema.types().iter().filter(|ty| !ty.is_introspection_type()) {
        out.push('\n');
        out.push_str(&type_section(named));
    }
    Some(out)
}

fn type_section(named: &NamedType) -> String {
    let mut out = format!(
        "<a id=\"{}\"></a>\n\n## {}\n\n*{}*\n",
        named.name,
        named.name,
        named.kind.as_str()
    );
    if let Some(description) = &named.description {
        if !description.is_empty() {
            out.push_str(&format!("\n{description}\n"));
        }
    }

    if !named.interfaces.is_empty() {
        let links: Vec<String> = named.interfaces.iter().map(|name| type_link(name)).collect();
        out.push_str(&format!("\nImplements: {}\n", links.join(", ")));
    }

    match named.kind {
        TypeKind::Object | TypeKind::Interface if !named.fields.is_empty() => {
            out.push_str("\n### Fields\n\n");
            for field in &named.fields {
                out.push_str(&field_line(field));
            }
        }
        TypeKind::InputObject if !named.input_fields.is_empty() => {
            out.push_str("\n### Input fields\n\n");
            for input in &named.input_fields {
                out.push_str(&input_line(input, ""));
            }
        }
        TypeKind::Enum if !named.enum_values.is_empty() => {
            out.push_str("\n### Values\n\n");
            for value in &named.enum_values {
                out.push_str(&format!("- `{}`", value.name));
                out.push_str(&deprecation_note(
                    value.is_deprecated,
                    value.deprecation_reason.as_deref(),
                ));
                out.push_str(&description_suffix(value.description.as_deref()));
                out.push('\n');
            }
        }
        TypeKind::Union if !named.possible_types.is_empty() => {
            let links: Vec<String> = named.possible_types.iter().map(|name| type_link(name)).collect();
            out.push_str(&format!("\nPossible types: {}\n", links.join(" | ")));
        }
        _ => {}
    }
    out
}

fn field_line(field: &FieldDef) -> String {
    let mut line = format!("- `{}`: {}", field.name, type_ref(&field.ty));
    line.push_str(&deprecation_note(
        field.is_deprecated,
        field.deprecation_reason.as_deref(),
    ));
    line.push_str(&description_suffix(field.description.as_deref()));
    line.push('\n');
    for arg in &field.args {
        line.push_str(&input_line(arg, "  "));
    }
    line
}

fn input_line(input: &InputValueDef, indent: &str) -> String {
    let mut line = format!("{indent}- `{}`: {}", input.name, type_ref(&input.ty));
    if let Some(default) = &input.default_value {
        line.push_str(&format!(" = `{default}`"));
    }
    line.push_str(&description_suffix(input.description.as_deref()));
    line.push('\n');
    line
}

fn type_link(name: &str) -> String {
    format!("[{name}]({})", reference(name))
}

fn type_ref(ty: &FieldType) -> String {
    match ty {
        FieldType::Named(name) => type_link(name),
        FieldType::List(inner) => format!("\\[{}\\]", type_ref(inner)),
        FieldType::NonNull(inner) => format!("{}!", type_ref(inner)),
    }
}

fn deprecation_note(is_deprecated: bool, reason: Option<&str>) -> String {
    match (is_deprecated, reason) {
        (false, _) => String::new(),
        (true, Some(reason)) => format!(" *(deprecated: {reason})*"),
        (true, None) => " *(deprecated)*".to_string(),
    }
}

fn description_suffix(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.is_empty() => format!(" - {text}"),
        _ => String::new(),
    }
}
