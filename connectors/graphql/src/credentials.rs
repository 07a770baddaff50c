//! Endpoint credentials.

use std::fmt;
use std::str::FromStr;

use dbx_core::DbxError;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Endpoint URL and optional bearer token.
///
/// The token is erased from memory on drop and never shown by `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    #[zeroize(skip)]
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    token: Option<String>,
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
        }
    }

    /// Endpoint URL as entered; not validated.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Stored token, possibly empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Token to send as a bearer credential; `None` when absent or empty.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.token().filter(|token| !token.is_empty())
    }

    /// Replace the endpoint.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    /// Replace the token, erasing the previous one.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token.zeroize();
        self.token = token;
    }

    /// Write one field.
    pub fn set(&mut self, field: CredentialField, value: impl Into<String>) {
        match field {
            CredentialField::Endpoint => self.set_endpoint(value),
            CredentialField::Token => self.set_token(Some(value.into())),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// A credential form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    /// Endpoint URL.
    Endpoint,
    /// Bearer token.
    Token,
}

impl CredentialField {
    /// Field name as used in state paths.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Endpoint => "endpoint",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialField {
    type Err = DbxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endpoint" => Ok(Self::Endpoint),
            "token" => Ok(Self::Token),
            other => Err(DbxError::invalid_request(format!(
                "Unknown credential field: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let credentials = Credentials::new("https://example.com/graphql", Some("s3cr3t".into()));
        let debug = format!("{credentials:?}");
        assert!(debug.contains("https://example.com/graphql"));
        assert!(debug.contains("[redacted]"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn empty_token_is_not_a_bearer_token() {
        let mut credentials = Credentials::default();
        assert_eq!(credentials.bearer_token(), None);
        credentials.set(CredentialField::Token, "");
        assert_eq!(credentials.token(), Some(""));
        assert_eq!(credentials.bearer_token(), None);
        credentials.set(CredentialField::Token, "abc");
        assert_eq!(credentials.bearer_token(), Some("abc"));
    }

    #[test]
    fn accepts_any_endpoint_text() {
        let mut credentials = Credentials::default();
        credentials.set(CredentialField::Endpoint, "not a url");
        assert_eq!(credentials.endpoint(), "not a url");
    }

    #[test]
    fn parses_field_names() {
        assert_eq!(
            "endpoint".parse::<CredentialField>().unwrap(),
            CredentialField::Endpoint
        );
        assert_eq!("token".parse::<CredentialField>().unwrap(), CredentialField::Token);
        assert!(matches!(
            "password".parse::<CredentialField>(),
            Err(DbxError::InvalidRequest { .. })
        ));
    }
}
