//! Dotted state-path names.
//!
//! The host addresses connector state with dotted paths such as
//! `connect.status` or `config.credentials.graphql.endpoint`. Connectors keep
//! their state in typed structs; these names are the contract between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DbxError;

/// A named location in connector state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatePath {
    /// `connect.status`
    ConnectStatus,
    /// `connect._db`: the live client handle.
    ConnectDb,
    /// `connect.<slot>`: connector-specific session data.
    ConnectSlot(String),
    /// `config.credentials.<connector>.<field>`
    Credential {
        /// Connector key.
        connector: String,
        /// Credential field name.
        field: String,
    },
}

impl StatePath {
    /// Build a credential path.
    #[must_use]
    pub fn credential(connector: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Credential {
            connector: connector.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectStatus => write!(f, "connect.status"),
            Self::ConnectDb => write!(f, "connect._db"),
            Self::ConnectSlot(slot) => write!(f, "connect.{slot}"),
            Self::Credential { connector, field } => {
                write!(f, "config.credentials.{connector}.{field}")
            }
        }
    }
}

impl FromStr for StatePath {
    type Err = DbxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(DbxError::invalid_request(format!("Invalid state path: {s}")));
        }
        match segments.as_slice() {
            ["connect", "status"] => Ok(Self::ConnectStatus),
            ["connect", "_db"] => Ok(Self::ConnectDb),
            ["connect", slot] => Ok(Self::ConnectSlot((*slot).to_string())),
            ["config", "credentials", connector, field] => Ok(Self::credential(*connector, *field)),
            _ => Err(DbxError::invalid_request(format!("Unknown state path: {s}"))),
        }
    }
}

impl Serialize for StatePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(
            "connect.status".parse::<StatePath>().unwrap(),
            StatePath::ConnectStatus
        );
        assert_eq!(
            "connect._db".parse::<StatePath>().unwrap(),
            StatePath::ConnectDb
        );
        assert_eq!(
            "connect.graphqlschema".parse::<StatePath>().unwrap(),
            StatePath::ConnectSlot("graphqlschema".into())
        );
        assert_eq!(
            "config.credentials.graphql.token"
                .parse::<StatePath>()
                .unwrap(),
            StatePath::credential("graphql", "token")
        );
    }

    #[test]
    fn display_round_trips() {
        let path = StatePath::credential("graphql", "endpoint");
        assert_eq!(path.to_string(), "config.credentials.graphql.endpoint");
        assert_eq!(path.to_string().parse::<StatePath>().unwrap(), path);
    }

    #[test]
    fn rejects_unknown_and_empty_segments() {
        assert!("config.theme".parse::<StatePath>().is_err());
        assert!("connect..status".parse::<StatePath>().is_err());
        assert!("".parse::<StatePath>().is_err());
    }

    #[test]
    fn deserializes_from_string() {
        let path: StatePath = serde_json::from_value(serde_json::json!("connect.status")).unwrap();
        assert_eq!(path, StatePath::ConnectStatus);
    }
}
