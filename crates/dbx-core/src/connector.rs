//! Connector descriptor and base trait.

use serde::{Deserialize, Serialize};

/// Static metadata the host uses to list and wire up a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    /// Stable key, also used in credential state paths.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Editor syntax mode for the query pane.
    pub syntax: String,
    /// Connector version.
    pub version: String,
}

impl ConnectorDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        syntax: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            syntax: syntax.into(),
            version: version.into(),
        }
    }
}

/// Implemented by every connector plugin.
pub trait DbConnector {
    /// Connector metadata.
    fn descriptor(&self) -> ConnectorDescriptor;
}
