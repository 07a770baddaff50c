//! GraphQL connector configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dbx_core::DbxError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::Credentials;

/// Environment variable overriding `credentials.endpoint`.
pub const ENDPOINT_ENV: &str = "DBX_GRAPHQL_ENDPOINT";
/// Environment variable overriding `credentials.token`.
pub const TOKEN_ENV: &str = "DBX_GRAPHQL_TOKEN";

/// Public demo endpoint offered as a one-click sample.
pub const SAMPLE_ENDPOINT: &str = "https://graphql-pokemon.now.sh/";

/// Configuration for the GraphQL connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlConnectorConfig {
    /// Initial credentials.
    #[serde(default)]
    pub credentials: Credentials,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Service name used in client log fields (default: graphql)
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Endpoint used by the sample shortcut.
    #[serde(default = "default_sample_endpoint")]
    pub sample_endpoint: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_service_name() -> String {
    "graphql".into()
}

fn default_sample_endpoint() -> String {
    SAMPLE_ENDPOINT.into()
}

impl Default for GraphqlConnectorConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            timeout_secs: default_timeout_secs(),
            service_name: default_service_name(),
            sample_endpoint: default_sample_endpoint(),
        }
    }
}

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this config.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for DbxError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl GraphqlConnectorConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.credentials.set_endpoint(endpoint);
        }
        if let Some(token) = lookup(TOKEN_ENV) {
            self.credentials.set_token(Some(token));
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GraphqlConnectorConfig::from_toml_str("").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.service_name, "graphql");
        assert_eq!(config.sample_endpoint, SAMPLE_ENDPOINT);
        assert_eq!(config.credentials.endpoint(), "");
        assert_eq!(config.credentials.token(), None);
    }

    #[test]
    fn loads_credentials_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
timeout_secs = 5

[credentials]
endpoint = "https://api.example.com/graphql"
token = "abc"
"#
        )
        .unwrap();

        let config = GraphqlConnectorConfig::load(file.path()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.credentials.endpoint(), "https://api.example.com/graphql");
        assert_eq!(config.credentials.bearer_token(), Some("abc"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphqlConnectorConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(DbxError::from(err).code(), "DBX-1002");
    }

    #[test]
    fn rejects_zero_timeout_and_bad_toml() {
        assert!(matches!(
            GraphqlConnectorConfig::from_toml_str("timeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GraphqlConnectorConfig::from_toml_str("timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = GraphqlConnectorConfig::from_toml_str(
            "[credentials]\nendpoint = \"https://file.example\"\ntoken = \"file\"",
        )
        .unwrap();
        let vars: HashMap<&str, &str> = HashMap::from([(ENDPOINT_ENV, "https://env.example")]);

        config.apply_overrides(|name| vars.get(name).map(|value| (*value).to_string()));

        assert_eq!(config.credentials.endpoint(), "https://env.example");
        assert_eq!(config.credentials.token(), Some("file"));
    }
}
