//! Configuration for user registration

use crate::registration::error::RegistrationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Web API key of the identity provider project.
    pub api_key: String,
    pub project_id: String,
    pub identity_endpoint: String,
    pub firestore_endpoint: String,
    pub users_collection: String,
    /// Delete the new account when its profile cannot be written.
    pub compensate_orphaned_credentials: bool,
    pub listen_addr: String,
}

impl RegistrationConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Point both REST clients at a local emulator or test server.
    pub fn with_endpoints(
        mut self,
        identity_endpoint: impl Into<String>,
        firestore_endpoint: impl Into<String>,
    ) -> Self {
        self.identity_endpoint = identity_endpoint.into();
        self.firestore_endpoint = firestore_endpoint.into();
        self
    }

    pub fn with_compensation(mut self, enabled: bool) -> Self {
        self.compensate_orphaned_credentials = enabled;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RegistrationError> {
        toml::from_str(text).map_err(|e| RegistrationError::ConfigError(format!("Invalid config: {}", e)))
    }

    /// Reads `path` if it exists; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistrationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            RegistrationError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.api_key.trim().is_empty() {
            return Err(RegistrationError::ConfigError("api_key must be set".to_string()));
        }
        if self.project_id.trim().is_empty() {
            return Err(RegistrationError::ConfigError("project_id must be set".to_string()));
        }
        if self.users_collection.trim().is_empty() || self.users_collection.contains('/') {
            return Err(RegistrationError::ConfigError(format!(
                "users_collection '{}' is not a valid collection name",
                self.users_collection
            )));
        }
        Ok(())
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            users_collection: "users".to_string(),
            compensate_orphaned_credentials: false,
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = RegistrationConfig::from_toml_str(
            r#"
            api_key = "key"
            project_id = "demo"
            compensate_orphaned_credentials = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.users_collection, "users");
        assert_eq!(config.identity_endpoint, DEFAULT_IDENTITY_ENDPOINT);
        assert!(config.compensate_orphaned_credentials);
        config.validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = RegistrationConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config, RegistrationConfig::default());
    }

    #[test]
    fn rejects_incomplete_config() {
        assert!(RegistrationConfig::default().validate().is_err());

        let mut config = RegistrationConfig::new("key", "demo");
        config.users_collection = "users/extra".to_string();
        assert!(matches!(config.validate(), Err(RegistrationError::ConfigError(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = RegistrationConfig::from_toml_str("api_key = [").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Invalid config"));
    }
}
