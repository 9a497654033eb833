use std::path::Path;

use super::types::EnvironmentConfig;
use crate::error::ConfigError;

/// Load environment configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EnvironmentConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<EnvironmentConfig, ConfigError> {
    let config: EnvironmentConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

impl EnvironmentConfig {
    pub fn session(&self, name: &str) -> Option<&super::types::SessionConfig> {
        self.sessions.get(name)
    }

    /// Checks that need no exchange or environment access
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, session) in &self.sessions {
            session.margin_mode(name)?;
            if session.key.is_some() != session.secret.is_some() {
                return Err(ConfigError::IncompleteCredentials(name.clone()));
            }
        }
        Ok(())
    }
}
