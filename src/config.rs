use crate::error::SsmError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Pool size used when nothing else is configured; one worker per
/// connection the delegate may hold open.
pub const DEFAULT_MAX_CONNECTIONS: usize = crate::executor::DEFAULT_THREAD_POOL_SIZE;

const CONFIG_DIR: &str = "ssm-async";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub max_connections: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ClientConfig {
    /// Defaults, then the config file, then `SSM_ASYNC_*` environment
    /// variables. An explicit `path` must exist; the default location is
    /// skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, SsmError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// `$CONFIG_DIR/ssm-async/config.json`, where the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> Result<Self, SsmError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SsmError::Config(format!("config file not found: {}", path.display()))
            } else {
                SsmError::Io(e)
            }
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SsmError::Config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Overlays values from `lookup`, which maps variable names to values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SsmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(region) = non_empty("SSM_ASYNC_REGION") {
            self.region = Some(region);
        }
        if let Some(profile) = non_empty("SSM_ASYNC_PROFILE") {
            self.profile = Some(profile);
        }
        if let Some(endpoint) = non_empty("SSM_ASYNC_ENDPOINT_URL") {
            self.endpoint_url = Some(endpoint);
        }
        if let Some(max) = non_empty("SSM_ASYNC_MAX_CONNECTIONS") {
            self.max_connections = max.trim().parse().map_err(|_| {
                SsmError::Config(format!(
                    "SSM_ASYNC_MAX_CONNECTIONS must be a positive integer, got '{}'",
                    max
                ))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), SsmError> {
        if self.max_connections == 0 {
            return Err(SsmError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if let Some(endpoint) = &self.endpoint_url
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(SsmError::Config(format!(
                "endpoint_url must start with http:// or https://, got '{}'",
                endpoint
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.max_connections,
            crate::executor::DEFAULT_THREAD_POOL_SIZE
        );
        assert!(config.region.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_missing_fields_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "region": "eu-west-1" }"#).unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_from_file_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "regoin": "eu-west-1" }"#).unwrap();

        let result = ClientConfig::from_file(&path);
        assert!(matches!(result, Err(SsmError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = ClientConfig::load(Some(dir.path().join("absent.json").as_path()));
        assert!(matches!(result, Err(SsmError::Config(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("SSM_ASYNC_REGION", "us-east-2"),
            ("SSM_ASYNC_MAX_CONNECTIONS", " 4 "),
            ("SSM_ASYNC_PROFILE", ""),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig {
            region: Some("eu-west-1".to_string()),
            profile: Some("dev".to_string()),
            ..ClientConfig::default()
        };
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.region.as_deref(), Some("us-east-2"));
        assert_eq!(config.profile.as_deref(), Some("dev"));
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn test_invalid_env_pool_size() {
        let mut config = ClientConfig::default();
        let result = config.apply_env(|key| {
            (key == "SSM_ASYNC_MAX_CONNECTIONS").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(SsmError::Config(_))));
    }

    #[test]
    fn test_validate() {
        let zero = ClientConfig {
            max_connections: 0,
            ..ClientConfig::default()
        };
        assert!(zero.validate().is_err());

        let bad_endpoint = ClientConfig {
            endpoint_url: Some("localhost:4566".to_string()),
            ..ClientConfig::default()
        };
        assert!(bad_endpoint.validate().is_err());

        let local = ClientConfig {
            endpoint_url: Some("http://localhost:4566".to_string()),
            ..ClientConfig::default()
        };
        assert!(local.validate().is_ok());
    }
}
