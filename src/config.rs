use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_api_key(key: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.api_key = Some(key.to_string());
        config.save()
    }

    /// Environment variable first, config file second.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;

        Ok(config_dir.join("prdgen").join("config.json"))
    }

    /// Best-effort path for error messages.
    pub fn display_path() -> PathBuf {
        Self::config_path().unwrap_or_else(|_| PathBuf::from("prdgen/config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.json")).expect("load");
        assert!(config.api_key.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_key: Some("k-123".to_string()),
            model: Some("gemini-test".to_string()),
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_key.as_deref(), Some("k-123"));
        assert_eq!(loaded.model.as_deref(), Some("gemini-test"));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");

        assert!(Config::load_from(&path).is_err());
    }

    // Single test covering both resolution orders: parallel tests must not
    // race on the process environment.
    #[test]
    fn test_api_key_resolution_order() {
        std::env::remove_var(API_KEY_ENV);

        let config = Config {
            api_key: Some("from-file".to_string()),
            model: None,
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-file"));

        std::env::set_var(API_KEY_ENV, "from-env");
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-env"));

        // Empty env value is ignored, not treated as a credential.
        std::env::set_var(API_KEY_ENV, "");
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-file"));

        std::env::remove_var(API_KEY_ENV);
        let empty = Config::new();
        assert_eq!(empty.resolve_api_key(), None);
    }
}
