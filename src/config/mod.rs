use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        errors::{CrmError, Result},
        utils::{ensure_dir, write_atomic, PathResolver},
    },
    locale::LocaleConfig,
};

pub const DEFAULT_STORE_NAME: &str = "default";
pub const DEFAULT_BACKUP_RETENTION: usize = 5;

/// User preferences persisted as `config.json` under the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub store_name: String,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "EUR".into(),
            store_name: DEFAULT_STORE_NAME.into(),
            backup_retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

impl Config {
    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::from_tag(&self.locale)
    }

    /// Sets one preference from its textual key, as typed in the shell.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "locale" => {
                if value.is_empty() {
                    return Err(CrmError::ConfigError("locale cannot be empty".into()));
                }
                self.locale = value.to_string();
            }
            "currency" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(CrmError::ConfigError(format!(
                        "currency must be a three-letter code, got `{value}`"
                    )));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "store_name" => {
                if value.is_empty() {
                    return Err(CrmError::ConfigError("store name cannot be empty".into()));
                }
                self.store_name = value.to_string();
            }
            "backup_retention" => {
                let retention: usize = value.parse().map_err(|_| {
                    CrmError::ConfigError(format!("`{value}` is not a valid retention count"))
                })?;
                if retention == 0 {
                    return Err(CrmError::ConfigError(
                        "backup retention must keep at least one backup".into(),
                    ));
                }
                self.backup_retention = retention;
            }
            other => {
                return Err(CrmError::ConfigError(format!(
                    "unknown setting `{other}` (expected locale, currency, store_name or backup_retention)"
                )))
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("store_name", self.store_name.clone()),
            ("backup_retention", self.backup_retention.to_string()),
        ]
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Reads the config file, falling back to defaults when it does not exist yet.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| {
                CrmError::ConfigError(format!("{}: {}", self.path.display(), err))
            })
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
        assert!(!manager.path().exists());
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("locale", "it-IT").unwrap();
        config.set("currency", "chf").unwrap();
        config.set("backup_retention", "2").unwrap();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "CHF");
        assert_eq!(loaded.backup_retention, 2);
        assert_eq!(loaded.locale_config().decimal_separator, ',');
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "currency": "USD" }"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "USD");
        assert_eq!(loaded.store_name, DEFAULT_STORE_NAME);
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "not json").unwrap();
        assert!(matches!(manager.load(), Err(CrmError::ConfigError(_))));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut config = Config::default();
        assert!(config.set("currency", "euro").is_err());
        assert!(config.set("backup_retention", "0").is_err());
        assert!(config.set("theme", "dark").is_err());
        assert_eq!(config, Config::default());
    }
}
