//! Configuration management for abroad.
//!
//! Configuration is loaded with figment from defaults, an optional TOML file
//! and `ABROAD_`-prefixed environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "abroad";

/// Default file name for exported snapshots and the on-disk database.
pub const DEFAULT_SNAPSHOT_NAME: &str = "abroad_experiences.sqlite";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ABROAD_`)
/// 2. TOML config file at `~/.config/abroad/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage and import/export configuration.
    pub storage: StorageConfig,
    /// Form submission behaviour.
    pub form: FormConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/abroad/abroad_experiences.sqlite`
    pub database_path: Option<PathBuf>,
    /// Keep the database in memory only; nothing survives the process.
    pub in_memory: bool,
    /// File extensions (without the dot) that are imported as binary snapshots.
    /// Every other file is executed as an SQL script.
    pub snapshot_extensions: Vec<String>,
    /// File name used for exported snapshots.
    pub export_file_name: String,
}

/// Form-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Delay before switching to the browse view after a successful save.
    pub redirect_delay_ms: u64,
    /// How long the success message stays visible.
    pub status_display_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            in_memory: false,
            snapshot_extensions: vec!["sqlite".to_string()],
            export_file_name: DEFAULT_SNAPSHOT_NAME.to_string(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: 1500,
            status_display_ms: 3000,
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("ABROAD_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.export_file_name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "export_file_name must not be empty".to_string(),
            });
        }

        if self.storage.snapshot_extensions.is_empty() {
            return Err(Error::ConfigValidation {
                message: "snapshot_extensions must list at least one extension".to_string(),
            });
        }

        for ext in &self.storage.snapshot_extensions {
            if ext.is_empty() || ext.contains('.') {
                return Err(Error::ConfigValidation {
                    message: format!("invalid snapshot extension '{ext}' (give it without the dot)"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DEFAULT_SNAPSHOT_NAME))
    }

    /// Check whether a file should be imported as a binary snapshot.
    ///
    /// The decision is made on the extension alone, case-insensitively.
    #[must_use]
    pub fn is_snapshot_file(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.storage
            .snapshot_extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
    }

    /// Get the redirect delay as a Duration.
    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.form.redirect_delay_ms)
    }

    /// Get the status message display time as a Duration.
    #[must_use]
    pub fn status_display(&self) -> Duration {
        Duration::from_millis(self.form.status_display_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert!(!storage.in_memory);
        assert_eq!(storage.snapshot_extensions, vec!["sqlite".to_string()]);
        assert_eq!(storage.export_file_name, "abroad_experiences.sqlite");
    }

    #[test]
    fn test_default_form_config() {
        let form = FormConfig::default();

        assert_eq!(form.redirect_delay_ms, 1500);
        assert_eq!(form.status_display_ms, 3000);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_export_name() {
        let mut config = Config::default();
        config.storage.export_file_name = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("export_file_name"));
    }

    #[test]
    fn test_validate_no_extensions() {
        let mut config = Config::default();
        config.storage.snapshot_extensions.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("snapshot_extensions"));
    }

    #[test]
    fn test_validate_dotted_extension() {
        let mut config = Config::default();
        config.storage.snapshot_extensions = vec![".db".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(".db"));
    }

    #[test]
    fn test_is_snapshot_file() {
        let mut config = Config::default();
        assert!(config.is_snapshot_file("export.sqlite"));
        assert!(config.is_snapshot_file("EXPORT.SQLITE"));
        assert!(!config.is_snapshot_file("dump.sql"));
        assert!(!config.is_snapshot_file("sqlite"));

        config.storage.snapshot_extensions.push("db".to_string());
        assert!(config.is_snapshot_file("legacy.db"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("abroad_experiences.sqlite"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/srv/abroad/data.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/srv/abroad/data.sqlite")
        );
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.redirect_delay(), Duration::from_millis(1500));
        assert_eq!(config.status_display(), Duration::from_secs(3));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("abroad"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"in_memory": true, "snapshot_extensions": ["sqlite", "db"]}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert!(storage.in_memory);
        assert_eq!(storage.snapshot_extensions.len(), 2);
        assert_eq!(storage.export_file_name, DEFAULT_SNAPSHOT_NAME);
    }
}
