//! Configuration file handling for spendscope.
//!
//! The configuration file is stored at `$SPENDSCOPE_HOME/config.json` and holds the polling and
//! debounce timings along with the location of the store file.

use crate::store::{
    StoreOptions, DEFAULT_DEBOUNCE, DEFAULT_POLL_INTERVAL, DEFAULT_RANGE_WRITE_DEBOUNCE,
};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "spendscope";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORE_JSON: &str = "store.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SPENDSCOPE_HOME` and from there it loads `$SPENDSCOPE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and writes an initial `config.json` with default settings. An
    /// existing configuration is left as it is and loaded instead.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the spendscope home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            return Self::load(root).await;
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Validates that the home directory and its config file exist, then loads the config file.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The spendscope home directory is missing '{}', run init first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The file the local backend persists to. Relative paths are resolved against the home
    /// directory.
    pub fn store_path(&self) -> PathBuf {
        let p = self.config_file.store_file();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config_file.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config_file.debounce_ms)
    }

    pub fn range_write_debounce(&self) -> Duration {
        Duration::from_millis(self.config_file.range_write_debounce_ms)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            poll_interval: self.poll_interval(),
            debounce: self.debounce(),
            range_write_debounce: self.range_write_debounce(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_range_write_debounce_ms() -> u64 {
    DEFAULT_RANGE_WRITE_DEBOUNCE.as_millis() as u64
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spendscope",
///   "config_version": 1,
///   "poll_interval_ms": 2000,
///   "debounce_ms": 500,
///   "range_write_debounce_ms": 300,
///   "store_file": "store.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spendscope"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// How often backend values are polled
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Idle window of debounced readers
    #[serde(default = "default_debounce_ms")]
    debounce_ms: u64,

    /// How long brush range changes settle before they are saved
    #[serde(default = "default_range_write_debounce_ms")]
    range_write_debounce_ms: u64,

    /// Path to the store file (optional, relative to config.json or absolute)
    /// Defaults to $SPENDSCOPE_HOME/store.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    store_file: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
            range_write_debounce_ms: default_range_write_debounce_ms(),
            store_file: Some(PathBuf::from(STORE_JSON)),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it holds invalid settings
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.poll_interval_ms > 0,
            "Invalid poll_interval_ms in config file: must be greater than zero"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the store file path. If None, defaults to `store.json`.
    pub fn store_file(&self) -> PathBuf {
        self.store_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(STORE_JSON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("spendscope_home");

        let config = Config::create(&home_dir).await.unwrap();

        assert!(config.config_path().is_file());
        assert_eq!(config.store_path(), config.root().join("store.json"));
        assert_eq!(config.store_options(), StoreOptions::default());

        // A second create keeps the existing file.
        let again = Config::create(&home_dir).await.unwrap();
        assert_eq!(again.config_file, config.config_file);
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("run init first"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "spendscope", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();

        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.range_write_debounce_ms, 300);
        assert_eq!(config.store_file(), PathBuf::from(STORE_JSON));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "wrong_app", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_zero_poll_interval() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "spendscope", "config_version": 1, "poll_interval_ms": 0 }"#;
        utils::write(&config_path, json).await.unwrap();

        assert!(ConfigFile::load(&config_path).await.is_err());
    }

    #[tokio::test]
    async fn test_absolute_store_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("home");
        let elsewhere = temp_dir.path().join("elsewhere.json");
        let config = Config::create(&root).await.unwrap();
        let file = ConfigFile {
            store_file: Some(elsewhere.clone()),
            debounce_ms: 50,
            ..ConfigFile::default()
        };
        file.save(config.config_path()).await.unwrap();

        let loaded = Config::load(&root).await.unwrap();
        assert_eq!(loaded.store_path(), elsewhere);
        assert_eq!(loaded.debounce(), Duration::from_millis(50));
    }
}
