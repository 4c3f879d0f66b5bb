//! Configuration file handling for updash.
//!
//! The configuration file is stored at `$UPDASH_HOME/config.json` and contains settings for
//! the updash application including the default transaction window, cache TTL and API retry
//! behavior.

use crate::api::{ClientOptions, RetryPolicy};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "updash";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const STORE_JSON: &str = "store.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$UPDASH_HOME` and from there it loads `$UPDASH_HOME/config.json`. It provides
/// paths to the other items expected in certain locations within the updash home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    store_path: PathBuf,
    token_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `.secrets` subdirectory and an initial `config.json`
    /// with default settings. Fails if a config file already exists there.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/updash`
    ///
    /// # Errors
    /// - Returns an error if the directory is already initialized or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the updash home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        // Create the secrets subdirectory
        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;

        // Create and save an initial ConfigFile
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        // Return a new `Config` object that represents a home directory that is ready to use
        Ok(Self {
            store_path: root.join(STORE_JSON),
            token_path: secrets_dir.join(TOKEN_JSON),
            secrets: secrets_dir,
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the `updash_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the secrets directory exists
    /// - return the loaded configuration object
    pub async fn load(updash_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = updash_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Updash home is missing, run 'updash init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            secrets: root.join(SECRETS),
            store_path: root.join(STORE_JSON),
            token_path: root.join(SECRETS).join(TOKEN_JSON),
            root,
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}', run 'updash init' first",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// The default number of transactions commands fetch when `--count` is not given.
    pub fn transaction_count(&self) -> usize {
        self.config_file.transaction_count as usize
    }

    /// API client knobs derived from the config file.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            cache_ttl: Duration::from_secs(self.config_file.cache_ttl_secs),
            timeout: Duration::from_secs(self.config_file.api_timeout_secs),
            retry: RetryPolicy {
                attempts: self.config_file.retry_attempts,
                ..RetryPolicy::default()
            },
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "updash",
///   "config_version": 1,
///   "transaction_count": 200,
///   "cache_ttl_secs": 120,
///   "api_timeout_secs": 30,
///   "retry_attempts": 3
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "updash"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// How many transactions to fetch when no `--count` is given
    #[serde(default = "default_transaction_count")]
    transaction_count: u32,

    /// How long fetched responses stay fresh
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,

    /// Per-request API timeout
    #[serde(default = "default_api_timeout_secs")]
    api_timeout_secs: u64,

    /// Total attempts for transient API failures
    #[serde(default = "default_retry_attempts")]
    retry_attempts: u32,
}

fn default_transaction_count() -> u32 {
    200
}

fn default_cache_ttl_secs() -> u64 {
    120
}

fn default_api_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            transaction_count: default_transaction_count(),
            cache_ttl_secs: default_cache_ttl_secs(),
            api_timeout_secs: default_api_timeout_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a setting is out of range.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.transaction_count > 0,
            "transaction_count must be at least 1"
        );
        anyhow::ensure!(config.retry_attempts > 0, "retry_attempts must be at least 1");
        anyhow::ensure!(
            config.api_timeout_secs > 0,
            "api_timeout_secs must be at least 1"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
