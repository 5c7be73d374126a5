//! CLI configuration file handling
//!
//! The configuration lives at `~/.local/share/storyproof/config.toml` next to
//! the SQLite store and is written with comments on first run. Contract
//! addresses are not read from here: they come from the environment (see
//! [`storyproof::config::ServiceConfig::from_env`]) so a config file copied
//! between machines never points a client at the wrong deployment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryproofConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database holding histories, claims and local blobs
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Switch wallets to the Story testnet instead of mainnet
    #[serde(default)]
    pub use_testnet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl StoryproofConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            storage: StorageConfig { db_path },
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: StoryproofConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Load `path`, writing the commented default there first if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            let db_path = path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("storyproof.db");
            Self::create_default(path, &db_path)?;
        }
        Self::load(path)
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(db_path: &Path) -> String {
        format!(
            r#"# StoryProof Configuration
#
# Contract addresses are read from the environment, not from this file:
#   STORYPROOF_IP_ASSET_CONTRACT  ownership registry
#   STORYPROOF_PROOF_CONTRACT     checkpoint ledger
# Without them every checkpoint is kept in the local store only.

[storage]
# SQLite database for histories, claims and locally held blobs
db_path = "{db_path}"

[network]
# Switch wallets to the Story testnet (1338) instead of mainnet (1337)
use_testnet = false

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "info"
"#,
            db_path = db_path.display()
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        db_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(db_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Get the default data directory (`~/.local/share/storyproof`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storyproof")
}

pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}
