use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::fields::DEFAULT_FIELDS_FILE;
use crate::service::DEFAULT_SERVICE_URL;

pub const CONFIG_FILE_NAME: &str = "dialogue-forge.toml";
pub const RC_FILE_NAME: &str = ".dialogue-forge-rc";
pub const ENV_PREFIX: &str = "DIALOGUE_FORGE";

/// Main configuration structure for Dialogue Forge
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DialogueForgeConfig {
    /// Dialogue service connection
    pub service: ServiceConfig,
    /// Where field definitions are persisted
    pub storage: StorageConfig,
    /// Initial session settings
    pub session: SessionConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL the three endpoints are resolved against
    pub base_url: String,
    /// Overall request timeout; unset means no timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// JSON file holding the field definitions
    pub fields_file: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Whether sessions start with debug mode on
    pub debug_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for DialogueForgeConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                base_url: DEFAULT_SERVICE_URL.to_string(),
                timeout_seconds: None,
            },
            storage: StorageConfig {
                fields_file: DEFAULT_FIELDS_FILE.to_string(),
            },
            session: SessionConfig { debug_mode: false },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
        }
    }
}

impl DialogueForgeConfig {
    /// Load configuration from the current directory. See [`Self::load_from_dir`].
    pub fn load() -> Result<Self> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (dialogue-forge.toml, .dialogue-forge-rc) in `dir`
    /// 3. Environment variables (`DIALOGUE_FORGE_<SECTION>__<KEY>`)
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        for name in [CONFIG_FILE_NAME, RC_FILE_NAME] {
            let path = dir.join(name);
            if path.exists() {
                builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
