//! Configuration directory (~/.ccpatch)

use crate::patches::PatchConfig;
use crate::{ConfigError, ConfigResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration directory under the home directory
pub const CONFIG_DIR_NAME: &str = ".ccpatch";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Name of the backup directory inside the configuration directory
pub const BACKUP_DIR_NAME: &str = "backup";

/// Configuration as loaded from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: PatchConfig,
    /// True when no configuration file existed yet
    pub is_new: bool,
}

/// Reads and writes the configuration directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at `~/.ccpatch`
    pub fn from_home() -> ConfigResult<Self> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.dir.join(BACKUP_DIR_NAME)
    }

    /// Load the configuration, falling back to defaults when the file is missing
    pub fn load(&self) -> ConfigResult<LoadedConfig> {
        let path = self.config_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedConfig {
                    config: PatchConfig::default(),
                    is_new: true,
                });
            }
            Err(e) => return Err(ConfigError::IoError(e)),
        };

        let config: PatchConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
                file: path.clone(),
                error: e,
            })?;
        let config = config.normalize();
        config.validate()?;

        Ok(LoadedConfig {
            config,
            is_new: false,
        })
    }

    /// Write the configuration as pretty-printed JSON, creating the directory
    pub fn save(&self, config: &PatchConfig) -> ConfigResult<()> {
        config.validate()?;
        fs::create_dir_all(&self.dir)?;
        let mut content =
            serde_json::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
        content.push('\n');
        fs::write(self.config_path(), content)?;
        Ok(())
    }
}
