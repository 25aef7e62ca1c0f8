//! ccpatch configuration
//!
//! The user configuration lives in `~/.ccpatch/config.json` and records which
//! patches are enabled and the default file to patch:
//!
//! ```json
//! {
//!   "enabledPatches": ["validationPatch", "escInterruptPatch"],
//!   "cliPath": "/usr/local/lib/node_modules/app/cli.js"
//! }
//! ```
//!
//! The directory can be relocated with `CCPATCH_HOME`; backups are kept in its
//! `backup/` subdirectory.
//!
//! # Example
//!
//! ```no_run
//! use ccpatch_config::ConfigStore;
//!
//! let store = ConfigStore::from_home().unwrap();
//! let loaded = store.load().unwrap();
//! if loaded.is_new {
//!     println!("no configuration yet");
//! }
//! ```

pub mod patches;
pub mod store;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON in {file}: {error}")]
    JsonParseError {
        file: PathBuf,
        error: serde_json::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(serde_json::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use patches::PatchConfig;
pub use store::{ConfigStore, LoadedConfig};
