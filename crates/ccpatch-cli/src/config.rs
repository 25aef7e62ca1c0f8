//! CLI configuration via environment variables
//!
//! The persisted patch selection lives in `ccpatch-config`; this covers the
//! process-level knobs that only make sense per invocation.

use ccpatch_config::{ConfigResult, ConfigStore};
use std::env;
use std::path::PathBuf;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Configuration directory override (CCPATCH_HOME=/path/to/dir)
    pub home: Option<PathBuf>,
    /// Disable colored output (CCPATCH_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
    /// Log filter directive (CCPATCH_LOG=debug)
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            home: env::var_os("CCPATCH_HOME")
                .filter(|home| !home.is_empty())
                .map(PathBuf::from),
            no_color: env::var_os("CCPATCH_NO_COLOR").is_some()
                || env::var_os("NO_COLOR").is_some(),
            log_filter: env::var("CCPATCH_LOG")
                .ok()
                .filter(|filter| !filter.trim().is_empty()),
        }
    }

    /// Configuration store at CCPATCH_HOME, or ~/.ccpatch
    pub fn store(&self) -> ConfigResult<ConfigStore> {
        match &self.home {
            Some(home) => Ok(ConfigStore::new(home)),
            None => ConfigStore::from_home(),
        }
    }
}
