//! The persisted patch selection

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Contents of `config.json`
///
/// Unknown keys are ignored so older files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchConfig {
    /// Names of the patches applied when none are given on the command line
    #[serde(default)]
    pub enabled_patches: Vec<String>,

    /// Default file to patch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<String>,
}

impl PatchConfig {
    /// Treat an empty path as no path
    pub(crate) fn normalize(mut self) -> Self {
        if self
            .cli_path
            .as_deref()
            .is_some_and(|path| path.trim().is_empty())
        {
            self.cli_path = None;
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.enabled_patches.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "enabledPatches".to_string(),
                reason: "patch names must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_patches.iter().any(|enabled| enabled == name)
    }

    /// Flip one patch; returns whether it is enabled afterwards
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.is_enabled(name) {
            self.enabled_patches.retain(|enabled| enabled != name);
            false
        } else {
            self.enabled_patches.push(name.to_string());
            true
        }
    }

    pub fn enable_all(&mut self, names: &[&str]) {
        self.enabled_patches = names.iter().map(|name| name.to_string()).collect();
    }

    pub fn disable_all(&mut self) {
        self.enabled_patches.clear();
    }

    /// Enable exactly the patches among `names` that are currently disabled
    pub fn invert(&mut self, names: &[&str]) {
        self.enabled_patches = names
            .iter()
            .filter(|name| !self.is_enabled(name))
            .map(|name| name.to_string())
            .collect();
    }

    /// Set or clear the default path; blank input clears it
    pub fn set_cli_path(&mut self, path: Option<String>) {
        self.cli_path = path.filter(|path| !path.trim().is_empty());
    }

    /// Enabled names that are not in `known`
    pub fn unknown_patches<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        self.enabled_patches
            .iter()
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect()
    }

    /// True when the selections differ, ignoring order
    pub fn differs_from(&self, other: &PatchConfig) -> bool {
        let mut mine: Vec<&str> = self.enabled_patches.iter().map(String::as_str).collect();
        let mut theirs: Vec<&str> = other.enabled_patches.iter().map(String::as_str).collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine != theirs || self.cli_path != other.cli_path
    }
}
