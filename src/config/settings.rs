//! User settings for Tally

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::TallyPaths;
use crate::error::TallyError;

/// User settings, persisted as `config.json` in the base directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Directory that relative import file names are resolved against.
    /// Falls back to `<base>/uploads` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_dir: Option<PathBuf>,

    /// Skip the balance check when adding outcomes
    #[serde(default)]
    pub allow_overdraft: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            uploads_dir: None,
            allow_overdraft: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &TallyPaths) -> Result<Self, TallyError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| TallyError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| TallyError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TallyPaths) -> Result<(), TallyError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TallyError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TallyError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// The directory import file names are resolved against
    pub fn uploads_dir(&self, paths: &TallyPaths) -> PathBuf {
        self.uploads_dir
            .clone()
            .unwrap_or_else(|| paths.uploads_dir())
    }
}
