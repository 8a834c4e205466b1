//! Path management for Tally
//!
//! ## Path Resolution Order
//!
//! 1. `TALLY_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/tally` or `~/.config/tally`
//! 3. Windows: `%APPDATA%\tally`

use std::path::{Path, PathBuf};

use crate::error::TallyError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Manages all paths used by Tally
#[derive(Debug, Clone)]
pub struct TallyPaths {
    base_dir: PathBuf,
}

impl TallyPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, TallyError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create TallyPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Default directory that imported CSV file names are resolved against
    pub fn uploads_dir(&self) -> PathBuf {
        self.base_dir.join("uploads")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    /// Ensure the base, data and uploads directories exist
    pub fn ensure_directories(&self) -> Result<(), TallyError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TallyError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TallyError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.uploads_dir())
            .map_err(|e| TallyError::Io(format!("Failed to create uploads directory: {}", e)))?;

        Ok(())
    }

    /// Check if Tally has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, TallyError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join("tally"));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        TallyError::Config(format!(
            "HOME is not set; set {} to choose a data directory",
            DATA_DIR_ENV
        ))
    })?;
    Ok(PathBuf::from(home).join(".config").join("tally"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, TallyError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| TallyError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("tally"))
}
