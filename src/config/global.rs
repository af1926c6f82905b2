//! Global configuration with library folders and scanning preferences.
//!
//! The file lives at `~/.libresolve/config.toml` (`%LOCALAPPDATA%\libresolve\config.toml`
//! on Windows). Its location can be overridden with the `LIBRESOLVE_CONFIG`
//! environment variable or the `--config` flag. A missing file is not an
//! error: every key has a default.
//!
//! ```toml
//! # Folders whose sub-folders are installed libraries
//! library_paths = ["/home/me/Arduino/libraries", "/opt/arduino/libraries"]
//!
//! # Extensions counted as sources (default shown)
//! source_extensions = ["c", "cpp", "cc", "cxx", "h", "hh", "hpp", "S", "ino"]
//!
//! # Warn when a library does not declare its global_name
//! warn_guessed_global_names = true
//! ```

use crate::constants::DEFAULT_SOURCE_EXTENSIONS;
use crate::core::LibraryError;
use crate::library::LoadOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_source_extensions() -> Vec<String> {
    DEFAULT_SOURCE_EXTENSIONS.iter().map(ToString::to_string).collect()
}

const fn default_warn_guessed() -> bool {
    true
}

#[allow(clippy::ptr_arg)]
fn is_default_source_extensions(extensions: &Vec<String>) -> bool {
    *extensions == default_source_extensions()
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_true(value: &bool) -> bool {
    *value
}

/// Global configuration structure for libresolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Folders whose immediate sub-folders are libraries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub library_paths: Vec<PathBuf>,

    /// File extensions counted as source files, without the dot.
    #[serde(default = "default_source_extensions", skip_serializing_if = "is_default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Warn about libraries whose global name had to be guessed.
    #[serde(default = "default_warn_guessed", skip_serializing_if = "is_true")]
    pub warn_guessed_global_names: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            library_paths: Vec::new(),
            source_extensions: default_source_extensions(),
            warn_guessed_global_names: default_warn_guessed(),
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, or defaults if there is no file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The home directory cannot be determined
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        Self::load_with_optional(None)
    }

    /// Load from `path` when given, otherwise from the default location.
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No path is given and the default cannot be determined
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    pub fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (permissions, not found, etc.)
    /// - The file contains invalid TOML syntax
    /// - The TOML structure doesn't match the expected schema
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(LibraryError::from)
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .map_err(LibraryError::from)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Save to a specific file, creating parent folders as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directories cannot be created
    /// - The file cannot be written
    /// - Serialization to TOML fails
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// Default file location.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\libresolve\config.toml`
    /// - **Unix/macOS**: `~/.libresolve/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| LibraryError::ConfigError {
                    message: "Unable to determine local data directory".to_string(),
                })?
                .join("libresolve")
        } else {
            dirs::home_dir()
                .ok_or_else(|| LibraryError::ConfigError {
                    message: "Unable to determine home directory".to_string(),
                })?
                .join(".libresolve")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Options for loading library records under this configuration.
    #[must_use]
    pub const fn load_options(&self) -> LoadOptions {
        LoadOptions {
            warn_guessed_global_names: self.warn_guessed_global_names,
        }
    }
}
