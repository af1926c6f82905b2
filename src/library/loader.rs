//! Loading declared library metadata.
//!
//! A library folder describes itself in a `library.properties` file made of
//! `key=value` lines:
//!
//! ```text
//! # comments and blank lines are ignored
//! name=Servo
//! version=1.1.8
//! author=Michael Margolis, Arduino
//! maintainer=Arduino <info@arduino.cc>
//! sentence=Allows controlling up to 12 servos.
//! paragraph=Uses the Timer1 peripheral.
//! url=https://www.arduino.cc/reference/en/libraries/servo/
//! category=Device Control
//! architectures=avr,megaavr,sam
//! global_name=cc.arduino.servo
//! ```
//!
//! [`MetadataLoader`] is the seam the rest of the crate depends on;
//! [`PropertiesFileLoader`] is the implementation that reads the file above.

use crate::constants::PROPERTIES_FILE;
use crate::core::LibraryError;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Declared string properties of one library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether a property is declared.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set a property, replacing any earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

/// Source of declared library metadata.
pub trait MetadataLoader {
    /// Load the declared properties of the library rooted at `root`.
    ///
    /// # Errors
    ///
    /// Implementations fail when no metadata exists for `root` or it cannot
    /// be read or parsed.
    fn load(&self, root: &Path) -> Result<Properties>;
}

/// Reads `<root>/library.properties`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesFileLoader;

impl MetadataLoader for PropertiesFileLoader {
    fn load(&self, root: &Path) -> Result<Properties> {
        let file = root.join(PROPERTIES_FILE);
        if !file.is_file() {
            return Err(LibraryError::MetadataNotFound {
                path: root.display().to_string(),
            }
            .into());
        }

        let bytes = std::fs::read(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(parse_properties(&content, &file.display().to_string())?)
    }
}

/// Parse `key=value` lines.
///
/// Keys and values are trimmed; `#` comment lines and blank lines are skipped;
/// a later duplicate key overrides an earlier one. A leading UTF-8 byte-order
/// mark is ignored.
///
/// # Errors
///
/// Returns [`LibraryError::MetadataParseError`] for a non-blank line without
/// `=` or with an empty key.
pub fn parse_properties(content: &str, file: &str) -> Result<Properties, LibraryError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut properties = Properties::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(LibraryError::MetadataParseError {
                file: file.to_string(),
                line: idx + 1,
                reason: format!("expected 'key=value', found '{line}'"),
            });
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(LibraryError::MetadataParseError {
                file: file.to_string(),
                line: idx + 1,
                reason: "empty key".to_string(),
            });
        }

        properties.insert(key, value.trim());
    }

    Ok(properties)
}
