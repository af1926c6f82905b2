//! Test fixtures for writing library folders to disk

use crate::constants::PROPERTIES_FILE;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture describing one library folder.
///
/// Starts out with every mandatory property set, a `1.0.0` version and a
/// declared `global_name` of `org.test.<lowercased name>`.
#[derive(Clone, Debug)]
pub struct LibraryFixture {
    pub dir_name: String,
    pub properties: Vec<(String, String)>,
    pub files: Vec<(PathBuf, String)>,
    pub folders: Vec<PathBuf>,
}

impl LibraryFixture {
    /// Complete library named `name`, stored in a folder of the same name
    pub fn new(name: &str) -> Self {
        let lower = name.to_lowercase();
        let properties = [
            ("name", name.to_string()),
            ("version", "1.0.0".to_string()),
            ("author", "Test Author".to_string()),
            ("maintainer", "Test Author <test@example.com>".to_string()),
            ("sentence", format!("The {name} library.")),
            ("paragraph", format!("The {name} library, used in tests.")),
            ("url", format!("https://example.com/{lower}")),
            ("global_name", format!("org.test.{lower}")),
        ];

        Self {
            dir_name: name.to_string(),
            properties: properties.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            files: Vec::new(),
            folders: Vec::new(),
        }
    }

    /// Set a property, replacing an earlier value
    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.retain(|(k, _)| k != key);
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    /// Drop a property
    pub fn without(mut self, key: &str) -> Self {
        self.properties.retain(|(k, _)| k != key);
        self
    }

    /// Set the version
    pub fn version(self, version: &str) -> Self {
        self.property("version", version)
    }

    /// Set the declared global name
    pub fn global_name(self, global_name: &str) -> Self {
        self.property("global_name", global_name)
    }

    /// Set the declared `depends=` list
    pub fn depends(self, specs: &[&str]) -> Self {
        self.property("depends", &specs.join(","))
    }

    /// Add a file with arbitrary content, relative to the library folder
    pub fn file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.push((path.into(), content.to_string()));
        self
    }

    /// Add an empty header, making this library its provider
    pub fn header(self, path: &str) -> Self {
        self.file(path, "#pragma once\n")
    }

    /// Add a source file including each of `headers`
    pub fn source(self, path: &str, headers: &[&str]) -> Self {
        let content: String = headers.iter().map(|h| format!("#include <{h}>\n")).collect();
        self.file(path, &content)
    }

    /// Add an empty folder
    pub fn folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.folders.push(path.into());
        self
    }

    /// The `library.properties` text
    pub fn properties_text(&self) -> String {
        self.properties.iter().map(|(k, v)| format!("{k}={v}\n")).collect()
    }

    /// Write the library below `parent`, returning its root folder
    pub fn write(&self, parent: &Path) -> Result<PathBuf> {
        let root = parent.join(&self.dir_name);
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create library folder {}", root.display()))?;
        fs::write(root.join(PROPERTIES_FILE), self.properties_text())?;

        for folder in &self.folders {
            fs::create_dir_all(root.join(folder))?;
        }
        for (path, content) in &self.files {
            let file = root.join(path);
            if let Some(dir) = file.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&file, content).with_context(|| format!("Failed to write {}", file.display()))?;
        }
        Ok(root)
    }
}
