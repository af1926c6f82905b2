//! Library records: one resolved, installed library package.
//!
//! A [`LibraryRecord`] is built from a library folder's declared metadata
//! (see [`loader`]) plus a few checks of the folder layout. Its identity is
//! its [`GlobalName`]: two records with the same global name are the same
//! library as far as equality, hashing and dependency resolution are
//! concerned, whatever their version or location.
//!
//! # Layouts
//!
//! | Layout                         | Sources                                   |
//! |--------------------------------|-------------------------------------------|
//! | [`LibraryLayout::Flat`]        | library root, plus a legacy `utility/`    |
//! | [`LibraryLayout::Recursive`]   | everything below `src/`, recursively      |
//!
//! # Construction errors and warnings
//!
//! Missing mandatory properties, a legacy `arch/` folder, or both `src/` and
//! `utility/` folders are fatal for that library. An unknown category, a
//! guessed global name, or a stray hidden folder only produce a warning.

pub mod global_name;
pub mod index;
pub mod loader;

pub use global_name::{GlobalName, ResolvedName};
pub use index::LibraryIndex;
pub use loader::{MetadataLoader, Properties, PropertiesFileLoader};

use crate::cache::ResolutionCache;
use crate::constants::{
    ANY_ARCHITECTURE, ARCH_FOLDER, CATEGORIES, DEFAULT_LICENSE, DEFAULT_TYPE, MANDATORY_PROPERTIES,
    SCCS_FOLDERS, SRC_FOLDER, UNCATEGORIZED, UTILITY_FOLDER,
};
use crate::core::LibraryError;
use crate::version::{DependencySpec, Identified};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use strsim::levenshtein;
use tracing::{debug, warn};

/// Where a library keeps its compiled sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryLayout {
    /// Sources at the root, plus an optional legacy `utility` folder.
    Flat,
    /// Sources under `src`, compiled recursively.
    Recursive,
}

/// Options for [`LibraryRecord::load_with`].
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Emit a warning when the global name had to be guessed.
    pub warn_guessed_global_names: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            warn_guessed_global_names: true,
        }
    }
}

/// A resolved library package.
pub struct LibraryRecord {
    root: PathBuf,
    name: String,
    version: Option<String>,
    author: String,
    maintainer: String,
    sentence: String,
    paragraph: String,
    website: String,
    category: String,
    license: String,
    architectures: Vec<String>,
    types: Vec<String>,
    depends: Vec<DependencySpec>,
    global_name: GlobalName,
    global_name_guessed: bool,
    layout: LibraryLayout,
    cache: Mutex<ResolutionCache>,
}

impl LibraryRecord {
    /// Load the library rooted at `root` with default options.
    ///
    /// # Errors
    ///
    /// See [`LibraryRecord::load_with`].
    pub fn load(root: &Path, loader: &dyn MetadataLoader) -> Result<Self> {
        Self::load_with(root, loader, LoadOptions::default())
    }

    /// Load the library rooted at `root`.
    ///
    /// # Errors
    ///
    /// - metadata cannot be loaded or parsed
    /// - [`LibraryError::UnsupportedArchFolder`] if `root/arch` exists
    /// - [`LibraryError::MissingProperty`] for the first absent mandatory key
    /// - [`LibraryError::ConflictingLayout`] if both `src` and `utility` exist
    /// - the root folder cannot be listed
    pub fn load_with(root: &Path, loader: &dyn MetadataLoader, options: LoadOptions) -> Result<Self> {
        let mut properties = loader
            .load(root)
            .with_context(|| format!("Failed to load metadata of library in {}", root.display()))?;

        // "email" was renamed to "maintainer"
        if !properties.contains_key("maintainer")
            && let Some(email) = properties.get("email").map(str::to_string)
        {
            properties.insert("maintainer", email);
        }

        if root.join(ARCH_FOLDER).is_dir() {
            return Err(LibraryError::UnsupportedArchFolder {
                path: root.display().to_string(),
            }
            .into());
        }

        for key in MANDATORY_PROPERTIES {
            if !properties.contains_key(key) {
                return Err(LibraryError::MissingProperty {
                    key: (*key).to_string(),
                    library: root.display().to_string(),
                }
                .into());
            }
        }

        let layout = detect_layout(root)?;
        let name = required(&properties, "name");
        warn_spurious_folders(root, &name)?;

        let record = Self {
            root: root.to_path_buf(),
            version: Some(required(&properties, "version")),
            author: required(&properties, "author"),
            maintainer: required(&properties, "maintainer"),
            sentence: required(&properties, "sentence"),
            paragraph: required(&properties, "paragraph"),
            website: required(&properties, "url"),
            category: validate_category(properties.get("category"), &name),
            license: properties.get("license").unwrap_or(DEFAULT_LICENSE).trim().to_string(),
            architectures: split_list(properties.get("architectures").unwrap_or(ANY_ARCHITECTURE)),
            types: split_list(properties.get("types").unwrap_or(DEFAULT_TYPE)),
            depends: properties
                .get("depends")
                .map(|list| split_list(list).iter().map(|s| DependencySpec::parse(s)).collect())
                .unwrap_or_default(),
            layout,
            name,
            global_name: GlobalName::new(""),
            global_name_guessed: false,
            cache: Mutex::new(ResolutionCache::default()),
        };

        let declared = properties.get("global_name").map(str::trim);
        Ok(record.with_global_name(declared, options))
    }

    /// Start building a record by hand, for callers that do not read metadata
    /// from disk.
    #[must_use]
    pub fn builder(root: impl Into<PathBuf>, name: impl Into<String>) -> LibraryBuilder {
        LibraryBuilder::new(root, name)
    }

    fn with_global_name(mut self, declared: Option<&str>, options: LoadOptions) -> Self {
        let website = Some(self.website.as_str()).filter(|w| !w.is_empty());
        let resolved = global_name::resolve(declared, website, &self.author, &self.name);
        if resolved.guessed && options.warn_guessed_global_names {
            warn!(
                "global_name not set in library {}. Guessing '{}'. Please set it to a suitable \
                 Java-style package name, e.g. io.github.myaccount.myproject, to avoid confusion \
                 when forking.",
                self.name, resolved.name
            );
        }
        self.global_name = resolved.name;
        self.global_name_guessed = resolved.guessed;
        self
    }

    /// The library folder.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Declared display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared version string, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Declared author.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Declared maintainer (or legacy email).
    #[must_use]
    pub fn maintainer(&self) -> &str {
        &self.maintainer
    }

    /// One-line description.
    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Long description.
    #[must_use]
    pub fn paragraph(&self) -> &str {
        &self.paragraph
    }

    /// Declared website URL.
    #[must_use]
    pub fn website(&self) -> &str {
        &self.website
    }

    /// Validated category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Declared license, or `Unspecified`.
    #[must_use]
    pub fn license(&self) -> &str {
        &self.license
    }

    /// Supported architectures; `*` means any.
    #[must_use]
    pub fn architectures(&self) -> &[String] {
        &self.architectures
    }

    /// Declared type tags.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Dependency specs declared with `depends=`.
    #[must_use]
    pub fn depends(&self) -> &[DependencySpec] {
        &self.depends
    }

    /// The identity of this library.
    #[must_use]
    pub const fn global_name(&self) -> &GlobalName {
        &self.global_name
    }

    /// Whether [`global_name`](Self::global_name) was guessed.
    #[must_use]
    pub const fn global_name_guessed(&self) -> bool {
        self.global_name_guessed
    }

    /// Source layout.
    #[must_use]
    pub const fn layout(&self) -> LibraryLayout {
        self.layout
    }

    /// `globalName[:version]`.
    #[must_use]
    pub fn dep_spec(&self) -> String {
        match &self.version {
            Some(version) => format!("{}:{}", self.global_name, version),
            None => self.global_name.to_string(),
        }
    }

    /// Folder holding the sources to compile and scan.
    #[must_use]
    pub fn source_folder(&self) -> PathBuf {
        match self.layout {
            LibraryLayout::Flat => self.root.clone(),
            LibraryLayout::Recursive => self.root.join(SRC_FOLDER),
        }
    }

    /// Whether the source folder is compiled recursively.
    #[must_use]
    pub fn uses_recursion(&self) -> bool {
        self.layout == LibraryLayout::Recursive
    }

    /// Whether the library declares support for `arch` (or for any).
    #[must_use]
    pub fn supports_architecture(&self, arch: &str) -> bool {
        self.architectures.iter().any(|a| a == ANY_ARCHITECTURE || a.eq_ignore_ascii_case(arch))
    }

    /// Lock this library's resolution cache.
    ///
    /// The lock must never be held while resolving another library.
    pub(crate) fn lock_cache(&self) -> MutexGuard<'_, ResolutionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serializable view of the declared metadata.
    #[must_use]
    pub fn summary(&self) -> LibrarySummary<'_> {
        LibrarySummary {
            name: &self.name,
            global_name: &self.global_name,
            global_name_guessed: self.global_name_guessed,
            version: self.version.as_deref(),
            author: &self.author,
            maintainer: &self.maintainer,
            sentence: &self.sentence,
            paragraph: &self.paragraph,
            website: &self.website,
            category: &self.category,
            license: &self.license,
            architectures: &self.architectures,
            types: &self.types,
            layout: self.layout,
            root: &self.root,
        }
    }
}

/// JSON-friendly view of a [`LibraryRecord`].
#[derive(Debug, Serialize)]
pub struct LibrarySummary<'a> {
    /// Declared name
    pub name: &'a str,
    /// Identity
    pub global_name: &'a GlobalName,
    /// Whether the identity was guessed
    pub global_name_guessed: bool,
    /// Declared version
    pub version: Option<&'a str>,
    /// Author
    pub author: &'a str,
    /// Maintainer
    pub maintainer: &'a str,
    /// One-line description
    pub sentence: &'a str,
    /// Long description
    pub paragraph: &'a str,
    /// Website
    pub website: &'a str,
    /// Category
    pub category: &'a str,
    /// License
    pub license: &'a str,
    /// Supported architectures
    pub architectures: &'a [String],
    /// Type tags
    pub types: &'a [String],
    /// Source layout
    pub layout: LibraryLayout,
    /// Library folder
    pub root: &'a Path,
}

impl Identified for LibraryRecord {
    fn identifier(&self) -> &str {
        self.global_name.as_str()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl PartialEq for LibraryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.global_name == other.global_name
    }
}

impl Eq for LibraryRecord {}

impl Hash for LibraryRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.global_name.hash(state);
    }
}

impl fmt::Debug for LibraryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryRecord")
            .field("global_name", &self.global_name)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("layout", &self.layout)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for LibraryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Library: {}", self.name)?;
        writeln!(f, "         (global_name={})", self.global_name)?;
        writeln!(f, "         (version={})", self.version.as_deref().unwrap_or("-"))?;
        writeln!(f, "         (author={})", self.author)?;
        writeln!(f, "         (maintainer={})", self.maintainer)?;
        writeln!(f, "         (sentence={})", self.sentence)?;
        writeln!(f, "         (paragraph={})", self.paragraph)?;
        writeln!(f, "         (url={})", self.website)?;
        writeln!(f, "         (category={})", self.category)?;
        writeln!(f, "         (license={})", self.license)?;
        writeln!(f, "         (architectures={})", self.architectures.join(","))?;
        write!(f, "         (layout={:?})", self.layout)
    }
}

/// Hand-built [`LibraryRecord`]s.
#[derive(Debug, Clone)]
pub struct LibraryBuilder {
    root: PathBuf,
    name: String,
    version: Option<String>,
    author: String,
    website: String,
    global_name: Option<String>,
    layout: LibraryLayout,
    category: Option<String>,
    architectures: Vec<String>,
    depends: Vec<DependencySpec>,
}

impl LibraryBuilder {
    fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            version: None,
            author: String::new(),
            website: String::new(),
            global_name: None,
            layout: LibraryLayout::Flat,
            category: None,
            architectures: vec![ANY_ARCHITECTURE.to_string()],
            depends: Vec::new(),
        }
    }

    /// Set the version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the author.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the website.
    #[must_use]
    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    /// Declare the global name.
    #[must_use]
    pub fn global_name(mut self, global_name: impl Into<String>) -> Self {
        self.global_name = Some(global_name.into());
        self
    }

    /// Set the source layout.
    #[must_use]
    pub const fn layout(mut self, layout: LibraryLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the category; unknown values are coerced like loaded metadata.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the supported architectures.
    #[must_use]
    pub fn architectures<I, S>(mut self, architectures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.architectures = architectures.into_iter().map(Into::into).collect();
        self
    }

    /// Add a declared dependency spec.
    #[must_use]
    pub fn depends_on(mut self, spec: &str) -> Self {
        self.depends.push(DependencySpec::parse(spec));
        self
    }

    /// Finish the record. A missing global name is resolved the same way as
    /// for loaded libraries, without the warning.
    #[must_use]
    pub fn build(self) -> LibraryRecord {
        let category = validate_category(self.category.as_deref(), &self.name);
        let record = LibraryRecord {
            root: self.root,
            name: self.name,
            version: self.version,
            author: self.author,
            maintainer: String::new(),
            sentence: String::new(),
            paragraph: String::new(),
            website: self.website,
            category,
            license: DEFAULT_LICENSE.to_string(),
            architectures: self.architectures,
            types: vec![DEFAULT_TYPE.to_string()],
            depends: self.depends,
            global_name: GlobalName::new(""),
            global_name_guessed: false,
            layout: self.layout,
            cache: Mutex::new(ResolutionCache::default()),
        };
        record.with_global_name(
            self.global_name.as_deref(),
            LoadOptions {
                warn_guessed_global_names: false,
            },
        )
    }
}

fn required(properties: &Properties, key: &str) -> String {
    properties.get(key).unwrap_or_default().trim().to_string()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect()
}

fn detect_layout(root: &Path) -> Result<LibraryLayout> {
    if root.join(SRC_FOLDER).is_dir() {
        if root.join(UTILITY_FOLDER).is_dir() {
            return Err(LibraryError::ConflictingLayout {
                path: root.display().to_string(),
            }
            .into());
        }
        Ok(LibraryLayout::Recursive)
    } else {
        Ok(LibraryLayout::Flat)
    }
}

fn warn_spurious_folders(root: &Path, name: &str) -> Result<()> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Unable to list files of library in {}", root.display()))?;

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && file_name.starts_with('.') && !SCCS_FOLDERS.contains(&file_name.as_ref()) {
            warn!("Spurious {file_name} folder in '{name}' library");
        }
    }
    Ok(())
}

fn validate_category(category: Option<&str>, library: &str) -> String {
    let category = category.map(str::trim).unwrap_or(UNCATEGORIZED);
    if CATEGORIES.contains(&category) {
        return category.to_string();
    }

    match closest_category(category) {
        Some(suggestion) => warn!(
            "Category '{category}' in library {library} is not valid (did you mean '{suggestion}'?). \
             Setting to '{UNCATEGORIZED}'"
        ),
        None => warn!(
            "Category '{category}' in library {library} is not valid. Setting to '{UNCATEGORIZED}'"
        ),
    }
    UNCATEGORIZED.to_string()
}

/// Closest valid category within half the length of the input.
fn closest_category(category: &str) -> Option<&'static str> {
    let limit = category.len() / 2;
    CATEGORIES
        .iter()
        .map(|candidate| (*candidate, levenshtein(category, candidate)))
        .filter(|(_, distance)| *distance <= limit)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| {
            debug!("Closest category to '{category}' is '{candidate}'");
            candidate
        })
}
