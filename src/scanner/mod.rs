//! Discovering which libraries a library's sources use.
//!
//! The resolver never looks at source files itself. It goes through a
//! [`SourceScanner`], which lists a library's sources (so their modification
//! times can be tracked) and turns their contents into [`Selection`]s, each a
//! dependency spec bound to one concrete [`LibraryRecord`].
//!
//! [`IncludeScanner`] is the default scanner: it follows `#include`
//! directives and declared `depends=` specs through a
//! [`LibraryIndex`](crate::library::index::LibraryIndex).

pub mod include;

pub use include::IncludeScanner;

use crate::library::{GlobalName, LibraryRecord};
use crate::version::DependencySpec;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A dependency spec bound to the library chosen to satisfy it.
///
/// Two selections are equal when they chose the same library; the spec that
/// led there does not take part in equality.
#[derive(Clone)]
pub struct Selection {
    spec: DependencySpec,
    library: Arc<LibraryRecord>,
}

impl Selection {
    /// Bind `spec` to `library`.
    #[must_use]
    pub const fn new(spec: DependencySpec, library: Arc<LibraryRecord>) -> Self {
        Self {
            spec,
            library,
        }
    }

    /// The spec that was resolved.
    #[must_use]
    pub const fn spec(&self) -> &DependencySpec {
        &self.spec
    }

    /// The chosen library.
    #[must_use]
    pub const fn library(&self) -> &Arc<LibraryRecord> {
        &self.library
    }

    /// Identity of the chosen library.
    #[must_use]
    pub fn global_name(&self) -> &GlobalName {
        self.library.global_name()
    }

    /// Serializable view for reports.
    #[must_use]
    pub fn view(&self) -> SelectionView<'_> {
        SelectionView {
            global_name: self.library.global_name(),
            version: self.library.version(),
            spec: self.spec.to_string(),
            root: self.library.root(),
        }
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.library.global_name() == other.library.global_name()
    }
}

impl Eq for Selection {}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selection({} -> {})", self.spec, self.library.dep_spec())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.library.global_name(),
            self.library.version().unwrap_or("-"),
            self.spec
        )
    }
}

/// JSON-friendly view of a [`Selection`].
#[derive(Debug, Serialize)]
pub struct SelectionView<'a> {
    /// Identity of the chosen library
    pub global_name: &'a GlobalName,
    /// Its declared version
    pub version: Option<&'a str>,
    /// The spec that selected it
    pub spec: String,
    /// Its folder
    pub root: &'a Path,
}

/// Libraries a scanner should favour when several candidates fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSet {
    preferred: BTreeSet<GlobalName>,
}

impl PreferenceSet {
    /// Nothing preferred.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer exactly `library`.
    #[must_use]
    pub fn of(library: &LibraryRecord) -> Self {
        let mut set = Self::new();
        set.insert(library.global_name().clone());
        set
    }

    /// Add a preferred identity.
    pub fn insert(&mut self, name: GlobalName) {
        self.preferred.insert(name);
    }

    /// Whether `library` is preferred.
    #[must_use]
    pub fn prefers(&self, library: &LibraryRecord) -> bool {
        self.preferred.contains(library.global_name())
    }

    /// `true` if nothing is preferred.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty()
    }
}

/// Source discovery used by the resolver.
pub trait SourceScanner {
    /// List the source files below `root`, recursing into sub-folders only
    /// when `recursive` is set.
    ///
    /// # Errors
    ///
    /// Fails when `root` cannot be walked.
    fn find_all_sources(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>>;

    /// Find the libraries used by the sources below `root`, favouring the
    /// libraries in `prefer` when several candidates fit one reference.
    ///
    /// # Errors
    ///
    /// Fails when sources cannot be read or a version cannot be compared.
    fn find_required_libs(
        &self,
        root: &Path,
        recursive: bool,
        prefer: &PreferenceSet,
    ) -> Result<Vec<Selection>>;
}

impl<S: SourceScanner + ?Sized> SourceScanner for Arc<S> {
    fn find_all_sources(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        (**self).find_all_sources(root, recursive)
    }

    fn find_required_libs(
        &self,
        root: &Path,
        recursive: bool,
        prefer: &PreferenceSet,
    ) -> Result<Vec<Selection>> {
        (**self).find_required_libs(root, recursive, prefer)
    }
}
