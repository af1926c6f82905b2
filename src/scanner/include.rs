//! `#include`-driven source scanner.
//!
//! Every `#include <Header.h>` or `#include "Header.h"` directive in a
//! library's sources is mapped to the installed library providing that
//! header. Headers no installed library provides are assumed to be system or
//! toolchain headers and skipped. When the scanned library declares a
//! `depends=` spec for a provider's global name, only providers satisfying
//! that spec are considered, and the selection carries the declared spec.
//! After the includes, the declared specs are resolved through the index as
//! well.

use super::{PreferenceSet, Selection, SourceScanner};
use crate::constants::{DEFAULT_SOURCE_EXTENSIONS, SCCS_FOLDERS, UTILITY_FOLDER};
use crate::library::{GlobalName, LibraryIndex, LibraryRecord};
use crate::version::DependencySpec;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

const INCLUDE_PATTERN: &str = r#"(?m)^\s*#\s*include\s*[<"]\s*([^>"]+?)\s*[>"]"#;

/// Scanner resolving `#include` directives against a [`LibraryIndex`].
#[derive(Debug, Clone)]
pub struct IncludeScanner {
    index: Arc<LibraryIndex>,
    extensions: Vec<String>,
    include: Regex,
}

impl IncludeScanner {
    /// Create a scanner over `index` counting the default source extensions.
    ///
    /// # Errors
    ///
    /// Fails only if the include pattern does not compile.
    pub fn new(index: Arc<LibraryIndex>) -> Result<Self> {
        Ok(Self {
            index,
            extensions: DEFAULT_SOURCE_EXTENSIONS.iter().map(ToString::to_string).collect(),
            include: Regex::new(INCLUDE_PATTERN).context("Failed to compile include pattern")?,
        })
    }

    /// Replace the set of file extensions counted as sources.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// The index selections are drawn from.
    #[must_use]
    pub const fn index(&self) -> &Arc<LibraryIndex> {
        &self.index
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }

    fn collect(&self, folder: &Path, max_depth: usize, out: &mut Vec<PathBuf>) {
        let walker = WalkDir::new(folder)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored_folder(entry));

        for entry in walker.filter_map(std::result::Result::ok) {
            if entry.file_type().is_file() && self.is_source(entry.path()) {
                out.push(entry.into_path());
            }
        }
    }

    /// Header names included by `file`, in order of appearance.
    fn included_headers(&self, file: &Path) -> Result<Vec<String>> {
        let bytes =
            std::fs::read(file).with_context(|| format!("Failed to read source file {}", file.display()))?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(self.include.captures_iter(&content).map(|caps| caps[1].to_string()).collect())
    }
}

/// The declared spec naming `library`'s global name, if any.
fn declared_for<'a>(declared: &'a [DependencySpec], library: &LibraryRecord) -> Option<&'a DependencySpec> {
    declared.iter().find(|spec| spec.matches_identifier(library))
}

/// Drop providers whose version falls outside a declared spec for them.
fn allowed_providers(
    providers: Vec<Arc<LibraryRecord>>,
    declared: &[DependencySpec],
) -> Result<Vec<Arc<LibraryRecord>>> {
    let mut allowed = Vec::with_capacity(providers.len());
    for provider in providers {
        match declared_for(declared, &provider) {
            Some(spec) if !spec.matches_version(provider.as_ref())? => {
                trace!("{} ruled out by declared {spec}", provider.dep_spec());
            }
            _ => allowed.push(provider),
        }
    }
    Ok(allowed)
}

fn is_ignored_folder(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SCCS_FOLDERS.contains(&name.as_ref())
}

impl SourceScanner for IncludeScanner {
    fn find_all_sources(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(anyhow::anyhow!("Source folder {} does not exist", root.display()));
        }

        let mut sources = Vec::new();
        if recursive {
            self.collect(root, usize::MAX, &mut sources);
        } else {
            self.collect(root, 1, &mut sources);
            let utility = root.join(UTILITY_FOLDER);
            if utility.is_dir() {
                self.collect(&utility, 1, &mut sources);
            }
        }
        sources.sort();
        trace!("{} source files in {}", sources.len(), root.display());
        Ok(sources)
    }

    fn find_required_libs(
        &self,
        root: &Path,
        recursive: bool,
        prefer: &PreferenceSet,
    ) -> Result<Vec<Selection>> {
        let owner = self.index.by_source_folder(root);
        let declared: &[DependencySpec] = owner.map(|owner| owner.depends()).unwrap_or_default();

        let mut seen: BTreeSet<GlobalName> = BTreeSet::new();
        let mut selections = Vec::new();
        let mut push = |selection: Selection| {
            if seen.insert(selection.global_name().clone()) {
                selections.push(selection);
            }
        };

        for file in self.find_all_sources(root, recursive)? {
            for header in self.included_headers(&file)? {
                let providers = allowed_providers(self.index.providers_of(&header), declared)?;
                let Some(library) = LibraryIndex::select(&providers, prefer) else {
                    trace!("No library provides {header}, included from {}", file.display());
                    continue;
                };
                debug!("{header} resolved to {}", library.dep_spec());
                let spec = declared_for(declared, &library)
                    .cloned()
                    .unwrap_or_else(|| DependencySpec::any(library.global_name().as_str()));
                push(Selection::new(spec, library));
            }
        }

        if let Some(owner) = owner {
            for spec in declared {
                match self.index.resolve(spec, prefer)? {
                    Some(library) => push(Selection::new(spec.clone(), library)),
                    None => warn!("Library {} depends on {spec}, which is not installed", owner.name()),
                }
            }
        }

        Ok(selections)
    }
}
