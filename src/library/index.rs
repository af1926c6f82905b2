//! The set of installed libraries a scanner can choose from.
//!
//! A [`LibraryIndex`] is loaded once from the configured library folders and
//! then only read. Each immediate sub-folder of a library folder is one
//! library; a library that fails to load is reported and left out, without
//! affecting the others.
//!
//! Several installed libraries can match one reference. [`LibraryIndex::select`]
//! picks one of them:
//!
//! 1. a library in the caller's [`PreferenceSet`] wins;
//! 2. otherwise the highest version wins, where a version that is not a
//!    plain dotted number ranks below every parsable one;
//! 3. remaining ties keep index order (folder order, then path order).

use super::{LibraryRecord, LoadOptions, MetadataLoader};
use crate::constants::HEADER_EXTENSIONS;
use crate::core::LibraryError;
use crate::scanner::PreferenceSet;
use crate::version::{DependencySpec, VersionVector};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable collection of loaded libraries.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    records: Vec<Arc<LibraryRecord>>,
    headers: BTreeMap<String, Vec<usize>>,
}

impl LibraryIndex {
    /// Load every library found directly below each of `library_paths`.
    ///
    /// Folders that do not exist are skipped with a warning. A sub-folder
    /// without metadata is silently ignored; one whose metadata or layout is
    /// invalid, or that cannot be read, is reported and ignored.
    ///
    /// # Errors
    ///
    /// Fails only when an existing library folder cannot be listed.
    pub fn load(library_paths: &[PathBuf], loader: &dyn MetadataLoader, options: LoadOptions) -> Result<Self> {
        let mut records = Vec::new();

        for folder in library_paths {
            if !folder.is_dir() {
                warn!("Library folder {} does not exist, skipping", folder.display());
                continue;
            }

            let mut roots: Vec<PathBuf> = std::fs::read_dir(folder)
                .with_context(|| format!("Failed to list library folder {}", folder.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_dir())
                .collect();
            roots.sort();

            for root in roots {
                match LibraryRecord::load_with(&root, loader, options) {
                    Ok(record) => {
                        debug!("Indexed {} from {}", record.dep_spec(), root.display());
                        records.push(Arc::new(record));
                    }
                    Err(e) => match library_error(&e) {
                        Some(LibraryError::MetadataNotFound { .. }) => {
                            debug!("Skipping {}: no library metadata", root.display());
                        }
                        Some(error) if error.is_configuration_error() => {
                            warn!("Invalid library in {}: {e:#}", root.display());
                        }
                        _ => warn!("Could not load library in {}: {e:#}", root.display()),
                    },
                }
            }
        }

        Ok(Self::from_records(records))
    }

    /// Build an index over already loaded records, keeping their order.
    #[must_use]
    pub fn from_records(records: Vec<Arc<LibraryRecord>>) -> Self {
        let mut headers: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            for header in provided_headers(&record.source_folder()) {
                headers.entry(header).or_default().push(idx);
            }
        }

        Self {
            records,
            headers,
        }
    }

    /// Make sure `record` is part of the index.
    ///
    /// When an indexed record has the same global name and lives in the same
    /// folder, that record is returned and `record` is dropped, so caches
    /// built up through the index are shared. Otherwise `record` is appended.
    #[must_use]
    pub fn including(self, record: LibraryRecord) -> (Self, Arc<LibraryRecord>) {
        let existing = self
            .records
            .iter()
            .find(|r| r.global_name() == record.global_name() && same_folder(r.root(), record.root()))
            .cloned();
        if let Some(existing) = existing {
            return (self, existing);
        }

        let record = Arc::new(record);
        let mut records = self.records;
        records.push(Arc::clone(&record));
        (Self::from_records(records), record)
    }

    /// All records in index order.
    #[must_use]
    pub fn records(&self) -> &[Arc<LibraryRecord>] {
        &self.records
    }

    /// Number of indexed libraries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if no library was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with the given global name.
    #[must_use]
    pub fn find(&self, global_name: &str) -> Option<&Arc<LibraryRecord>> {
        self.records.iter().find(|r| r.global_name().as_str() == global_name)
    }

    /// The record whose source folder is `folder`.
    #[must_use]
    pub fn by_source_folder(&self, folder: &Path) -> Option<&Arc<LibraryRecord>> {
        self.records.iter().find(|r| r.source_folder() == folder)
    }

    /// Records matching both the identifier and the constraint of `spec`, in
    /// index order.
    ///
    /// # Errors
    ///
    /// Propagates [`LibraryError::InvalidVersion`] when the constraint or a
    /// candidate's version cannot be compared numerically.
    pub fn candidates(&self, spec: &DependencySpec) -> Result<Vec<Arc<LibraryRecord>>, LibraryError> {
        let mut found = Vec::new();
        for record in &self.records {
            if spec.matches(record.as_ref())? {
                found.push(Arc::clone(record));
            }
        }
        Ok(found)
    }

    /// Records whose source folder directly contains a header named `header`.
    #[must_use]
    pub fn providers_of(&self, header: &str) -> Vec<Arc<LibraryRecord>> {
        self.headers
            .get(header)
            .map(|indices| indices.iter().map(|&i| Arc::clone(&self.records[i])).collect())
            .unwrap_or_default()
    }

    /// Pick one of `candidates`; see the module docs for the rule.
    #[must_use]
    pub fn select(candidates: &[Arc<LibraryRecord>], prefer: &PreferenceSet) -> Option<Arc<LibraryRecord>> {
        let rank = |record: &LibraryRecord| {
            let version = record.version().and_then(|v| VersionVector::parse(v).ok());
            (prefer.prefers(record), version)
        };

        let mut best: Option<(&Arc<LibraryRecord>, (bool, Option<VersionVector>))> = None;
        for candidate in candidates {
            let candidate_rank = rank(candidate);
            if best.as_ref().is_none_or(|(_, best_rank)| candidate_rank > *best_rank) {
                best = Some((candidate, candidate_rank));
            }
        }
        best.map(|(record, _)| Arc::clone(record))
    }

    /// [`candidates`](Self::candidates) followed by [`select`](Self::select).
    ///
    /// # Errors
    ///
    /// See [`candidates`](Self::candidates).
    pub fn resolve(
        &self,
        spec: &DependencySpec,
        prefer: &PreferenceSet,
    ) -> Result<Option<Arc<LibraryRecord>>, LibraryError> {
        Ok(Self::select(&self.candidates(spec)?, prefer))
    }
}

fn same_folder(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn library_error(error: &anyhow::Error) -> Option<&LibraryError> {
    error.chain().find_map(|cause| cause.downcast_ref::<LibraryError>())
}

/// Header file names directly inside `folder`, sorted.
fn provided_headers(folder: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(folder) else {
        return Vec::new();
    };

    let mut headers: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext))
        })
        .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect();
    headers.sort();
    headers
}
