//! Direct and transitive dependency resolution with memoization.
//!
//! [`DependencyResolver`] answers two questions about a library:
//!
//! - [`direct_dependencies`](DependencyResolver::direct_dependencies): which
//!   libraries do its own sources use?
//! - [`transitive_dependencies`](DependencyResolver::transitive_dependencies):
//!   which libraries are reachable from it?
//!
//! Both answers are cached inside the queried [`LibraryRecord`] and reused
//! until a relevant source file changes, as tracked by the record's
//! [`StalenessCache`](crate::cache::StalenessCache).
//!
//! # Results
//!
//! Results list each library at most once, in discovery order, and never
//! contain the queried library itself. A transitive result lists every direct
//! dependency before descending into it, so for `A -> {B, C}`, `B -> D` the
//! closure of `A` is `B, D, C`.
//!
//! # Cycles
//!
//! Cycles are not errors. A library that is reached again while it is still
//! being expanded contributes nothing further at that point, so `A -> B -> C
//! -> A` yields `B, C` for `A`. A closure that was cut short this way below
//! the queried library is returned to its caller but never cached, so every
//! cached closure is complete.
//!
//! # Staleness
//!
//! The direct list of a record is stale when one of its own source files
//! changed. Its transitive closure is stale when a source file of any library
//! reachable from it changed since this record last looked. Each record keeps
//! its own timestamps for that, so one dependent consuming a change never
//! hides it from another.
//!
//! # Concurrency
//!
//! Records can be shared between threads. A record's cache lock is only held
//! for the short read or update of that record and never while another
//! record is being resolved, so concurrent queries cannot deadlock; they may
//! at worst scan the same library twice.


use crate::cache::Generation;
use crate::library::{GlobalName, LibraryRecord};
use crate::scanner::{PreferenceSet, Selection, SourceScanner};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolves dependencies of [`LibraryRecord`]s through a [`SourceScanner`].
#[derive(Debug)]
pub struct DependencyResolver<S> {
    scanner: S,
}

/// A transitive closure together with the libraries at which the cycle guard
/// cut it short.
struct Closure {
    selections: Vec<Selection>,
    cut: BTreeSet<GlobalName>,
}

impl<S: SourceScanner> DependencyResolver<S> {
    /// Create a resolver using `scanner` for source discovery.
    pub const fn new(scanner: S) -> Self {
        Self {
            scanner,
        }
    }

    /// The scanner in use.
    pub const fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Libraries used directly by `record`'s own sources.
    ///
    /// # Errors
    ///
    /// Fails when the record's sources cannot be listed or scanned. A failed
    /// scan leaves no cached list behind.
    pub fn direct_dependencies(&self, record: &LibraryRecord) -> Result<Vec<Selection>> {
        self.scan_direct(record).map(|(_, direct)| direct)
    }

    /// Every library reachable from `record`, deduplicated, in discovery
    /// order, without `record` itself.
    ///
    /// # Errors
    ///
    /// Fails when the sources of any reachable library cannot be listed or
    /// scanned. A failed computation leaves no cached closure behind.
    pub fn transitive_dependencies(&self, record: &LibraryRecord) -> Result<Vec<Selection>> {
        self.expand(record, BTreeSet::new()).map(|closure| closure.selections)
    }

    /// Whether anything reachable from `record` changed since `record` last
    /// checked its transitive timestamps. Records the current timestamps and
    /// drops the cached closure when something changed.
    ///
    /// # Errors
    ///
    /// See [`transitive_dependencies`](Self::transitive_dependencies).
    pub fn changed_recursively(&self, record: &LibraryRecord) -> Result<bool> {
        let (_, files) = self.closure_sources(record, BTreeSet::new())?;
        let mut cache = record.lock_cache();
        let changed = cache.staleness.is_stale(Generation::Transitive, &files);
        if changed {
            cache.transitive = None;
        }
        Ok(changed)
    }

    /// Own source files and direct dependency list of `record`, rescanning
    /// only when one of the files changed.
    fn scan_direct(&self, record: &LibraryRecord) -> Result<(Vec<PathBuf>, Vec<Selection>)> {
        let folder = record.source_folder();
        let recursive = record.uses_recursion();
        let sources = self
            .scanner
            .find_all_sources(&folder, recursive)
            .with_context(|| format!("Failed to list sources of library {}", record.name()))?;

        {
            let mut cache = record.lock_cache();
            if cache.staleness.is_stale(Generation::Direct, &sources) {
                cache.direct = None;
            } else if let Some(direct) = &cache.direct {
                debug!("Direct dependencies of {} are up to date", record.global_name());
                return Ok((sources, direct.clone()));
            }
        }

        debug!("Scanning sources of {} for dependencies", record.global_name());
        let mut direct = self
            .scanner
            .find_required_libs(&folder, recursive, &PreferenceSet::of(record))
            .with_context(|| format!("Failed to scan sources of library {}", record.name()))?;

        let mut seen = BTreeSet::new();
        direct.retain(|selection| {
            selection.global_name() != record.global_name() && seen.insert(selection.global_name().clone())
        });

        record.lock_cache().direct = Some(direct.clone());
        Ok((sources, direct))
    }

    /// Source files of `record` and of every library reachable from it that
    /// is not in `visited`. Returns the extended visited set with the files,
    /// so shared dependencies are walked once.
    fn closure_sources(
        &self,
        record: &LibraryRecord,
        visited: BTreeSet<GlobalName>,
    ) -> Result<(BTreeSet<GlobalName>, Vec<PathBuf>)> {
        if visited.contains(record.global_name()) {
            return Ok((visited, Vec::new()));
        }

        let mut visited = visited;
        visited.insert(record.global_name().clone());

        let (mut files, direct) = self.scan_direct(record)?;
        for dependency in direct {
            let (next, more) = self.closure_sources(dependency.library(), visited)?;
            visited = next;
            files.extend(more);
        }
        Ok((visited, files))
    }

    /// Transitive closure of `record`, given the libraries currently being
    /// expanded above it.
    fn expand(&self, record: &LibraryRecord, ancestors: BTreeSet<GlobalName>) -> Result<Closure> {
        let name = record.global_name();
        if ancestors.contains(name) {
            debug!("Dependency cycle through {name}");
            return Ok(Closure {
                selections: Vec::new(),
                cut: BTreeSet::from([name.clone()]),
            });
        }

        self.changed_recursively(record)?;
        let cached = record.lock_cache().transitive.clone();
        if let Some(transitive) = cached {
            debug!("Transitive dependencies of {name} are up to date");
            return Ok(Closure {
                selections: transitive,
                cut: BTreeSet::new(),
            });
        }

        debug!("Expanding transitive dependencies of {name}");
        let mut path = ancestors;
        path.insert(name.clone());

        let mut selections: Vec<Selection> = Vec::new();
        let mut seen: BTreeSet<GlobalName> = BTreeSet::new();
        let mut cut = BTreeSet::new();

        for dependency in self.direct_dependencies(record)? {
            if dependency.global_name() == name || !seen.insert(dependency.global_name().clone()) {
                continue;
            }
            let library = Arc::clone(dependency.library());
            selections.push(dependency);

            let below = self.expand(&library, path.clone())?;
            cut.extend(below.cut);
            for selection in below.selections {
                if selection.global_name() != name && seen.insert(selection.global_name().clone()) {
                    selections.push(selection);
                }
            }
        }

        cut.remove(name);
        if cut.is_empty() {
            record.lock_cache().transitive = Some(selections.clone());
        } else {
            debug!("Closure of {name} was cut at {} cycle point(s); not caching", cut.len());
        }

        Ok(Closure {
            selections,
            cut,
        })
    }
}
