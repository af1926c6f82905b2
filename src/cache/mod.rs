//! Staleness tracking and per-library resolution caches.
//!
//! Scanning a library's sources for the libraries it uses is expensive, and
//! expanding a full transitive closure is far more so. Both results are
//! memoized per library and reused until one of the underlying source files
//! changes.
//!
//! # Generations
//!
//! Change detection runs on two independent tracks, each remembering its own
//! last-seen modification time for every file:
//!
//! - [`Generation::Direct`] guards the library's own direct-dependency list
//!   and only ever sees the library's own sources.
//! - [`Generation::Transitive`] guards the transitive closure and sees the
//!   sources of every library reachable from this one.
//!
//! Because the tracks are separate, consuming a change for one purpose never
//! hides it from the other.
//!
//! # Lifetime
//!
//! Caches live in memory for the lifetime of the process and are never
//! persisted: the first query after a restart always recomputes.

use crate::scanner::Selection;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::trace;

/// An independent staleness track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// The library's own sources, guarding its direct-dependency list.
    Direct,
    /// Sources of the whole reachable graph, guarding the transitive closure.
    Transitive,
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Transitive => f.write_str("transitive"),
        }
    }
}

/// Last-seen modification times of one file, per generation.
#[derive(Debug, Clone, Copy, Default)]
struct SeenTimes {
    direct: Option<SystemTime>,
    transitive: Option<SystemTime>,
}

impl SeenTimes {
    fn slot(&mut self, generation: Generation) -> &mut Option<SystemTime> {
        match generation {
            Generation::Direct => &mut self.direct,
            Generation::Transitive => &mut self.transitive,
        }
    }

    fn get(&self, generation: Generation) -> Option<SystemTime> {
        match generation {
            Generation::Direct => self.direct,
            Generation::Transitive => self.transitive,
        }
    }
}

/// File → last-seen modification time table.
#[derive(Debug, Clone, Default)]
pub struct StalenessCache {
    seen: BTreeMap<PathBuf, SeenTimes>,
}

impl StalenessCache {
    /// Create an empty cache; everything is stale on first check.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `files` against the table for `generation`, reading their
    /// current modification times from the filesystem.
    ///
    /// A file whose metadata cannot be read counts as modified at the Unix
    /// epoch, so it is stale on first sight and never again until readable.
    pub fn is_stale(&mut self, generation: Generation, files: &[PathBuf]) -> bool {
        self.observe(
            generation,
            files.iter().map(|file| (file.as_path(), modification_time(file))),
        )
    }

    /// Record observed `(file, modification time)` pairs for `generation`.
    ///
    /// Returns `true` if at least one file was unseen at this generation or
    /// newer than its stored time. Every pair is recorded even after
    /// staleness has been established, so no file is left with an outdated
    /// entry.
    pub fn observe<'a, I>(&mut self, generation: Generation, observations: I) -> bool
    where
        I: IntoIterator<Item = (&'a Path, SystemTime)>,
    {
        let mut stale = false;
        for (file, modified) in observations {
            let slot = self.seen.entry(file.to_path_buf()).or_default().slot(generation);
            match *slot {
                Some(previous) if previous >= modified => {}
                _ => {
                    trace!("{} changed for {generation} generation", file.display());
                    *slot = Some(modified);
                    stale = true;
                }
            }
        }
        stale
    }

    /// Stored time for `file` at `generation`, if it has been observed.
    #[must_use]
    pub fn last_seen(&self, generation: Generation, file: &Path) -> Option<SystemTime> {
        self.seen.get(file).and_then(|times| times.get(generation))
    }

    /// Number of files tracked in any generation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// `true` if no file has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn modification_time(file: &Path) -> SystemTime {
    std::fs::metadata(file).and_then(|meta| meta.modified()).unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Mutable resolution state owned by one library.
///
/// Held behind a mutex inside [`LibraryRecord`](crate::library::LibraryRecord);
/// see [`DependencyResolver`](crate::resolver::DependencyResolver) for how it
/// is used.
#[derive(Default)]
pub struct ResolutionCache {
    /// Timestamps for both generations.
    pub staleness: StalenessCache,
    /// Memoized direct-dependency list.
    pub direct: Option<Vec<Selection>>,
    /// Memoized transitive closure.
    pub transitive: Option<Vec<Selection>>,
}
