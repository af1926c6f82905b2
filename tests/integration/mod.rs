//! Integration test suite for libresolve
//!
//! End-to-end tests that write real library folders to a temporary directory
//! and resolve them through the public API or the `libresolve` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The `libresolve` binary and its subcommands
//! - **resolution**: Include scanning and selection over installed libraries
//! - **staleness**: Cache invalidation when sources change on disk

mod cli;
mod resolution;
mod staleness;

use anyhow::Result;
use libresolve_cli::library::{LibraryIndex, LibraryRecord, LoadOptions, PropertiesFileLoader};
use libresolve_cli::resolver::DependencyResolver;
use libresolve_cli::scanner::{IncludeScanner, Selection};
use std::path::Path;
use std::sync::Arc;

/// Index every library below `folder`.
pub fn index_of(folder: &Path) -> Result<Arc<LibraryIndex>> {
    let index = LibraryIndex::load(&[folder.to_path_buf()], &PropertiesFileLoader, LoadOptions::default())?;
    Ok(Arc::new(index))
}

/// Resolver scanning includes through `index`.
pub fn resolver_for(index: &Arc<LibraryIndex>) -> Result<DependencyResolver<IncludeScanner>> {
    Ok(DependencyResolver::new(IncludeScanner::new(Arc::clone(index))?))
}

/// The indexed record with `global_name`.
pub fn record<'a>(index: &'a LibraryIndex, global_name: &str) -> &'a Arc<LibraryRecord> {
    index.find(global_name).unwrap_or_else(|| panic!("{global_name} is not indexed"))
}

/// Global names of `selections`, in order.
pub fn names(selections: &[Selection]) -> Vec<String> {
    selections.iter().map(|s| s.global_name().to_string()).collect()
}
