//! Stress test suite for libresolve
//!
//! Large library graphs written to disk and resolved end to end. These tests
//! take noticeably longer than the integration suite and are not run in CI.
//!
//! # Running Stress Tests
//!
//! ```bash
//! cargo test --test stress
//! cargo test --test stress -- --nocapture   # show timings
//! cargo test --test stress --release
//! ```
//!
//! Timings are printed for manual review rather than asserted. Every test
//! works in its own temporary directory, so the suite is parallel-safe.
//!
//! # Test Organization
//!
//! - **graph_shapes**: Deep chains, wide fan-out, dense cyclic meshes and
//!   concurrent queries over a shared index


use anyhow::Result;
use libresolve_cli::library::{LibraryIndex, LoadOptions, PropertiesFileLoader};
use libresolve_cli::resolver::DependencyResolver;
use libresolve_cli::scanner::IncludeScanner;
use libresolve_cli::test_utils::LibraryFixture;
use std::path::Path;
use std::sync::Arc;

/// Library `L{i}` providing `L{i}.h` and including the headers of `edges`.
pub fn node(i: usize, edges: &[usize]) -> LibraryFixture {
    let headers: Vec<String> = edges.iter().map(|e| format!("L{e}.h")).collect();
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    LibraryFixture::new(&format!("L{i}"))
        .header(&format!("L{i}.h"))
        .source(&format!("L{i}.cpp"), &headers)
}

/// Global name of node `i`.
pub fn gn(i: usize) -> String {
    format!("org.test.l{i}")
}

/// Index `folder` and build a resolver over it.
pub fn load(folder: &Path) -> Result<(Arc<LibraryIndex>, DependencyResolver<IncludeScanner>)> {
    let options = LoadOptions {
        warn_guessed_global_names: false,
    };
    let index = Arc::new(LibraryIndex::load(&[folder.to_path_buf()], &PropertiesFileLoader, options)?);
    let resolver = DependencyResolver::new(IncludeScanner::new(Arc::clone(&index))?);
    Ok((index, resolver))
}
