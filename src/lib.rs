//! libresolve - library identity and dependency resolution
//!
//! Given a folder of installed C/C++ libraries, each described by a
//! `library.properties` file, libresolve works out:
//!
//! - a globally unique identifier for every library, guessed from its website
//!   when the library does not declare one,
//! - whether a library's version satisfies a dependency spec such as
//!   `org.acme.servo:1.0-2.0`,
//! - which libraries a library uses, directly and transitively, without
//!   looping on dependency cycles,
//!
//! and caches the expensive parts until a source file actually changes.
//!
//! # Core Modules
//!
//! - [`library`] - Library records, metadata loading, global names and the index
//! - [`version`] - Version vectors and the dependency spec grammar
//! - [`scanner`] - Source scanning seam and the `#include` scanner
//! - [`resolver`] - Direct and transitive dependency resolution
//! - [`cache`] - Per-library staleness tracking and memoized results
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Global configuration (`~/.libresolve/config.toml`)
//! - [`core`] - Error types and user-facing error rendering
//! - [`constants`] - Shared names, defaults and whitelists
//!
//! # Dependency Spec Grammar
//!
//! | Spec              | Matches                                   |
//! |-------------------|-------------------------------------------|
//! | `id`              | any version, including none               |
//! | `id:1.0-2.0`      | `1.0 <= v <= 2.0`                         |
//! | `id:1.5+`         | `v >= 1.5`                                |
//! | `id:1.*`          | versions whose text starts with `1.`      |
//! | `id:1.2.3`        | exactly `1.2.3`                           |
//!
//! # Example
//!
//! ```rust,no_run
//! use libresolve_cli::library::{LibraryIndex, LoadOptions, PropertiesFileLoader};
//! use libresolve_cli::resolver::DependencyResolver;
//! use libresolve_cli::scanner::IncludeScanner;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let paths = vec![PathBuf::from("/home/me/Arduino/libraries")];
//! let index = Arc::new(LibraryIndex::load(&paths, &PropertiesFileLoader, LoadOptions::default())?);
//! let resolver = DependencyResolver::new(IncludeScanner::new(Arc::clone(&index))?);
//!
//! if let Some(servo) = index.find("cc.arduino.servo") {
//!     for selection in resolver.transitive_dependencies(servo)? {
//!         println!("{selection}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cache;
pub mod library;
pub mod resolver;
pub mod scanner;
pub mod version;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
