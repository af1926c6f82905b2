//! Configuration management for libresolve.
//!
//! There is a single, user-wide configuration file; see [`global`] for its
//! location and keys. Command-line flags layered on top of it are handled by
//! [`crate::cli`].

pub mod global;

pub use global::GlobalConfig;
