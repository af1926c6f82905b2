//! Error handling for libresolve
//!
//! This module provides the error types and user-facing error reporting used by
//! the library identity and dependency-resolution engine. It follows two rules:
//! 1. **Strongly-typed errors** so callers can react to specific failure modes
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Configuration**: problems with a single library's metadata or folder
//!   layout, such as [`LibraryError::MissingProperty`] or
//!   [`LibraryError::ConflictingLayout`]. Fatal to constructing that one
//!   library, never to the resolution of unrelated libraries.
//! - **Parse**: [`LibraryError::InvalidVersion`] is raised when a version
//!   string used in a comparison has a non-numeric component. Fatal to the
//!   single comparison being attempted.
//! - **Lookup**: [`LibraryError::LibraryNotFound`] for CLI lookups.
//!
//! Diagnostic warnings (guessed global names, coerced categories, spurious
//! folders) are not errors; they are emitted through `tracing::warn!` and
//! processing continues. Dependency cycles are not errors either.
//!
//! # Examples
//!
//! ```rust,no_run
//! use libresolve_cli::core::{LibraryError, ErrorContext};
//!
//! let error = LibraryError::MissingProperty {
//!     key: "version".to_string(),
//!     library: "/libs/Servo".to_string(),
//! };
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Add a 'version=' line to library.properties");
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for libresolve operations.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// A mandatory `library.properties` key is absent.
    #[error("Missing '{key}' from library in {library}")]
    MissingProperty {
        /// The missing property key
        key: String,
        /// Library folder the metadata was loaded from
        library: String,
    },

    /// The library still ships the legacy `arch` folder.
    #[error("'arch' folder is no longer supported in library {path}")]
    UnsupportedArchFolder {
        /// Library folder containing the `arch` directory
        path: String,
    },

    /// The library has both a `src` and a `utility` folder.
    #[error("Library can't use both 'src' and 'utility' folders: {path}")]
    ConflictingLayout {
        /// Library folder with the conflicting layout
        path: String,
    },

    /// No metadata file was found for a library folder.
    #[error("No library.properties found in {path}")]
    MetadataNotFound {
        /// Library folder that was inspected
        path: String,
    },

    /// The metadata file contains a malformed line.
    #[error("Invalid metadata in {file} at line {line}: {reason}")]
    MetadataParseError {
        /// Path to the metadata file
        file: String,
        /// One-based line number of the malformed line
        line: usize,
        /// Why the line was rejected
        reason: String,
    },

    /// A version string has a component that is not a non-negative integer.
    #[error("Invalid version '{version}': component '{component}' is not numeric")]
    InvalidVersion {
        /// The full version string being parsed
        version: String,
        /// The offending dot-separated component
        component: String,
    },

    /// A requested library is not present in the index.
    #[error("Library '{name}' not found")]
    LibraryNotFound {
        /// Name or identifier that was looked up
        name: String,
    },

    /// Global configuration could not be used.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// I/O error from the standard library.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error from the global configuration file.
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Catch-all for failures that have no dedicated variant.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl LibraryError {
    /// Returns `true` for errors that only invalidate a single library's
    /// construction and must not abort resolution of other libraries.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingProperty { .. }
                | Self::UnsupportedArchFolder { .. }
                | Self::ConflictingLayout { .. }
                | Self::MetadataNotFound { .. }
                | Self::MetadataParseError { .. }
        )
    }

    /// Best-effort copy used when rendering errors that were only borrowed.
    ///
    /// Foreign error payloads (`io`, `toml`) are flattened into [`LibraryError::Other`].
    fn duplicate(&self) -> Self {
        match self {
            Self::MissingProperty {
                key,
                library,
            } => Self::MissingProperty {
                key: key.clone(),
                library: library.clone(),
            },
            Self::UnsupportedArchFolder {
                path,
            } => Self::UnsupportedArchFolder {
                path: path.clone(),
            },
            Self::ConflictingLayout {
                path,
            } => Self::ConflictingLayout {
                path: path.clone(),
            },
            Self::MetadataNotFound {
                path,
            } => Self::MetadataNotFound {
                path: path.clone(),
            },
            Self::MetadataParseError {
                file,
                line,
                reason,
            } => Self::MetadataParseError {
                file: file.clone(),
                line: *line,
                reason: reason.clone(),
            },
            Self::InvalidVersion {
                version,
                component,
            } => Self::InvalidVersion {
                version: version.clone(),
                component: component.clone(),
            },
            Self::LibraryNotFound {
                name,
            } => Self::LibraryNotFound {
                name: name.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LibraryError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: LibraryError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// The whole `anyhow` chain is searched, so a [`LibraryError`] wrapped in
/// `.with_context(...)` is still recognized.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(lib_error) = cause.downcast_ref::<LibraryError>() {
            return create_error_context(lib_error);
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(LibraryError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the library folders");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(LibraryError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LibraryError::Other {
        message,
    })
}

/// Suggestions are chosen from the borrowed error, since [`LibraryError::duplicate`]
/// flattens the foreign-error variants.
fn create_error_context(source: &LibraryError) -> ErrorContext {
    let error = source.duplicate();
    match source {
        LibraryError::MissingProperty {
            key, ..
        } => {
            let suggestion = format!("Add a '{key}=' line to the library's library.properties");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Required keys: name, version, author, maintainer, sentence, paragraph, url")
        }
        LibraryError::UnsupportedArchFolder {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Move the sources into a 'src' folder and declare 'architectures=' in library.properties"),
        LibraryError::ConflictingLayout {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Move the contents of 'utility' into 'src'; the 'src' layout is compiled recursively"),
        LibraryError::MetadataNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Point the command at a folder containing library.properties"),
        LibraryError::MetadataParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Every non-comment line must have the form 'key=value'"),
        LibraryError::InvalidVersion {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Versions must be dot-separated non-negative integers, e.g. 1.2.3")
            .with_details("Range ('1.0-2.0') and at-least ('1.5+') constraints compare versions numerically"),
        LibraryError::LibraryNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add the folder that contains it with --library-path or 'library_paths' in the config file"),
        LibraryError::ConfigError {
            ..
        }
        | LibraryError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion("Check the syntax of ~/.libresolve/config.toml (or the file named by LIBRESOLVE_CONFIG)"),
        LibraryError::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            ErrorContext::new(error).with_suggestion("Check file ownership and permissions of the library folders")
        }
        LibraryError::IoError(_) => ErrorContext::new(error)
            .with_suggestion("Check that the file or directory exists and the path is correct"),
        _ => ErrorContext::new(error),
    }
}
