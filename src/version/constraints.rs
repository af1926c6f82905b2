//! Dependency specs and version constraints.
//!
//! A dependency spec names a wanted library by its global identifier and an
//! optional version constraint: `identifier[:constraint]`. The constraint
//! grammar is small:
//!
//! | Constraint  | Meaning                                              |
//! |-------------|------------------------------------------------------|
//! | *(absent)*  | any version (the library only needs to exist)        |
//! | `A-B`       | `A <= v <= B` (exactly one hyphen, both sides set)   |
//! | `A+`        | `v >= A`                                             |
//! | `A*`        | textual prefix match: `v` starts with `A`            |
//! | anything    | exact string equality                                |
//!
//! Parsing a spec never fails. Version strings are only interpreted when a
//! constraint is evaluated, so a malformed bound in a range or at-least
//! constraint surfaces as [`LibraryError::InvalidVersion`] from
//! [`DependencySpec::matches_version`].
//!
//! ```rust
//! use libresolve_cli::version::{DependencySpec, VersionConstraint};
//!
//! let spec = DependencySpec::parse("io.github.jane.foo:1.0-2.0");
//! assert_eq!(spec.identifier(), "io.github.jane.foo");
//! assert!(matches!(spec.constraint(), VersionConstraint::Range { .. }));
//! assert!(spec.version_matches(Some("1.5")).unwrap());
//! assert!(!spec.version_matches(Some("2.1")).unwrap());
//! ```

use super::versions_ordered;
use crate::core::LibraryError;
use serde::Serialize;
use std::fmt;

/// Anything with a global identifier and an optional version that specs can be
/// matched against.
pub trait Identified {
    /// The canonical dependency identifier.
    fn identifier(&self) -> &str;

    /// The declared version, if any.
    fn version(&self) -> Option<&str>;
}

/// The classified form of a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionConstraint {
    /// No constraint; every version matches.
    Any,
    /// Inclusive numeric range.
    Range {
        /// Lower bound
        low: String,
        /// Upper bound
        high: String,
    },
    /// Numeric lower bound (`1.5+`).
    AtLeast {
        /// Minimum version
        min: String,
    },
    /// Textual prefix (`1.*`).
    Prefix {
        /// Required leading text
        prefix: String,
    },
    /// Exact textual version.
    Exact {
        /// The version string
        version: String,
    },
}

impl VersionConstraint {
    /// Classify constraint text. Empty text means [`VersionConstraint::Any`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Any;
        }

        let mut bounds = text.split('-');
        if let (Some(low), Some(high), None) = (bounds.next(), bounds.next(), bounds.next())
            && !low.is_empty()
            && !high.is_empty()
        {
            return Self::Range {
                low: low.to_string(),
                high: high.to_string(),
            };
        }

        if let Some(min) = text.strip_suffix('+') {
            Self::AtLeast {
                min: min.to_string(),
            }
        } else if let Some(prefix) = text.strip_suffix('*') {
            Self::Prefix {
                prefix: prefix.to_string(),
            }
        } else {
            Self::Exact {
                version: text.to_string(),
            }
        }
    }

    /// Evaluate the constraint against a declared version.
    ///
    /// A missing version only satisfies [`VersionConstraint::Any`].
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidVersion`] when a numeric comparison meets
    /// a malformed version on either side.
    pub fn matches(&self, version: Option<&str>) -> Result<bool, LibraryError> {
        let Some(version) = version else {
            return Ok(matches!(self, Self::Any));
        };

        match self {
            Self::Any => Ok(true),
            Self::Range {
                low,
                high,
            } => Ok(versions_ordered(low, version)? && versions_ordered(version, high)?),
            Self::AtLeast {
                min,
            } => versions_ordered(min, version),
            Self::Prefix {
                prefix,
            } => Ok(version.starts_with(prefix.as_str())),
            Self::Exact {
                version: wanted,
            } => Ok(wanted == version),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::Range {
                low,
                high,
            } => write!(f, "{low}-{high}"),
            Self::AtLeast {
                min,
            } => write!(f, "{min}+"),
            Self::Prefix {
                prefix,
            } => write!(f, "{prefix}*"),
            Self::Exact {
                version,
            } => f.write_str(version),
        }
    }
}

/// A textual reference to a wanted library: `identifier[:constraint]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySpec {
    identifier: String,
    constraint: VersionConstraint,
}

impl DependencySpec {
    /// Parse spec text. Never fails; see the module docs for the grammar.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (identifier, constraint) = match text.split_once(':') {
            Some((identifier, constraint)) => (identifier, VersionConstraint::parse(constraint)),
            None => (text, VersionConstraint::Any),
        };

        Self {
            identifier: identifier.trim().to_string(),
            constraint,
        }
    }

    /// A spec for `identifier` accepting any version.
    #[must_use]
    pub fn any(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            constraint: VersionConstraint::Any,
        }
    }

    /// The identifier portion.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The classified constraint.
    #[must_use]
    pub const fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    /// Compare only the identifier portion against a library.
    pub fn matches_identifier<T: Identified + ?Sized>(&self, library: &T) -> bool {
        self.identifier == library.identifier()
    }

    /// Apply the version constraint to a library's declared version.
    ///
    /// # Errors
    ///
    /// Propagates [`LibraryError::InvalidVersion`] from numeric comparisons.
    pub fn matches_version<T: Identified + ?Sized>(&self, library: &T) -> Result<bool, LibraryError> {
        self.constraint.matches(library.version())
    }

    /// Apply the version constraint to a bare version string.
    ///
    /// # Errors
    ///
    /// Propagates [`LibraryError::InvalidVersion`] from numeric comparisons.
    pub fn version_matches(&self, version: Option<&str>) -> Result<bool, LibraryError> {
        self.constraint.matches(version)
    }

    /// Identifier and version constraint both match.
    ///
    /// # Errors
    ///
    /// Propagates [`LibraryError::InvalidVersion`] from numeric comparisons.
    /// The version is not inspected when the identifier differs.
    pub fn matches<T: Identified + ?Sized>(&self, library: &T) -> Result<bool, LibraryError> {
        Ok(self.matches_identifier(library) && self.matches_version(library)?)
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            VersionConstraint::Any => f.write_str(&self.identifier),
            ref constraint => write!(f, "{}:{}", self.identifier, constraint),
        }
    }
}
