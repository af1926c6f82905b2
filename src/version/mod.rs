//! Version parsing and ordering for library versions.
//!
//! Library versions are plain dot-separated lists of non-negative integers
//! (`"1"`, `"1.2"`, `"1.2.10"`). They are not semantic versions: there are no
//! pre-release or build-metadata parts, and vectors of different length are
//! never padded. Ordering is lexicographic over the numeric components, so a
//! vector that is a strict prefix of another sorts before it:
//!
//! ```text
//! 1.2  <  1.2.0  <  1.2.1  <  1.10
//! ```
//!
//! Any component that is not a non-negative integer is a parse error
//! ([`LibraryError::InvalidVersion`]); it is never coerced to zero.
//!
//! # Examples
//!
//! ```rust
//! use libresolve_cli::version::{VersionVector, compare};
//! use std::cmp::Ordering;
//!
//! # fn example() -> Result<(), libresolve_cli::core::LibraryError> {
//! assert_eq!(compare("1.2", "1.2.0")?, Ordering::Less);
//! assert_eq!(compare("1.10", "1.9")?, Ordering::Greater);
//! assert!(VersionVector::parse("1.x").is_err());
//! # Ok(())
//! # }
//! ```

pub mod constraints;

pub use constraints::{DependencySpec, Identified, VersionConstraint};

use crate::core::LibraryError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed dot-separated numeric version.
///
/// The derived ordering over the component vector is exactly the library
/// version ordering: component-wise numeric comparison, with a strict prefix
/// ordered first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionVector {
    components: Vec<u64>,
}

impl VersionVector {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidVersion`] naming the first component that
    /// is empty or contains anything other than ASCII digits.
    pub fn parse(version: &str) -> Result<Self, LibraryError> {
        let components = version
            .split('.')
            .map(|component| {
                if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid(version, component));
                }
                component.parse::<u64>().map_err(|_| invalid(version, component))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            components,
        })
    }

    /// The numeric components in order.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

fn invalid(version: &str, component: &str) -> LibraryError {
    LibraryError::InvalidVersion {
        version: version.to_string(),
        component: component.to_string(),
    }
}

impl FromStr for VersionVector {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.components.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
        f.write_str(&joined)
    }
}

/// Compare two version strings.
///
/// # Errors
///
/// Returns [`LibraryError::InvalidVersion`] if either string fails to parse.
pub fn compare(v1: &str, v2: &str) -> Result<Ordering, LibraryError> {
    Ok(VersionVector::parse(v1)?.cmp(&VersionVector::parse(v2)?))
}

/// Returns `true` when `lower <= upper` under the version ordering.
///
/// # Errors
///
/// Returns [`LibraryError::InvalidVersion`] if either string fails to parse.
pub fn versions_ordered(lower: &str, upper: &str) -> Result<bool, LibraryError> {
    Ok(compare(lower, upper)? != Ordering::Greater)
}
