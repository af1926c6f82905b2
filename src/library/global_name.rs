//! Canonical library identifiers.
//!
//! Every library is identified by a *global name*, a Java-package-style string
//! such as `io.github.jane.foo`. It is the equality and hash key of a
//! [`LibraryRecord`](super::LibraryRecord) and the node key of the dependency
//! graph, so it must always be non-empty.
//!
//! Libraries should declare `global_name=` in their metadata. When they do
//! not, [`resolve`] guesses one from the website URL, and as a last resort
//! from the author and name. Guessed names are unstable across forks, so the
//! caller is expected to warn about them.
//!
//! ```rust
//! use libresolve_cli::library::global_name::resolve;
//!
//! let resolved = resolve(None, Some("http://example.com/libs/foo.git"), "Jane", "Foo");
//! assert_eq!(resolved.name.as_str(), "com.example.libs.foo");
//! assert!(resolved.guessed);
//!
//! let resolved = resolve(None, Some("https://github.com/jane/foo"), "Jane", "Foo");
//! assert_eq!(resolved.name.as_str(), "io.github.jane.foo");
//! ```

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

/// An interned-once library identifier with a precomputed hash.
///
/// The hash is computed at construction and never again; equality still
/// compares the full string.
#[derive(Clone)]
pub struct GlobalName {
    value: String,
    hash: u64,
}

impl GlobalName {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            value,
        }
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl PartialEq for GlobalName {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.value == other.value
    }
}

impl Eq for GlobalName {}

impl Hash for GlobalName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for GlobalName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GlobalName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Debug for GlobalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalName({:?})", self.value)
    }
}

impl fmt::Display for GlobalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for GlobalName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// The identifier to use.
    pub name: GlobalName,
    /// `true` when the identifier was derived rather than declared.
    pub guessed: bool,
}

/// Determine a library's global name.
///
/// A non-empty `declared` name wins verbatim. Otherwise the name is derived
/// from `website` (see [`derive_from_website`]); if that yields nothing the
/// fallback is `author|name`, with any `|` in the author replaced by `_`.
#[must_use]
pub fn resolve(declared: Option<&str>, website: Option<&str>, author: &str, name: &str) -> ResolvedName {
    if let Some(declared) = declared.filter(|d| !d.is_empty()) {
        return ResolvedName {
            name: GlobalName::new(declared),
            guessed: false,
        };
    }

    let derived = website.map(derive_from_website).unwrap_or_default();
    let value = if derived.is_empty() {
        format!("{}|{}", author.replace('|', "_"), name)
    } else {
        derived
    };

    ResolvedName {
        name: GlobalName::new(value),
        guessed: true,
    }
}

/// Derive a reverse-domain identifier from a website URL.
///
/// The scheme (everything up to the last `://`) and a trailing extension-like
/// suffix (`.git`, `.html`, ...) are removed; the host labels are reversed,
/// a resulting trailing `www` label is dropped, and the path segments are
/// appended in order. `com.github.` is rewritten to `io.github.` so GitHub
/// projects land in the user's namespace. Returns an empty string when
/// nothing usable remains.
#[must_use]
pub fn derive_from_website(website: &str) -> String {
    let rest = match website.rfind("://") {
        Some(idx) => &website[idx + 3..],
        None => website,
    };
    let rest = strip_extension(rest);

    let mut parts = rest.split('/').filter(|segment| !segment.is_empty());
    let Some(host) = parts.next() else {
        return String::new();
    };

    let mut labels: Vec<&str> = host.split('.').collect();
    labels.reverse();
    let mut name = labels.join(".");
    if let Some(stripped) = name.strip_suffix(".www") {
        name = stripped.to_string();
    }

    for segment in parts {
        name.push('.');
        name.push_str(segment);
    }

    if let Some(rest) = name.strip_prefix("com.github.") {
        name = format!("io.github.{rest}");
    }

    name
}

/// Remove a final `.suffix` that contains neither `/` nor `.`.
fn strip_extension(text: &str) -> &str {
    match text.rfind('.') {
        Some(idx) if !text[idx + 1..].contains('/') => &text[..idx],
        _ => text,
    }
}
