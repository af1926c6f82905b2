//! Global constants used throughout the libresolve codebase.
//!
//! Metadata keys, the category whitelist, folder names and defaults live here
//! so the loader, the scanner and the CLI agree on them.

/// Name of the metadata file at the root of every library folder.
pub const PROPERTIES_FILE: &str = "library.properties";

/// Properties every library must declare, in the order they are checked.
pub const MANDATORY_PROPERTIES: &[&str] =
    &["name", "version", "author", "maintainer", "sentence", "paragraph", "url"];

/// Categories a library may declare. Anything else becomes [`UNCATEGORIZED`].
pub const CATEGORIES: &[&str] = &[
    "Display",
    "Communication",
    "Signal Input/Output",
    "Sensors",
    "Device Control",
    "Timing",
    "Data Storage",
    "Data Processing",
    "Other",
    "Uncategorized",
];

/// Fallback category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// License used when none is declared.
pub const DEFAULT_LICENSE: &str = "Unspecified";

/// Architecture wildcard meaning "any".
pub const ANY_ARCHITECTURE: &str = "*";

/// Type tag used when a library declares none.
pub const DEFAULT_TYPE: &str = "Contributed";

/// Folder holding sources for the recursive layout.
pub const SRC_FOLDER: &str = "src";

/// Legacy helper folder of the flat layout.
pub const UTILITY_FOLDER: &str = "utility";

/// Legacy per-architecture folder that is no longer supported.
pub const ARCH_FOLDER: &str = "arch";

/// Source-control folders that are expected inside a library and never warned about.
pub const SCCS_FOLDERS: &[&str] = &["CVS", "RCS", ".git", ".svn", ".hg", ".bzr", "SCCS"];

/// Extensions counted as source files when none are configured.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] =
    &["c", "cpp", "cc", "cxx", "h", "hh", "hpp", "S", "ino"];

/// Extensions of header files a library can provide to its users.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp"];
