//! Core types shared across libresolve.
//!
//! Currently this is the error taxonomy and its user-facing rendering; see
//! [`error`] for details.

pub mod error;

pub use error::{ErrorContext, LibraryError, user_friendly_error};
