//! Test utilities for libresolve
//!
//! Helpers shared by unit, integration and stress tests:
//! - [`init_test_logging`] wires `tracing` output into the test harness
//! - [`capture_logs`] records what a closure logs, for asserting on warnings
//! - [`LibraryFixture`] writes library folders with metadata and sources
//! - [`touch`] moves a file's modification time strictly forward
//!
//! # Example
//!
//! ```rust,no_run
//! use libresolve_cli::test_utils::{LibraryFixture, touch};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let root = LibraryFixture::new("Servo")
//!     .header("Servo.h")
//!     .source("Servo.cpp", &["Servo.h"])
//!     .write(temp.path())
//!     .unwrap();
//! touch(&root.join("Servo.cpp")).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::LibraryFixture;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, Once, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Seconds added by the next [`touch`]
static TOUCH_OFFSET: AtomicU64 = AtomicU64::new(60);

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests stay silent.
///
/// ```bash
/// RUST_LOG=libresolve_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// In-memory log sink shared between the subscriber and the caller.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a debug-level subscriber on this thread and return its
/// result together with everything it logged, without ANSI colors.
///
/// ```rust,no_run
/// use libresolve_cli::test_utils::capture_logs;
///
/// let ((), logs) = capture_logs(|| tracing::warn!("careful"));
/// assert!(logs.contains("WARN") && logs.contains("careful"));
/// ```
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = buffer.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
    (result, String::from_utf8_lossy(&logs).into_owned())
}

/// Set `path`'s modification time later than any earlier `touch` in this
/// process and later than the current time.
///
/// Filesystem timestamp granularity makes rewriting a file unreliable for
/// change detection in fast tests; this sidesteps it.
pub fn touch(path: &Path) -> Result<()> {
    let offset = TOUCH_OFFSET.fetch_add(60, Ordering::SeqCst);
    let when = SystemTime::now() + Duration::from_secs(offset);
    std::fs::File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(when))
        .with_context(|| format!("Failed to touch {}", path.display()))
}
