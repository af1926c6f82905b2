//! Command-line interface for libresolve.
//!
//! # Available Commands
//!
//! - `info` - Load one library folder and show its metadata
//! - `global-name` - Show the global name a library would get
//! - `matches` - Check a version against a dependency spec
//! - `deps` - List the direct or transitive dependencies of a library
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress everything except errors
//! - `--config` - Path to a custom config file (also `LIBRESOLVE_CONFIG`)
//! - `--library-path` - Extra library folder, may be repeated
//!
//! # Example
//!
//! ```bash
//! libresolve -L ~/Arduino/libraries deps ~/Arduino/libraries/MyLib --transitive
//! libresolve matches 'org.acme.servo:1.0-2.0' 1.5
//! ```

mod deps;
mod global_name;
mod info;
mod matches;


use crate::config::GlobalConfig;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Runtime configuration for CLI execution.
///
/// Holds what the global flags contribute, so tests and programmatic callers
/// can set it up without parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: Option<String>,

    /// Config file overriding the default location.
    pub config_path: Option<PathBuf>,

    /// Library folders searched after the configured ones.
    pub library_paths: Vec<PathBuf>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the `tracing` subscriber writing to stderr.
    ///
    /// An explicit `RUST_LOG` always wins over [`log_level`](Self::log_level).
    /// Only the first call in a process has an effect.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("warn"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the global configuration and append the extra library folders.
    ///
    /// # Errors
    ///
    /// Fails when the config file exists but cannot be read or parsed.
    pub fn load_global_config(&self) -> Result<GlobalConfig> {
        let mut config = GlobalConfig::load_with_optional(self.config_path.clone())?;
        config.library_paths.extend(self.library_paths.iter().cloned());
        Ok(config)
    }
}

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Resolve library identities and dependencies.
#[derive(Parser)]
#[command(
    name = "libresolve",
    about = "Resolve library identities, version constraints and dependency closures",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom config file
    #[arg(short, long, global = true, env = "LIBRESOLVE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra folder containing libraries (repeatable)
    #[arg(short = 'L', long = "library-path", global = true, value_name = "DIR")]
    library_paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the metadata of one library folder
    Info(info::InfoCommand),

    /// Show the global name a library declares or would be given
    GlobalName(global_name::GlobalNameCommand),

    /// Check whether a version satisfies a dependency spec (exit status 1 if not)
    Matches(matches::MatchesCommand),

    /// List the libraries a library depends on
    Deps(deps::DepsCommand),
}

impl Cli {
    /// Execute the CLI with the configuration built from its flags.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to report.
    pub fn execute(self) -> Result<ExitCode> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            library_paths: self.library_paths.clone(),
        }
    }

    /// Execute with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to report.
    pub fn execute_with_config(self, config: CliConfig) -> Result<ExitCode> {
        config.init_logging();

        match self.command {
            Commands::Info(cmd) => cmd.execute(&config.load_global_config()?),
            Commands::GlobalName(cmd) => cmd.execute(),
            Commands::Matches(cmd) => cmd.execute(),
            Commands::Deps(cmd) => cmd.execute(&config.load_global_config()?),
        }
    }
}
