//! libresolve CLI entry point
//!
//! Parses the command line, runs the command and renders errors with
//! suggestions. Commands:
//! - `info` - Show the metadata of a library folder
//! - `global-name` - Show the global name a library would get
//! - `matches` - Check a version against a dependency spec
//! - `deps` - List direct or transitive dependencies

use clap::Parser;
use libresolve_cli::cli;
use libresolve_cli::core::error::user_friendly_error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            ExitCode::FAILURE
        }
    }
}
