//! Check a version against a dependency spec.

use crate::version::DependencySpec;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::process::ExitCode;

/// Evaluate `identifier[:constraint]` against a version.
///
/// Only the constraint part is evaluated; the identifier is shown for
/// context. Exits with status 0 on a match and 1 otherwise.
#[derive(Args, Debug)]
pub struct MatchesCommand {
    /// Dependency spec, e.g. `org.acme.servo:1.0-2.0`
    spec: String,

    /// Version to check
    version: String,
}

impl MatchesCommand {
    pub fn execute(self) -> Result<ExitCode> {
        let spec = DependencySpec::parse(&self.spec);
        let version = self.version.trim();

        if spec.version_matches(Some(version))? {
            println!("{} {version} satisfies {spec}", "✓".green());
            Ok(ExitCode::SUCCESS)
        } else {
            println!("{} {version} does not satisfy {spec}", "✗".red());
            Ok(ExitCode::FAILURE)
        }
    }
}
