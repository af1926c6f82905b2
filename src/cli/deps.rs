//! List the libraries a library depends on.

use super::OutputFormat;
use crate::config::GlobalConfig;
use crate::core::LibraryError;
use crate::library::{LibraryIndex, LibraryRecord, PropertiesFileLoader};
use crate::resolver::DependencyResolver;
use crate::scanner::IncludeScanner;
use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Library folder, or global name of an installed library
    #[arg(value_name = "LIBRARY")]
    pub library: String,

    /// Include dependencies of dependencies
    #[arg(long)]
    pub transitive: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl DepsCommand {
    pub fn execute(self, config: &GlobalConfig) -> Result<ExitCode> {
        let options = config.load_options();
        let index = LibraryIndex::load(&config.library_paths, &PropertiesFileLoader, options)?;
        debug!("Indexed {} libraries", index.len());

        let folder = Path::new(&self.library);
        let (index, target) = if folder.is_dir() {
            let record = LibraryRecord::load_with(folder, &PropertiesFileLoader, options)?;
            index.including(record)
        } else {
            let found = index.find(&self.library).cloned().ok_or_else(|| LibraryError::LibraryNotFound {
                name: self.library.clone(),
            })?;
            (index, found)
        };

        let scanner = IncludeScanner::new(Arc::new(index))?.with_extensions(config.source_extensions.iter().cloned());
        let resolver = DependencyResolver::new(scanner);

        let selections = if self.transitive {
            resolver.transitive_dependencies(&target)
        } else {
            resolver.direct_dependencies(&target)
        }
        .with_context(|| format!("Failed to resolve dependencies of {}", target.global_name()))?;

        match self.format {
            OutputFormat::Text if selections.is_empty() => {
                println!("{} has no dependencies", target.global_name());
            }
            OutputFormat::Text => {
                for selection in &selections {
                    println!("{selection}");
                }
            }
            OutputFormat::Json => {
                let views: Vec<_> = selections.iter().map(|s| s.view()).collect();
                let json = serde_json::json!({
                    "library": target.global_name(),
                    "transitive": self.transitive,
                    "dependencies": views,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
