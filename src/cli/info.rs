//! Show the metadata of one library folder.

use super::OutputFormat;
use crate::config::GlobalConfig;
use crate::library::{LibraryRecord, PropertiesFileLoader};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

/// Load a library and print its metadata.
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Library folder containing library.properties
    #[arg(value_name = "DIR")]
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl InfoCommand {
    pub fn execute(self, config: &GlobalConfig) -> Result<ExitCode> {
        let record = LibraryRecord::load_with(&self.path, &PropertiesFileLoader, config.load_options())?;

        match self.format {
            OutputFormat::Text => println!("{record}"),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record.summary())?),
        }
        Ok(ExitCode::SUCCESS)
    }
}
