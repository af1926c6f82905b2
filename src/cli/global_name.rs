//! Show the global name a library declares or would be given.

use super::OutputFormat;
use crate::library::global_name;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct GlobalNameCommand {
    /// Library name
    #[arg(long)]
    name: String,

    /// Library author
    #[arg(long)]
    author: String,

    /// Library website URL
    #[arg(long)]
    website: Option<String>,

    /// Declared global_name, if any
    #[arg(long)]
    declared: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl GlobalNameCommand {
    pub fn execute(self) -> Result<ExitCode> {
        let resolved = global_name::resolve(
            self.declared.as_deref().map(str::trim),
            self.website.as_deref(),
            &self.author,
            &self.name,
        );

        match self.format {
            OutputFormat::Text if resolved.guessed => {
                println!("{} {}", resolved.name, "(guessed)".yellow());
            }
            OutputFormat::Text => println!("{}", resolved.name),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "global_name": resolved.name,
                    "guessed": resolved.guessed,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
