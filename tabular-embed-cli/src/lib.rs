//! # Tabular Embed CLI
//!
//! This library provides basic functionality for the tabular embed CLI.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, reason = "Dependencies")]

pub mod commands;
mod config;

use anyhow::{Context, Result};
use argh::FromArgs;
use commands::Command;
pub use config::{Config, parse_config};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Configuration file looked up when none is given.
pub const DEFAULT_CONFIG: &str = "embed.toml";

/// 🧮 Append sentence embeddings to tabular data.
#[derive(FromArgs, Debug)]
#[argh(help_triggers("-h", "--help"))]
pub struct Args {
    /// path to the configuration file (default: embed.toml, if present)
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,
    /// the command to execute.
    #[argh(subcommand)]
    pub command: Command,
}

/// Load the configuration file given on the command line, or the default one if present.
///
/// # Errors
///
/// Returns an error if an explicitly given file cannot be read, or if any file fails to parse.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG), false),
    };
    if !explicit && !path.exists() {
        debug!("No {DEFAULT_CONFIG} found, using defaults");
        return Ok(Config::default());
    }

    parse_config(path).with_context(|| format!("Failed to parse config file `{}`", path.display()))
}

/// Execute the command.
///
/// # Errors
///
/// Returns an error naming the failed stage if loading the model, reading, embedding or writing fails.
#[allow(clippy::future_not_send, reason = "Main function")]
pub async fn execute(command: Command, config: Config) -> Result<()> {
    debug!("Executing command: {:?}", command);
    debug!("Config: {:?}", config);

    match command {
        Command::Embed(embed) => {
            info!("Embedding table...");
            let summary = embed.execute(config).await?;
            info!("Embedding complete!");
            if summary.skipped > 0 {
                info!(
                    "Summary: {} of {} row(s) embedded, {} row(s) without text dropped. 📝",
                    summary.embedded, summary.read, summary.skipped
                );
            } else {
                info!("Summary: {} row(s) embedded. ☕", summary.embedded);
            }
        }
        Command::Models(models) => {
            for line in models.execute() {
                println!("{line}");
            }
        }
    };

    Ok(())
}
