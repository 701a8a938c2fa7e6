//! Subcommands for the Tabular Embed CLI.

mod embed;
mod models;

use argh::FromArgs;
pub use embed::Embed;
pub use models::Models;

/// Possible commands.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum Command {
    /// An embed command.
    Embed(Embed),
    /// A models command.
    Models(Models),
}
