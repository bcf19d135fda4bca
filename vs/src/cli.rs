//! CLI argument parsing for versionstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vs")]
#[command(author, version, about = "Tenant/persona-scoped plan version store", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tenant to operate on (overrides config)
    #[arg(short, long)]
    pub tenant: Option<String>,

    /// Persona to operate on (overrides config)
    #[arg(short, long)]
    pub persona: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved versions, most recent first
    List,

    /// Display a saved version's payload as JSON
    Show {
        /// Version id to display
        #[arg(required = true)]
        id: String,
    },

    /// Delete a saved version (no-op if absent)
    Delete {
        /// Version id to delete
        #[arg(required = true)]
        id: String,
    },
}
