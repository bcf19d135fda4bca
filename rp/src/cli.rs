//! CLI argument parsing for replan

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about = "Goal plan refinement engine", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a goal and review the comparison variants
    Plan {
        /// Free-text business goal
        #[arg(short, long, required = true)]
        goal: String,

        /// Horizon unit: weeks or months
        #[arg(long, default_value = "weeks")]
        unit: String,

        /// Horizon value (clamped to 1-60)
        #[arg(long, default_value_t = 12)]
        horizon: u32,

        /// Cost objective weight (clamped to 0-1)
        #[arg(long, default_value_t = 0.5)]
        cost: f64,

        /// Service-level objective weight (clamped to 0-1)
        #[arg(long, default_value_t = 0.4)]
        service: f64,

        /// Carbon objective weight (clamped to 0-1)
        #[arg(long, default_value_t = 0.1)]
        carbon: f64,

        /// Business-unit identifier
        #[arg(long, default_value = "default")]
        business_unit: String,

        /// Market identifiers (repeatable)
        #[arg(short, long)]
        market: Vec<String>,

        /// Adopt one variant after review: cost, service, or carbon
        #[arg(long)]
        select: Option<String>,

        /// Save the resulting plan under this version label
        #[arg(long)]
        save: Option<String>,
    },

    /// Extract an approximate plan from a narrative report file
    Extract {
        /// Path to the report text
        #[arg(required = true)]
        file: PathBuf,

        /// Emit the raw extraction result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage saved plan versions
    Versions {
        #[command(subcommand)]
        command: VersionsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum VersionsCommand {
    /// List saved versions, most recent first
    List,

    /// Print a saved version's plan snapshot
    Restore {
        /// Version id to restore
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
