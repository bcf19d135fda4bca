use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use versionstore::cli::{Cli, Command};
use versionstore::config::Config;
use versionstore::{SavedVersion, Scope, VersionStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn format_saved_at(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let scope = Scope::new(
        cli.tenant.unwrap_or(config.tenant),
        cli.persona.unwrap_or(config.persona),
    );

    info!("versionstore starting");

    let store = VersionStore::open(&config.store_path)?;

    match cli.command {
        Command::List => {
            let versions: Vec<SavedVersion<serde_json::Value>> = store.list(&scope)?;
            if versions.is_empty() {
                println!("No saved versions for {}/{}", scope.tenant.cyan(), scope.persona.cyan());
            }
            for v in versions {
                let label = v.label.as_deref().unwrap_or("-");
                println!(
                    "{}  {}  {}  {}",
                    v.id.cyan(),
                    format_saved_at(v.saved_at).dimmed(),
                    label.yellow(),
                    v.summary
                );
            }
        }
        Command::Show { id } => {
            let version: SavedVersion<serde_json::Value> = store.restore(&scope, &id)?;
            println!("{}", serde_json::to_string_pretty(&version)?);
        }
        Command::Delete { id } => {
            store.delete(&scope, &id)?;
            println!("{} Deleted version: {}", "✓".green(), id.cyan());
        }
    }

    Ok(())
}
