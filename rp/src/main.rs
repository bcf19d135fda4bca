//! Replan - goal plan refinement engine
//!
//! CLI entry point for analyzing goals, reviewing variants, and managing
//! saved plan versions.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use tracing::info;
use versionstore::{Scope, VersionStore};

use replan::cli::{Cli, Command, VersionsCommand};
use replan::config::Config;
use replan::domain::{
    BusinessContext, GoalRequest, Horizon, HorizonUnit, KpiSet, ObjectiveDimension, ObjectiveWeights, Plan, SavedPlan,
};
use replan::planner::HttpPlannerClient;
use replan::session::{RefinementSession, SessionConfig};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("replan")
        .join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Level priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some("INFO") | None => tracing::Level::INFO,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("replan.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

fn parse_unit(s: &str) -> Result<HorizonUnit> {
    match s.to_lowercase().as_str() {
        "weeks" | "week" | "w" => Ok(HorizonUnit::Weeks),
        "months" | "month" | "m" => Ok(HorizonUnit::Months),
        other => bail!("Unknown horizon unit: {} (expected weeks or months)", other),
    }
}

fn parse_dimension(s: &str) -> Result<ObjectiveDimension> {
    match s.to_lowercase().as_str() {
        "cost" => Ok(ObjectiveDimension::Cost),
        "service" | "service-level" | "service_level" => Ok(ObjectiveDimension::ServiceLevel),
        "carbon" => Ok(ObjectiveDimension::Carbon),
        other => bail!("Unknown variant dimension: {} (expected cost, service, or carbon)", other),
    }
}

fn fmt_kpi(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn print_kpi_set(label: &str, kpis: &KpiSet) {
    println!(
        "  {:<10} cost {} | revenue {} | service {} | carbon {}",
        label.dimmed(),
        fmt_kpi(kpis.cost_total),
        fmt_kpi(kpis.revenue_total),
        fmt_kpi(kpis.service_level),
        fmt_kpi(kpis.carbon),
    );
}

fn print_plan(plan: &Plan) {
    println!("{} {}", plan.id.cyan(), plan.summary);
    print_kpi_set("baseline", &plan.kpis.baseline);
    print_kpi_set("projected", &plan.kpis.projected);
    for action in &plan.actions {
        println!("  {} {} — {}", "•".green(), action.name.bold(), action.description);
    }
}

async fn run_plan(config: &Config, cmd: PlanArgs) -> Result<()> {
    config.validate()?;

    let planner = Arc::new(HttpPlannerClient::from_config(&config.planner)?);
    let store = VersionStore::open(&config.storage.versions_path)?;
    let scope = Scope::new(config.tenant.clone(), config.persona.clone());
    let mut session = RefinementSession::new(planner, store, scope, SessionConfig::default());

    let request = GoalRequest::new(
        cmd.goal,
        BusinessContext::new(cmd.business_unit, cmd.market),
        Horizon::new(parse_unit(&cmd.unit)?, cmd.horizon),
        ObjectiveWeights::new(cmd.cost, cmd.service, cmd.carbon),
    );

    session.plan(request).await?;
    info!("analysis complete");

    println!("{}", "Comparison variants:".bold());
    for variant in session.variants() {
        println!("{} {}", format!("[{}]", variant.dimension).yellow(), variant.plan.summary);
        print_kpi_set("projected", &variant.plan.kpis.projected);
    }

    if let Some(select) = cmd.select {
        session.select_variant(parse_dimension(&select)?)?;
    }

    println!("\n{}", "Current plan:".bold());
    if let Some(plan) = session.current_plan() {
        print_plan(plan);
    }

    if let Some(label) = cmd.save {
        let saved = session.save(Some(label))?;
        println!("\n{} Saved version: {}", "✓".green(), saved.id.cyan());
    }

    Ok(())
}

struct PlanArgs {
    goal: String,
    unit: String,
    horizon: u32,
    cost: f64,
    service: f64,
    carbon: f64,
    business_unit: String,
    market: Vec<String>,
    select: Option<String>,
    save: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref())?;

    info!("replan starting");

    match cli.command {
        Command::Plan {
            goal,
            unit,
            horizon,
            cost,
            service,
            carbon,
            business_unit,
            market,
            select,
            save,
        } => {
            run_plan(
                &config,
                PlanArgs {
                    goal,
                    unit,
                    horizon,
                    cost,
                    service,
                    carbon,
                    business_unit,
                    market,
                    select,
                    save,
                },
            )
            .await?;
        }
        Command::Extract { file, json } => {
            let text = fs::read_to_string(&file).context(format!("Failed to read {}", file.display()))?;
            let report = replan::extract_report(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                if let Some(overview) = &report.overview {
                    println!("{}", overview.bold());
                }
                if report.cost_estimate.is_some() || !report.kpi_rows.is_empty() {
                    for row in &report.kpi_rows {
                        println!("  {:<20} {:<12} {}", row.name.cyan(), row.value, row.description.dimmed());
                    }
                    if let Some(cost) = report.cost_estimate {
                        println!("  {:<20} {:.2}", "cost estimate".cyan(), cost);
                    }
                }
                for action in &report.actions {
                    println!("  {} {}", "•".green(), action);
                }
                for source in &report.evidence {
                    println!("  {} {}", "↳".dimmed(), source.dimmed());
                }
            }
        }
        Command::Versions { command } => {
            let store = VersionStore::open(&config.storage.versions_path)?;
            let scope = Scope::new(config.tenant.clone(), config.persona.clone());
            match command {
                VersionsCommand::List => {
                    let versions: Vec<SavedPlan> = store.list(&scope)?;
                    if versions.is_empty() {
                        println!("No saved versions for {}/{}", scope.tenant.cyan(), scope.persona.cyan());
                    }
                    for v in versions {
                        let label = v.label.as_deref().unwrap_or("-");
                        let saved_at = chrono::DateTime::from_timestamp_millis(v.saved_at)
                            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|| v.saved_at.to_string());
                        println!("{}  {}  {}  {}", v.id.cyan(), saved_at.dimmed(), label.yellow(), v.summary);
                    }
                }
                VersionsCommand::Restore { id } => {
                    let version: SavedPlan = store.restore(&scope, &id)?;
                    print_plan(&version.payload.plan);
                }
                VersionsCommand::Delete { id } => {
                    store.delete(&scope, &id)?;
                    println!("{} Deleted version: {}", "✓".green(), id.cyan());
                }
            }
        }
    }

    Ok(())
}
