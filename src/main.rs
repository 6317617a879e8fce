use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use flockr::config::Config;
use flockr::domain::Roster;
use flockr::liveness::eligible_accounts;
use flockr::publish::{DryRunPublisher, Publisher, StaticContentSource};
use flockr::scheduler::{RunOutcome, Scheduler};
use flockr::store::{HealthStore, SqliteHealthStore, seed_roster};
use tokio::sync::watch;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flockr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("flockr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Run { dry_run } => handle_run_command(*dry_run, config).await,
        Commands::Seed => handle_seed_command(config),
        Commands::Health => handle_health_command(config),
        Commands::Validate => handle_validate_command(config),
    }
}

async fn handle_run_command(dry_run: bool, config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let roster = Roster::load(&config.accounts_path)
        .context(format!("Failed to load roster from {}", config.accounts_path.display()))?;

    let store: Arc<dyn HealthStore> = Arc::new(
        SqliteHealthStore::open(&config.store_path()).context("Failed to open health store")?,
    );
    let content = Arc::new(
        StaticContentSource::load(&config.content_path)
            .context(format!("Failed to load content from {}", config.content_path.display()))?,
    );

    let publisher = select_publisher(dry_run)?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, requesting stop");
            let _ = stop_tx.send(true);
        }
    });

    println!(
        "{} {} accounts, daily target {}",
        "Starting scheduler:".cyan(),
        roster.len(),
        config.daily_target
    );

    let mut scheduler = Scheduler::new(
        config.scheduler_config(),
        roster,
        store,
        content,
        publisher,
        stop_rx,
    );

    match scheduler.run().await {
        RunOutcome::Done => {
            println!(
                "{} {} cycles completed",
                "Daily target met:".green(),
                scheduler.state().attempted
            );
        }
        RunOutcome::Stopped => {
            println!(
                "{} {} of {} cycles completed",
                "Stopped:".yellow(),
                scheduler.state().attempted,
                config.daily_target
            );
        }
    }
    Ok(())
}

/// No platform integration ships with the core, so a live run has nothing
/// to publish through. Refuse to start unless the caller asked for a dry
/// run, where every post goes to the log instead.
fn select_publisher(dry_run: bool) -> Result<Arc<dyn Publisher>> {
    if !dry_run {
        eyre::bail!(
            "no publisher integration is configured; re-run with --dry-run to log posts instead of sending them"
        );
    }
    warn!("Dry run: posts will be logged, not sent");
    Ok(Arc::new(DryRunPublisher))
}

fn handle_seed_command(config: &Config) -> Result<()> {
    let roster = Roster::load(&config.accounts_path)
        .context(format!("Failed to load roster from {}", config.accounts_path.display()))?;
    let store =
        SqliteHealthStore::open(&config.store_path()).context("Failed to open health store")?;

    let written = seed_roster(&store, &roster).context("Failed to seed roster")?;
    println!("{} {} accounts marked alive", "Seeded:".green(), written);
    Ok(())
}

fn handle_health_command(config: &Config) -> Result<()> {
    let roster = Roster::load(&config.accounts_path)
        .context(format!("Failed to load roster from {}", config.accounts_path.display()))?;
    let store =
        SqliteHealthStore::open(&config.store_path()).context("Failed to open health store")?;

    let latest = store.latest_by_account().context("Failed to read health store")?;
    let cooldown = chrono::Duration::seconds(config.liveness_cooldown_secs as i64);
    let eligible = eligible_accounts(&roster.usernames(), &latest, chrono::Utc::now(), cooldown);

    for account in &roster.accounts {
        let marker = if eligible.contains(&account.username) {
            "eligible".green()
        } else {
            "cooling down".red()
        };
        match latest.get(&account.username) {
            Some(record) => println!(
                "{:<20} {:<14} {:<20} {}",
                account.username,
                record.outcome.to_string(),
                record.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                marker
            ),
            None => println!(
                "{:<20} {:<14} {:<20} {}",
                account.username,
                "-",
                "no record",
                marker
            ),
        }
    }
    Ok(())
}

fn handle_validate_command(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let roster = Roster::load(&config.accounts_path)
        .context(format!("Failed to load roster from {}", config.accounts_path.display()))?;
    println!(
        "{} config valid, {} accounts in roster",
        "OK:".green(),
        roster.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_refused_without_dry_run() {
        let err = select_publisher(false).unwrap_err();
        assert!(err.to_string().contains("--dry-run"));
    }

    #[test]
    fn test_dry_run_selects_logging_publisher() {
        assert!(select_publisher(true).is_ok());
    }
}
