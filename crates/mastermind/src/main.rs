//! Mastermind - command-line front end.
//!
//! Every subcommand maps onto one game service operation and prints its
//! result as JSON on stdout. Logs go to stderr.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use mastermind::{
    GameConfig, GameService, RandomOrgSupplier, SecretSource, SecretSupplier, SqliteStore,
    ThreadRngSupplier,
};
use mastermind_engine::raw_digits;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let service = build_service(&config)?;

    match cli.command {
        Command::New { mode, time_limit } => {
            print_json(&service.create_session(mode, time_limit).await?)
        }
        Command::Guess { id, digits } => {
            let guess = raw_digits(&digits)?;
            print_json(&service.submit_guess(&id, &guess)?)
        }
        Command::Show { id } => print_json(&service.game_state(&id)?),
        Command::Expire { id } => print_json(&service.expire_session(&id)?),
        Command::List => print_json(&service.list_sessions()?),
    }
}

/// Loads the config file if given, then applies environment and flag overrides.
#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => {
            debug!("No config file given; using defaults");
            GameConfig::default()
        }
    };
    let config = config.with_env_overrides();
    Ok(match &cli.db {
        Some(db) => config.with_db_path(db.clone()),
        None => config,
    })
}

/// Opens the database and picks the configured secret supplier.
#[instrument(skip(config))]
fn build_service(config: &GameConfig) -> Result<GameService<SqliteStore>> {
    let store = SqliteStore::open(config.db_path().clone())?;

    let supplier: Arc<dyn SecretSupplier> = match config.secret_source() {
        SecretSource::RandomOrg => {
            info!(url = %config.random_org_base_url(), "Using random.org secrets");
            Arc::new(RandomOrgSupplier::new(config.random_org_base_url().clone()))
        }
        SecretSource::Local => {
            info!("Using local RNG secrets");
            Arc::new(ThreadRngSupplier)
        }
    };

    Ok(GameService::new(store, supplier, *config.time_limit_secs()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
