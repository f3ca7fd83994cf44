use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use storage::{Database, FileStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod commands;
mod config;
mod error;
mod render;

use auth::AdminGate;
use commands::{Commands, Context};
use config::Config;
use error::CliError;

#[derive(Parser)]
#[command(name = "multigame")]
#[command(about = "MultiGame championship manager", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the stored players and races
    #[arg(long, env = "MULTIGAME_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Admin PIN, required by commands that change data
    #[arg(long, env = "MULTIGAME_PIN", hide_env_values = true, global = true)]
    pin: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("multigame={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(cli_error) => {
                eprintln!("Error: {}", cli_error);
                ExitCode::from(cli_error.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?.with_data_dir(cli.data_dir);

    let store = FileStore::open(&config.data_dir).with_context(|| {
        format!("Cannot open data directory {}", config.data_dir.display())
    })?;
    let db = Database::open(store).context("Cannot load stored data")?;
    tracing::debug!(data_dir = %config.data_dir.display(), "Store opened");

    let mut ctx = Context {
        db,
        gate: AdminGate::new(config.admin_pin),
        pin: cli.pin,
        json: cli.json,
        data_dir: config.data_dir,
    };

    commands::dispatch(&mut ctx, cli.command)?;
    Ok(())
}
