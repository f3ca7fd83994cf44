use std::path::PathBuf;

use clap::Subcommand;
use storage::Database;
use storage::models::{Race, Snapshot};
use uuid::Uuid;

use crate::auth::AdminGate;
use crate::error::{CliError, CliResult};

pub mod data;
pub mod players;
pub mod races;
pub mod results;

/// Reference accepted wherever a race is expected
pub const ACTIVE_RACE: &str = "active";

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the player roster
    Player {
        #[command(subcommand)]
        command: players::PlayerCommand,
    },
    /// Set up, score and close races
    Race {
        #[command(subcommand)]
        command: races::RaceCommand,
    },
    /// Standings of one race
    Results {
        #[arg(default_value = ACTIVE_RACE)]
        race: String,
    },
    /// Season championship standings
    Leaderboard(results::LeaderboardArgs),
    /// Active race, recent races and top players
    Dashboard,
    /// Backup and restore
    Data {
        #[command(subcommand)]
        command: data::DataCommand,
    },
}

pub struct Context {
    pub db: Database,
    pub gate: AdminGate,
    pub pin: Option<String>,
    pub json: bool,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn require_admin(&self) -> CliResult<()> {
        self.gate.verify(self.pin.as_deref())
    }

    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> CliResult<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

pub fn dispatch(ctx: &mut Context, command: Commands) -> CliResult<()> {
    match command {
        Commands::Player { command } => players::run(ctx, command),
        Commands::Race { command } => races::run(ctx, command),
        Commands::Results { race } => results::show_results(ctx, &race),
        Commands::Leaderboard(args) => results::leaderboard(ctx, args),
        Commands::Dashboard => results::dashboard(ctx),
        Commands::Data { command } => data::run(ctx, command),
    }
}

/// Resolves a player given by id or by name (case-insensitive).
pub fn resolve_player(snapshot: &Snapshot, reference: &str) -> CliResult<Uuid> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference)
        && snapshot.find_player(id).is_some()
    {
        return Ok(id);
    }

    let matches: Vec<Uuid> = snapshot
        .players
        .iter()
        .filter(|player| player.name.to_lowercase() == reference.to_lowercase())
        .map(|player| player.id)
        .collect();
    single(matches, "Player", reference)
}

/// Resolves a race given by id, by name, or as `active`.
pub fn resolve_race(snapshot: &Snapshot, reference: &str) -> CliResult<Uuid> {
    let reference = reference.trim();
    if reference.eq_ignore_ascii_case(ACTIVE_RACE) {
        return snapshot
            .active_race()
            .map(|race| race.id)
            .ok_or_else(|| CliError::NotFound("Active race".to_string()));
    }
    if let Ok(id) = Uuid::parse_str(reference)
        && snapshot.find_race(id).is_some()
    {
        return Ok(id);
    }

    let matches: Vec<Uuid> = snapshot
        .races
        .iter()
        .filter(|race| race.name.to_lowercase() == reference.to_lowercase())
        .map(|race| race.id)
        .collect();
    single(matches, "Race", reference)
}

/// Resolves an event of `race` given by id or by name.
pub fn resolve_event(race: &Race, reference: &str) -> CliResult<String> {
    let reference = reference.trim();
    race.events
        .iter()
        .find(|event| event.id == reference)
        .or_else(|| {
            race.events
                .iter()
                .find(|event| event.name.to_lowercase() == reference.to_lowercase())
        })
        .map(|event| event.id.clone())
        .ok_or_else(|| CliError::NotFound(format!("Event '{}' in race '{}'", reference, race.name)))
}

fn single(matches: Vec<Uuid>, kind: &str, reference: &str) -> CliResult<Uuid> {
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CliError::NotFound(format!("{} '{}'", kind, reference))),
        _ => Err(CliError::BadRequest(format!(
            "'{}' matches several {}s, use the id instead",
            reference,
            kind.to_lowercase()
        ))),
    }
}
