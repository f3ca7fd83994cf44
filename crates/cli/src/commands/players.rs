use clap::Subcommand;
use storage::dto::player::{CreatePlayerRequest, UpdatePlayerRequest};
use storage::repository::PlayerRepository;
use storage::services::championship::player_profile;
use storage::services::numeric::parse_optional;

use super::{Context, resolve_player};
use crate::error::{CliError, CliResult};
use crate::render;

#[derive(Subcommand)]
pub enum PlayerCommand {
    /// Add a player to the roster
    Add { name: String },
    /// Edit a player's profile
    Edit {
        /// Player id or name
        player: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        /// Height in centimetres
        #[arg(long)]
        height: Option<String>,
        /// Weight in kilograms
        #[arg(long)]
        weight: Option<String>,
        /// Short biography; an empty value clears it
        #[arg(long)]
        bio: Option<String>,
    },
    /// Remove a player who is not registered in any race
    Remove { player: String },
    /// List the roster
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Career statistics of a player
    Show { player: String },
}

pub fn run(ctx: &mut Context, command: PlayerCommand) -> CliResult<()> {
    match command {
        PlayerCommand::Add { name } => {
            ctx.require_admin()?;
            let player = PlayerRepository::new(&mut ctx.db).create(CreatePlayerRequest::new(name))?;
            if ctx.json {
                return ctx.print_json(&player);
            }
            println!("Added {} ({})", player.name, player.id);
        }
        PlayerCommand::Edit {
            player,
            name,
            age,
            height,
            weight,
            bio,
        } => {
            ctx.require_admin()?;
            let id = resolve_player(ctx.db.snapshot(), &player)?;
            let request = UpdatePlayerRequest {
                name,
                age,
                height: height.as_deref().map(|v| measurement("height", v)).transpose()?,
                weight: weight.as_deref().map(|v| measurement("weight", v)).transpose()?,
                bio,
            };
            if request.is_empty() {
                return Err(CliError::BadRequest("Nothing to update".to_string()));
            }

            let player = PlayerRepository::new(&mut ctx.db).update(id, request)?;
            if ctx.json {
                return ctx.print_json(&player);
            }
            println!("Updated {}", player.name);
        }
        PlayerCommand::Remove { player } => {
            ctx.require_admin()?;
            let id = resolve_player(ctx.db.snapshot(), &player)?;
            PlayerRepository::new(&mut ctx.db).delete(id)?;
            println!("Removed {}", player);
        }
        PlayerCommand::List { search } => {
            let repo = PlayerRepository::new(&mut ctx.db);
            let players = repo.search(search.as_deref().unwrap_or(""));
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&players)?);
            } else {
                print!("{}", render::players_table(&players));
            }
        }
        PlayerCommand::Show { player } => {
            let snapshot = ctx.db.snapshot();
            let id = resolve_player(snapshot, &player)?;
            let player = snapshot
                .find_player(id)
                .ok_or_else(|| CliError::NotFound(format!("Player '{}'", player)))?;
            let profile = player_profile(player, &snapshot.races, &snapshot.players);
            if ctx.json {
                return ctx.print_json(&profile);
            }
            print!("{}", render::player_profile(&profile));
        }
    }
    Ok(())
}

fn measurement(field: &str, value: &str) -> CliResult<rust_decimal::Decimal> {
    parse_optional(value)
        .ok_or_else(|| CliError::BadRequest(format!("{} must be a number, got '{}'", field, value)))
}
