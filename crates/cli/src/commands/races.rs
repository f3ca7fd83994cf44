use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use storage::dto::race::{CreateRaceRequest, RunInput, UpdateRaceRequest};
use storage::models::{DEFAULT_SPORTS, Event, RaceCategory};
use storage::repository::RaceRepository;
use storage::services::numeric::parse_time;

use super::{ACTIVE_RACE, Context, resolve_event, resolve_player, resolve_race};
use crate::error::{CliError, CliResult};
use crate::render;

#[derive(Subcommand)]
pub enum RaceCommand {
    /// Set up a race; it becomes the active one
    New(NewRaceArgs),
    /// Enter a player's run: time, event scores and penalties
    Run(RunArgs),
    /// Close a race so it counts towards the championship
    Finish {
        #[arg(default_value = ACTIVE_RACE)]
        race: String,
    },
    /// Edit name, location or date
    Edit {
        race: String,
        #[arg(long)]
        name: Option<String>,
        /// An empty value clears the location
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Freeze a race against edits and score entry
    Lock { race: String },
    Unlock { race: String },
    Delete { race: String },
    /// All races, newest first
    List,
    /// Choose the race used by score entry
    Activate {
        #[arg(required_unless_present = "clear")]
        race: Option<String>,
        #[arg(long, conflicts_with = "race")]
        clear: bool,
    },
    /// Events, participants and entry progress of a race
    Show {
        #[arg(default_value = ACTIVE_RACE)]
        race: String,
    },
    /// The default sports list
    Sports,
}

#[derive(Args)]
pub struct NewRaceArgs {
    name: String,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    /// major, cat1, cat2 or cat3
    #[arg(long, default_value = "major", value_parser = parse_category)]
    category: RaceCategory,

    /// Participants, by id or name
    #[arg(long = "players", value_delimiter = ',', required = true)]
    players: Vec<String>,

    /// Sport from the default list, by name
    #[arg(long = "sport")]
    sports: Vec<String>,

    /// Custom event name
    #[arg(long = "event")]
    custom_events: Vec<String>,

    /// Use the whole default sports list
    #[arg(long)]
    all_sports: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Player id or name
    player: String,

    #[arg(long, default_value = ACTIVE_RACE)]
    race: String,

    /// Stopwatch value, milliseconds or m:ss.cc
    #[arg(long)]
    time: Option<String>,

    /// EVENT=SCORE, event given by id or name
    #[arg(long = "score", value_parser = parse_assignment)]
    scores: Vec<(String, String)>,

    /// Seconds added to the time, may be negative
    #[arg(long, allow_hyphen_values = true)]
    time_penalty: Option<String>,

    /// Points taken off the total, may be negative
    #[arg(long, allow_hyphen_values = true)]
    score_penalty: Option<String>,
}

pub fn run(ctx: &mut Context, command: RaceCommand) -> CliResult<()> {
    match command {
        RaceCommand::New(args) => create(ctx, args),
        RaceCommand::Run(args) => record_run(ctx, args),
        RaceCommand::Finish { race } => {
            ctx.require_admin()?;
            let id = resolve_race(ctx.db.snapshot(), &race)?;
            let race = RaceRepository::new(&mut ctx.db).finish(id)?;
            println!("Finished {}", race.name);
            Ok(())
        }
        RaceCommand::Edit {
            race,
            name,
            location,
            date,
        } => {
            let request = UpdateRaceRequest {
                name,
                location,
                date,
                locked: None,
            };
            update(ctx, &race, request)
        }
        RaceCommand::Lock { race } => update(ctx, &race, UpdateRaceRequest::lock(true)),
        RaceCommand::Unlock { race } => update(ctx, &race, UpdateRaceRequest::lock(false)),
        RaceCommand::Delete { race } => {
            ctx.require_admin()?;
            let id = resolve_race(ctx.db.snapshot(), &race)?;
            RaceRepository::new(&mut ctx.db).delete(id)?;
            println!("Deleted {}", race);
            Ok(())
        }
        RaceCommand::List => {
            let players = ctx.db.snapshot().players.clone();
            let repo = RaceRepository::new(&mut ctx.db);
            let active = repo.active().map(|race| race.id);
            let races = repo.list();
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&races)?);
            } else {
                print!("{}", render::races_table(&races, active, &players));
            }
            Ok(())
        }
        RaceCommand::Activate { race, clear } => {
            ctx.require_admin()?;
            let id = match race {
                Some(reference) if !clear => Some(resolve_race(ctx.db.snapshot(), &reference)?),
                _ => None,
            };
            RaceRepository::new(&mut ctx.db).set_active(id)?;
            match id {
                Some(id) => println!("Active race is now {}", id),
                None => println!("No active race"),
            }
            Ok(())
        }
        RaceCommand::Show { race } => {
            let snapshot = ctx.db.snapshot();
            let id = resolve_race(snapshot, &race)?;
            let race = snapshot.find_race(id).ok_or(storage::error::StorageError::NotFound)?;
            if ctx.json {
                return ctx.print_json(race);
            }
            print!("{}", render::race_details(race, &snapshot.players));
            Ok(())
        }
        RaceCommand::Sports => {
            for (idx, sport) in DEFAULT_SPORTS.iter().enumerate() {
                println!("def_{:<3} {}", idx, sport);
            }
            Ok(())
        }
    }
}

fn create(ctx: &mut Context, args: NewRaceArgs) -> CliResult<()> {
    ctx.require_admin()?;

    let player_ids = args
        .players
        .iter()
        .map(|reference| resolve_player(ctx.db.snapshot(), reference))
        .collect::<CliResult<Vec<_>>>()?;
    let events = select_events(&args.sports, &args.custom_events, args.all_sports)?;

    let race = RaceRepository::new(&mut ctx.db).create(CreateRaceRequest {
        name: args.name,
        location: args.location,
        date: args.date,
        category: args.category,
        player_ids,
        events,
    })?;

    if ctx.json {
        return ctx.print_json(&race);
    }
    println!(
        "Created {} ({}) with {} players and {} events",
        race.name,
        race.id,
        race.player_ids.len(),
        race.events.len()
    );
    Ok(())
}

fn record_run(ctx: &mut Context, args: RunArgs) -> CliResult<()> {
    ctx.require_admin()?;

    let snapshot = ctx.db.snapshot();
    let race_id = resolve_race(snapshot, &args.race)?;
    let player_id = resolve_player(snapshot, &args.player)?;
    let race = snapshot.find_race(race_id).ok_or(storage::error::StorageError::NotFound)?;

    let mut event_scores = BTreeMap::new();
    for (event, score) in &args.scores {
        event_scores.insert(resolve_event(race, event)?, score.clone());
    }
    let total_time_ms = args
        .time
        .as_deref()
        .map(|text| {
            parse_time(text).ok_or_else(|| {
                CliError::BadRequest(format!("Cannot read time '{}', use ms or m:ss.cc", text))
            })
        })
        .transpose()?;

    let scores = RaceRepository::new(&mut ctx.db).record_run(
        race_id,
        player_id,
        RunInput {
            total_time_ms,
            event_scores,
            time_penalty_seconds: args.time_penalty,
            score_penalty: args.score_penalty,
        },
    )?;

    if ctx.json {
        return ctx.print_json(&scores);
    }
    println!("Saved run for {}", args.player);
    Ok(())
}

fn update(ctx: &mut Context, race: &str, request: UpdateRaceRequest) -> CliResult<()> {
    ctx.require_admin()?;
    let id = resolve_race(ctx.db.snapshot(), race)?;
    let race = RaceRepository::new(&mut ctx.db).update_metadata(id, request)?;
    if ctx.json {
        return ctx.print_json(&race);
    }
    println!(
        "Updated {}{}",
        race.name,
        if race.locked { " (locked)" } else { "" }
    );
    Ok(())
}

/// Builds the event list from default sports picked by name plus custom names.
fn select_events(sports: &[String], custom: &[String], all_sports: bool) -> CliResult<Vec<Event>> {
    let defaults = RaceRepository::default_events();
    if all_sports {
        let mut events = defaults;
        events.extend(custom.iter().map(Event::custom));
        return Ok(events);
    }

    let mut events = Vec::with_capacity(sports.len() + custom.len());
    for sport in sports {
        let event = defaults
            .iter()
            .find(|event| event.name.to_lowercase() == sport.trim().to_lowercase())
            .ok_or_else(|| CliError::NotFound(format!("Sport '{}'", sport)))?;
        if !events.contains(event) {
            events.push(event.clone());
        }
    }
    events.extend(custom.iter().map(Event::custom));
    Ok(events)
}

fn parse_category(value: &str) -> Result<RaceCategory, String> {
    value.parse()
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(event, score)| (event.trim().to_string(), score.trim().to_string()))
        .filter(|(event, _)| !event.is_empty())
        .ok_or_else(|| format!("expected EVENT=SCORE, got '{}'", value))
}
