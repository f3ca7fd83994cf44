use clap::{Args, ValueEnum};
use serde::Serialize;
use storage::dto::championship::{ChampionshipEntry, ChampionshipSort, SortDirection};
use storage::models::Race;
use storage::repository::RaceRepository;
use storage::services::championship::{championship_standings, sort_standings, top_players};

use super::{Context, resolve_race};
use crate::error::CliResult;
use crate::render;

const DASHBOARD_TOP: usize = 5;
const DASHBOARD_RECENT: usize = 5;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SortKey {
    /// Championship points
    #[default]
    Points,
    AverageRank,
    AverageScore,
    Cumulative,
    Record,
}

impl From<SortKey> for ChampionshipSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Points => Self::Default,
            SortKey::AverageRank => Self::AverageRank,
            SortKey::AverageScore => Self::AverageScore,
            SortKey::Cumulative => Self::CumulativePoints,
            SortKey::Record => Self::Record,
        }
    }
}

#[derive(Args)]
pub struct LeaderboardArgs {
    #[arg(long, value_enum, default_value_t)]
    sort: SortKey,

    /// Ascending order (default is descending)
    #[arg(long)]
    asc: bool,
}

pub fn show_results(ctx: &mut Context, race: &str) -> CliResult<()> {
    let id = resolve_race(ctx.db.snapshot(), race)?;
    let repo = RaceRepository::new(&mut ctx.db);
    let results = repo.results(id)?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    let race = repo.find_by_id(id)?;
    print!("{}", render::race_results(race, &results));
    Ok(())
}

pub fn leaderboard(ctx: &mut Context, args: LeaderboardArgs) -> CliResult<()> {
    let snapshot = ctx.db.snapshot();
    let mut standings = championship_standings(&snapshot.races, &snapshot.players);
    let direction = if args.asc {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    sort_standings(&mut standings, args.sort.into(), direction);

    if ctx.json {
        return ctx.print_json(&standings);
    }
    print!("{}", render::leaderboard(&standings));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard<'a> {
    active_race: Option<&'a Race>,
    recent_races: Vec<&'a Race>,
    top_players: Vec<ChampionshipEntry>,
}

pub fn dashboard(ctx: &mut Context) -> CliResult<()> {
    let snapshot = ctx.db.snapshot();
    let mut recent: Vec<&Race> = snapshot.races.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(DASHBOARD_RECENT);

    let view = Dashboard {
        active_race: snapshot.active_race(),
        recent_races: recent,
        top_players: top_players(&snapshot.races, &snapshot.players, DASHBOARD_TOP),
    };

    if ctx.json {
        return ctx.print_json(&view);
    }
    print!(
        "{}",
        render::dashboard(
            view.active_race,
            &view.recent_races,
            &view.top_players,
            &snapshot.players
        )
    );
    Ok(())
}
