//! Season aggregation over finished races: the championship leaderboard,
//! player profiles and the dashboard top list.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::dto::championship::{
    ChampionshipEntry, ChampionshipSort, PlayerProfile, RaceHistoryEntry, SortDirection,
};
use crate::dto::results::PlayerChampionshipResult;
use crate::models::{Player, Race, RaceCategory};
use crate::services::scoring::calculate_race_results;

/// Championship standings, highest championship total first. Ties keep the
/// order in which players first appear in the race list.
pub fn championship_standings(races: &[Race], players: &[Player]) -> Vec<ChampionshipEntry> {
    let mut entries: Vec<ChampionshipEntry> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for race in races.iter().filter(|race| race.is_finished()) {
        let results = calculate_race_results(race, players);
        let category = race.category();

        for standing in &results.global_standing {
            let slot = *index.entry(standing.player_id).or_insert_with(|| {
                entries.push(ChampionshipEntry::new(standing.player_id, &standing.name));
                entries.len() - 1
            });
            record(&mut entries[slot], category, standing);
        }
    }

    entries.sort_by(|a, b| b.total_championship_points.cmp(&a.total_championship_points));
    entries
}

fn record(entry: &mut ChampionshipEntry, category: RaceCategory, standing: &PlayerChampionshipResult) {
    *entry.points_by_category.entry(category).or_default() += standing.championship_points;
    entry.total_championship_points += standing.championship_points;

    entry.total_race_points = entry.total_race_points.saturating_add(standing.total_points);
    entry.races_participated += 1;
    entry.sum_of_ranks += standing.rank as u32;
    entry.best_race_points = Some(match entry.best_race_points {
        Some(best) if best >= standing.total_points => best,
        _ => standing.total_points,
    });

    if standing.rank == 1 {
        entry.wins += 1;
    }
    if standing.rank <= 3 {
        entry.podiums += 1;
    }
}

/// Re-sorts leaderboard rows by a statistic. `Default` keeps the championship
/// order untouched. Sorting is stable.
pub fn sort_standings(
    entries: &mut [ChampionshipEntry],
    sort: ChampionshipSort,
    direction: SortDirection,
) {
    let key: fn(&ChampionshipEntry) -> Decimal = match sort {
        ChampionshipSort::Default => return,
        ChampionshipSort::AverageRank => ChampionshipEntry::average_rank,
        ChampionshipSort::AverageScore => ChampionshipEntry::average_score,
        ChampionshipSort::CumulativePoints => |entry| entry.total_race_points,
        ChampionshipSort::Record => |entry| entry.best_race_points.unwrap_or(Decimal::ZERO),
    };

    match direction {
        SortDirection::Asc => entries.sort_by(|a, b| key(a).cmp(&key(b))),
        SortDirection::Desc => entries.sort_by(|a, b| key(b).cmp(&key(a))),
    }
}

/// The dashboard's leading players by championship points.
pub fn top_players(races: &[Race], players: &[Player], limit: usize) -> Vec<ChampionshipEntry> {
    let mut standings = championship_standings(races, players);
    standings.truncate(limit);
    standings
}

/// Career statistics of one player over the finished races they entered.
pub fn player_profile(player: &Player, races: &[Race], players: &[Player]) -> PlayerProfile {
    let mut history: Vec<RaceHistoryEntry> = races
        .iter()
        .filter(|race| race.is_finished() && race.has_player(player.id))
        .filter_map(|race| {
            let results = calculate_race_results(race, players);
            let standing = results.standing_for(player.id)?;
            Some(RaceHistoryEntry {
                race_id: race.id,
                name: race.name.clone(),
                date: race.display_date(),
                category_name: race
                    .category_name
                    .clone()
                    .unwrap_or_else(|| results.category_name.clone()),
                rank: standing.rank,
                points: standing.total_points,
                championship_points: standing.championship_points,
            })
        })
        .collect();

    history.sort_by(|a, b| b.date.cmp(&a.date));

    let total_races = history.len() as u32;
    let wins = history.iter().filter(|run| run.rank == 1).count() as u32;
    let podiums = history.iter().filter(|run| run.rank <= 3).count() as u32;
    let total_points = history
        .iter()
        .fold(Decimal::ZERO, |total, run| total.saturating_add(run.points));
    let best_rank = history.iter().map(|run| run.rank).min();
    let average_points = if total_races > 0 {
        (total_points / Decimal::from(total_races))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    PlayerProfile {
        player: player.clone(),
        total_races,
        wins,
        podiums,
        total_points,
        average_points,
        best_rank,
        history,
    }
}
