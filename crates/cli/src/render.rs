//! Plain-text views printed by the commands.

use std::fmt::Write;

use rust_decimal::Decimal;
use storage::dto::championship::{ChampionshipEntry, PlayerProfile};
use storage::dto::results::RaceResults;
use storage::models::{Player, Race, RaceCategory};
use storage::services::numeric::format_time;
use storage::services::scoring::calculate_race_results;

fn points(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

fn rank_label(rank: usize) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", rank, suffix)
}

/// "1st A, 2nd B, 3rd C" for a finished race, `None` otherwise.
fn podium_line(race: &Race, players: &[Player]) -> Option<String> {
    if !race.is_finished() {
        return None;
    }
    let results = calculate_race_results(race, players);
    let podium: Vec<String> = results
        .podium()
        .iter()
        .map(|entry| format!("{} {}", rank_label(entry.rank), entry.name))
        .collect();
    (!podium.is_empty()).then(|| podium.join(", "))
}

pub fn players_table(players: &[&Player]) -> String {
    if players.is_empty() {
        return "No players yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<36}  {:<24}  {:>4}  {:>7}  {:>7}", "ID", "NAME", "AGE", "HEIGHT", "WEIGHT");
    for player in players {
        let _ = writeln!(
            out,
            "{:<36}  {:<24}  {:>4}  {:>7}  {:>7}",
            player.id,
            player.name,
            player.age.map(|a| a.to_string()).unwrap_or_default(),
            player.height.map(points).unwrap_or_default(),
            player.weight.map(points).unwrap_or_default(),
        );
    }
    out
}

pub fn player_profile(profile: &PlayerProfile) -> String {
    let player = &profile.player;
    let mut out = String::new();
    let _ = writeln!(out, "{}", player.name);
    if let Some(bio) = &player.bio {
        let _ = writeln!(out, "  {}", bio);
    }
    let _ = writeln!(
        out,
        "Races {}  Wins {}  Podiums {}  Total points {}  Average {}  Best rank {}",
        profile.total_races,
        profile.wins,
        profile.podiums,
        points(profile.total_points),
        points(profile.average_points),
        profile
            .best_rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );

    if profile.history.is_empty() {
        let _ = writeln!(out, "No finished races.");
        return out;
    }

    let _ = writeln!(out);
    for run in &profile.history {
        let _ = writeln!(
            out,
            "{}  {:<24}  {:<22}  {:>4}  {:>8} pts  +{} champ",
            run.date,
            run.name,
            run.category_name,
            rank_label(run.rank),
            points(run.points),
            run.championship_points,
        );
    }
    out
}

pub fn races_table(races: &[&Race], active: Option<uuid::Uuid>, players: &[Player]) -> String {
    if races.is_empty() {
        return "No races yet.\n".to_string();
    }

    let mut out = String::new();
    for race in races {
        let marker = if Some(race.id) == active { "*" } else { " " };
        let state = match (race.is_finished(), race.locked) {
            (true, _) => "finished",
            (false, true) => "locked",
            (false, false) => "ongoing",
        };
        let _ = writeln!(
            out,
            "{} {}  {}  {:<24}  {:<22}  {:>2} players  {}",
            marker,
            race.id,
            race.display_date(),
            race.name,
            race.category().name(),
            race.player_ids.len(),
            state,
        );
        if let Some(podium) = podium_line(race, players) {
            let _ = writeln!(out, "    podium: {}", podium);
        }
    }
    out
}

pub fn race_details(race: &Race, players: &[Player]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", race.name, race.category().name());
    let _ = writeln!(out, "  id:       {}", race.id);
    let _ = writeln!(out, "  date:     {}", race.display_date());
    if let Some(location) = &race.location {
        let _ = writeln!(out, "  location: {}", location);
    }
    let _ = writeln!(
        out,
        "  status:   {:?}{}",
        race.status,
        if race.locked { " (locked)" } else { "" }
    );

    let _ = writeln!(out, "Events:");
    for event in &race.events {
        let _ = writeln!(out, "  {:<24} {}", event.id, event.name);
    }

    let _ = writeln!(out, "Players:");
    for player in players.iter().filter(|p| race.has_player(p.id)) {
        let run = race.scores_for(player.id);
        let time = run
            .and_then(|scores| scores.total_time_ms)
            .map(format_time)
            .unwrap_or_else(|| "not run".to_string());
        let entered = run.map(|scores| scores.event_scores.len()).unwrap_or(0);
        let _ = writeln!(
            out,
            "  {:<24} {:>9}  {}/{} events",
            player.name,
            time,
            entered,
            race.events.len()
        );
    }
    out
}

pub fn race_results(race: &Race, results: &RaceResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", race.name, results.category_name);

    let _ = writeln!(out, "\nGeneral standing");
    for entry in &results.global_standing {
        let _ = writeln!(
            out,
            "  {:>4}  {:<24} {:>9} pts  time bonus {:>3}  penalty {:>5}  +{} champ",
            rank_label(entry.rank),
            entry.name,
            points(entry.total_points),
            entry.time_bonus,
            points(entry.score_penalty),
            entry.championship_points,
        );
    }

    if !results.time_standings.is_empty() {
        let _ = writeln!(out, "\nTime trial");
        for entry in &results.time_standings {
            let _ = writeln!(
                out,
                "  {:>4}  {:<24} {:>9}  +{}",
                rank_label(entry.rank),
                entry.name,
                entry.formatted_time,
                entry.points
            );
        }
    }

    for event in &race.events {
        let Some(standings) = results.event_standings.get(&event.id) else {
            continue;
        };
        let _ = writeln!(out, "\n{}", event.name);
        for entry in standings {
            let _ = writeln!(
                out,
                "  {:>4}  {:<24} {:>9}",
                rank_label(entry.rank),
                entry.name,
                points(entry.raw_score)
            );
        }
    }
    out
}

pub fn leaderboard(entries: &[ChampionshipEntry]) -> String {
    if entries.is_empty() {
        return "No finished races yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = write!(out, "{:>3}  {:<24}", "#", "PLAYER");
    for category in RaceCategory::ALL {
        let _ = write!(out, "  {:>5}", category.id().to_uppercase());
    }
    let _ = writeln!(
        out,
        "  {:>5}  {:>4}  {:>4}  {:>8}  {:>8}  {:>9}  {:>8}",
        "TOTAL", "WINS", "POD", "AVG RANK", "AVG PTS", "CUMUL", "RECORD"
    );

    for (idx, entry) in entries.iter().enumerate() {
        let _ = write!(out, "{:>3}  {:<24}", idx + 1, entry.name);
        for category in RaceCategory::ALL {
            let _ = write!(out, "  {:>5}", entry.points_in(category));
        }
        let _ = writeln!(
            out,
            "  {:>5}  {:>4}  {:>4}  {:>8}  {:>8}  {:>9}  {:>8}",
            entry.total_championship_points,
            entry.wins,
            entry.podiums,
            points(entry.average_rank()),
            points(entry.average_score()),
            points(entry.total_race_points),
            entry.best_race_points.map(points).unwrap_or_else(|| "-".to_string()),
        );
    }
    out
}

pub fn dashboard(
    active: Option<&Race>,
    recent: &[&Race],
    top: &[ChampionshipEntry],
    players: &[Player],
) -> String {
    let mut out = String::new();

    match active {
        Some(race) => {
            let _ = writeln!(
                out,
                "Active race: {} ({}, {} players)",
                race.name,
                race.category().name(),
                race.player_ids.len()
            );
        }
        None => {
            let _ = writeln!(out, "No active race.");
        }
    }

    let _ = writeln!(out, "\nTop players");
    if top.is_empty() {
        let _ = writeln!(out, "  No finished races yet.");
    }
    for (idx, entry) in top.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<24} {:>5} pts",
            idx + 1,
            entry.name,
            entry.total_championship_points
        );
    }

    let _ = writeln!(out, "\nRecent races");
    if recent.is_empty() {
        let _ = writeln!(out, "  No races yet.");
    }
    for race in recent {
        let _ = writeln!(
            out,
            "  {}  {:<24} {}",
            race.display_date(),
            race.name,
            if race.is_finished() { "finished" } else { "ongoing" }
        );
        if let Some(podium) = podium_line(race, players) {
            let _ = writeln!(out, "    {}", podium);
        }
    }
    out
}
