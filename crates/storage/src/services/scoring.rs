//! Race scoring: time-trial bonus, event points, penalties, final standing
//! and championship points.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::results::{
    PlayerChampionshipResult, PlayerEventResult, PlayerTimeResult, RaceResults,
};
use crate::models::{Player, PlayerScores, Race};
use crate::services::numeric::{format_time, round_points};

/// Bonus points for the overall time trial, fastest first.
pub const TIME_BONUS_POINTS: [u32; 15] = [
    200, 175, 150, 125, 100, 90, 80, 70, 60, 50, 40, 30, 20, 10, 5,
];

/// Time bonus for a 1-based rank; ranks past the table earn nothing.
pub fn time_bonus_for_rank(rank: usize) -> u32 {
    rank.checked_sub(1)
        .and_then(|idx| TIME_BONUS_POINTS.get(idx))
        .copied()
        .unwrap_or(0)
}

/// Computes the results of `race` for the roster `players`.
///
/// Participants are the roster entries listed in `race.player_ids`, in roster
/// order; that order breaks ties in every standing. Inputs are never mutated.
pub fn calculate_race_results(race: &Race, players: &[Player]) -> RaceResults {
    let participants: Vec<&Player> = players
        .iter()
        .filter(|player| race.has_player(player.id))
        .collect();
    let category = race.category();
    let no_scores = PlayerScores::default();
    let scores_of = |id: Uuid| race.scores_for(id).unwrap_or(&no_scores);

    let mut totals: HashMap<Uuid, Decimal> = participants
        .iter()
        .map(|player| (player.id, Decimal::ZERO))
        .collect();

    let time_standings = time_trial(race, &participants);
    let mut time_bonus: HashMap<Uuid, u32> = HashMap::new();
    for entry in &time_standings {
        let total = totals.entry(entry.player_id).or_default();
        *total = total.saturating_add(Decimal::from(entry.points));
        time_bonus.insert(entry.player_id, entry.points);
    }

    let mut event_standings = BTreeMap::new();
    for event in &race.events {
        let mut results: Vec<PlayerEventResult> = participants
            .iter()
            .map(|player| {
                let raw_score = scores_of(player.id).event_score(&event.id);
                PlayerEventResult {
                    player_id: player.id,
                    name: player.name.clone(),
                    raw_score,
                    rank: 0,
                    points: raw_score,
                }
            })
            .collect();

        results.sort_by(|a, b| b.raw_score.cmp(&a.raw_score));

        for (idx, result) in results.iter_mut().enumerate() {
            result.rank = idx + 1;
            let total = totals.entry(result.player_id).or_default();
            *total = total.saturating_add(result.points);
        }

        event_standings.insert(event.id.clone(), results);
    }

    for player in &participants {
        let total = totals.entry(player.id).or_default();
        *total = total.saturating_sub(scores_of(player.id).score_penalty);
    }

    let mut ranked: Vec<(&Player, Decimal)> = participants
        .iter()
        .map(|player| (*player, round_points(totals[&player.id])))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let global_standing = ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (player, total_points))| {
            let scores = scores_of(player.id);
            PlayerChampionshipResult {
                player_id: player.id,
                name: player.name.clone(),
                total_points,
                rank: idx + 1,
                championship_points: category.points_for_rank(idx + 1),
                time_bonus: time_bonus.get(&player.id).copied().unwrap_or(0),
                raw_time_ms: scores.total_time_ms.unwrap_or(Decimal::ZERO),
                time_penalty_ms: scores.time_penalty_ms,
                score_penalty: scores.score_penalty,
                scores: scores.clone(),
            }
        })
        .collect();

    RaceResults {
        event_standings,
        time_standings,
        global_standing,
        category_name: category.name().to_string(),
    }
}

/// Ranks every participant with a positive recorded time. A time of zero means
/// the player did not run. The time penalty is applied before ranking and may
/// be negative, but a run whose final time is not positive is left out.
fn time_trial(race: &Race, participants: &[&Player]) -> Vec<PlayerTimeResult> {
    let mut runs: Vec<(&Player, Decimal)> = participants
        .iter()
        .filter_map(|player| {
            let scores = race.scores_for(player.id)?;
            let raw = scores.total_time_ms.filter(|t| *t > Decimal::ZERO)?;
            let time = raw.saturating_add(scores.time_penalty_ms);
            (time > Decimal::ZERO).then_some((*player, time))
        })
        .collect();

    runs.sort_by(|a, b| a.1.cmp(&b.1));

    runs.into_iter()
        .enumerate()
        .map(|(idx, (player, time_ms))| PlayerTimeResult {
            player_id: player.id,
            name: player.name.clone(),
            time_ms,
            rank: idx + 1,
            points: time_bonus_for_rank(idx + 1),
            formatted_time: format_time(time_ms),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;
    use crate::models::{Event, EventType, RaceCategory, RaceStatus};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn event(id: &str, name: &str) -> Event {
        Event {
            id: id.to_string(),
            name: name.to_string(),
            r#type: EventType::Score,
        }
    }

    fn race(players: &[&Player], events: Vec<Event>, category: RaceCategory) -> Race {
        Race {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            created_at: Utc::now(),
            date: None,
            location: None,
            category_id: category.id().to_string(),
            category_name: Some(category.name().to_string()),
            events,
            player_ids: players.iter().map(|p| p.id).collect(),
            scores: BTreeMap::new(),
            status: RaceStatus::Ongoing,
            ended_at: None,
            locked: false,
        }
    }

    fn scores<'a>(race: &'a mut Race, player: &Player) -> &'a mut PlayerScores {
        race.scores.entry(player.id).or_default()
    }

    #[test]
    fn test_archery_scenario() {
        let a = Player::new("A");
        let b = Player::new("B");
        let mut race = race(&[&a, &b], vec![event("def_0", "Tir à l'arc")], RaceCategory::Major);
        scores(&mut race, &a).event_scores.insert("def_0".into(), dec("10"));
        scores(&mut race, &b).event_scores.insert("def_0".into(), dec("7"));

        let results = calculate_race_results(&race, &[a.clone(), b.clone()]);

        assert!(results.time_standings.is_empty());
        assert_eq!(results.category_name, "Major");
        let standing = &results.global_standing;
        assert_eq!(standing.len(), 2);
        assert_eq!(standing[0].player_id, a.id);
        assert_eq!(standing[0].total_points, dec("10"));
        assert_eq!(standing[0].rank, 1);
        assert_eq!(standing[0].championship_points, 100);
        assert_eq!(standing[1].player_id, b.id);
        assert_eq!(standing[1].total_points, dec("7"));
        assert_eq!(standing[1].rank, 2);
        assert_eq!(standing[1].championship_points, 75);
    }

    #[test]
    fn test_time_penalty_is_added_before_formatting() {
        let a = Player::new("A");
        let mut race = race(&[&a], vec![], RaceCategory::Major);
        let entry = scores(&mut race, &a);
        entry.total_time_ms = Some(dec("20000"));
        entry.time_penalty_ms = dec("5000");

        let results = calculate_race_results(&race, &[a.clone()]);

        let time = &results.time_standings[0];
        assert_eq!(time.time_ms, dec("25000"));
        assert_eq!(time.formatted_time, "0:25.00");
        assert_eq!(time.points, 200);
        assert_eq!(results.global_standing[0].total_points, dec("200"));
        assert_eq!(results.global_standing[0].time_bonus, 200);
    }

    #[test]
    fn test_score_penalty_subtracted_once() {
        let a = Player::new("A");
        let events = vec![event("def_0", "Golf"), event("def_1", "Foot")];
        let mut race = race(&[&a], events, RaceCategory::Cat1);
        let entry = scores(&mut race, &a);
        entry.event_scores.insert("def_0".into(), dec("6"));
        entry.event_scores.insert("def_1".into(), dec("4"));
        entry.score_penalty = dec("5");

        let results = calculate_race_results(&race, &[a.clone()]);

        assert_eq!(results.global_standing[0].total_points, dec("5"));
        assert_eq!(results.global_standing[0].championship_points, 60);
    }

    #[test]
    fn test_zero_time_is_not_a_run() {
        let a = Player::new("A");
        let b = Player::new("B");
        let mut race = race(&[&a, &b], vec![], RaceCategory::Major);
        scores(&mut race, &a).total_time_ms = Some(Decimal::ZERO);
        scores(&mut race, &b).time_penalty_ms = dec("3000");

        let results = calculate_race_results(&race, &[a, b]);

        assert!(results.time_standings.is_empty());
        assert!(results.global_standing.iter().all(|e| e.time_bonus == 0));
        assert!(results
            .global_standing
            .iter()
            .all(|e| e.total_points.is_zero()));
    }

    #[test]
    fn test_time_ranking_and_table_exhaustion() {
        let players: Vec<Player> = (0..17).map(|i| Player::new(format!("P{}", i))).collect();
        let refs: Vec<&Player> = players.iter().collect();
        let mut race = race(&refs, vec![], RaceCategory::Major);
        for (i, player) in players.iter().enumerate() {
            // Slowest first so the ranking has to reverse the roster
            scores(&mut race, player).total_time_ms = Some(Decimal::from(100_000 - i as i64 * 1000));
        }

        let results = calculate_race_results(&race, &players);

        assert_eq!(results.time_standings.len(), 17);
        assert_eq!(results.time_standings[0].player_id, players[16].id);
        assert_eq!(results.time_standings[0].points, 200);
        assert_eq!(results.time_standings[14].points, 5);
        assert_eq!(results.time_standings[15].points, 0);
        assert_eq!(results.time_standings[16].points, 0);
        assert!(results
            .time_standings
            .windows(2)
            .all(|w| w[0].time_ms <= w[1].time_ms));
    }

    #[test]
    fn test_negative_time_penalty_can_overtake() {
        let a = Player::new("A");
        let b = Player::new("B");
        let mut race = race(&[&a, &b], vec![], RaceCategory::Major);
        scores(&mut race, &a).total_time_ms = Some(dec("30000"));
        let entry = scores(&mut race, &b);
        entry.total_time_ms = Some(dec("32000"));
        entry.time_penalty_ms = dec("-5000");

        let results = calculate_race_results(&race, &[a.clone(), b.clone()]);

        assert_eq!(results.time_standings[0].player_id, b.id);
        assert_eq!(results.time_standings[0].formatted_time, "0:27.00");
        assert_eq!(results.time_standings[1].player_id, a.id);
    }

    #[test]
    fn test_penalty_below_zero_drops_the_run() {
        let a = Player::new("A");
        let b = Player::new("B");
        let mut race = race(&[&a, &b], vec![], RaceCategory::Major);
        scores(&mut race, &a).total_time_ms = Some(dec("30000"));
        let entry = scores(&mut race, &b);
        entry.total_time_ms = Some(dec("20000"));
        entry.time_penalty_ms = dec("-25000");

        let results = calculate_race_results(&race, &[a.clone(), b.clone()]);

        assert_eq!(results.time_standings.len(), 1);
        assert_eq!(results.time_standings[0].player_id, a.id);
        assert_eq!(results.time_standings[0].points, 200);
        assert_eq!(results.standing_for(b.id).unwrap().time_bonus, 0);
    }

    #[test]
    fn test_extreme_scores_saturate() {
        let a = Player::new("A");
        let events = vec![event("def_0", "Golf"), event("def_1", "Foot")];
        let mut race = race(&[&a], events, RaceCategory::Major);
        let entry = scores(&mut race, &a);
        entry.event_scores.insert("def_0".into(), Decimal::MAX);
        entry.event_scores.insert("def_1".into(), Decimal::MAX);
        entry.total_time_ms = Some(dec("1000"));
        entry.score_penalty = Decimal::MIN;

        let results = calculate_race_results(&race, &[a.clone()]);

        assert_eq!(results.global_standing[0].total_points, Decimal::MAX);
    }

    #[test]
    fn test_podium_is_first_three() {
        let roster: Vec<Player> = (0..5).map(|i| Player::new(format!("P{}", i))).collect();
        let refs: Vec<&Player> = roster.iter().collect();
        let mut race = race(&refs, vec![event("def_0", "Golf")], RaceCategory::Major);
        for (i, player) in roster.iter().enumerate() {
            scores(&mut race, player)
                .event_scores
                .insert("def_0".into(), Decimal::from(i as i64));
        }

        let results = calculate_race_results(&race, &roster);

        let podium: Vec<&str> = results.podium().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(podium, vec!["P4", "P3", "P2"]);
    }

    #[test]
    fn test_podium_with_fewer_than_three() {
        let a = Player::new("A");
        let b = Player::new("B");
        let race = race(&[&a, &b], vec![], RaceCategory::Cat1);

        assert_eq!(calculate_race_results(&race, &[a.clone(), b]).podium().len(), 2);
        assert!(calculate_race_results(&race, &[]).podium().is_empty());
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let a = Player::new("A");
        let b = Player::new("B");
        let c = Player::new("C");
        // Race lists players in a different order than the roster
        let mut race = race(&[&c, &b, &a], vec![event("def_0", "Vortex")], RaceCategory::Cat2);
        for player in [&a, &b, &c] {
            scores(&mut race, player)
                .event_scores
                .insert("def_0".into(), dec("3"));
        }

        let results = calculate_race_results(&race, &[a.clone(), b.clone(), c.clone()]);

        let order: Vec<Uuid> = results.global_standing.iter().map(|e| e.player_id).collect();
        assert_eq!(order, vec![a.id, b.id, c.id]);
        let event_order: Vec<Uuid> = results.event_standings["def_0"]
            .iter()
            .map(|e| e.player_id)
            .collect();
        assert_eq!(event_order, vec![a.id, b.id, c.id]);
        let champ: Vec<u32> = results
            .global_standing
            .iter()
            .map(|e| e.championship_points)
            .collect();
        assert_eq!(champ, vec![45, 35, 25]);
    }

    #[test]
    fn test_event_points_are_raw_scores_not_ranks() {
        let a = Player::new("A");
        let b = Player::new("B");
        let mut race = race(&[&a, &b], vec![event("def_0", "Basket")], RaceCategory::Major);
        scores(&mut race, &a).event_scores.insert("def_0".into(), dec("2.5"));
        scores(&mut race, &b).event_scores.insert("def_0".into(), dec("40"));

        let results = calculate_race_results(&race, &[a.clone(), b.clone()]);

        let standing = &results.event_standings["def_0"];
        assert_eq!(standing[0].player_id, b.id);
        assert_eq!(standing[0].rank, 1);
        assert_eq!(standing[0].points, dec("40"));
        assert_eq!(standing[1].points, dec("2.5"));
        assert_eq!(results.global_standing[1].total_points, dec("2.5"));
    }

    #[test]
    fn test_gross_event_points_reconstruction() {
        let a = Player::new("A");
        let b = Player::new("B");
        let events = vec![event("def_0", "Golf"), event("def_1", "Tennis")];
        let mut race = race(&[&a, &b], events, RaceCategory::Cat3);
        let entry = scores(&mut race, &a);
        entry.event_scores.insert("def_0".into(), dec("12.25"));
        entry.event_scores.insert("def_1".into(), dec("0.1"));
        entry.total_time_ms = Some(dec("45000"));
        entry.score_penalty = dec("-1.5");
        let entry = scores(&mut race, &b);
        entry.event_scores.insert("def_0".into(), dec("0.2"));
        entry.total_time_ms = Some(dec("40000"));
        entry.time_penalty_ms = dec("10000");
        entry.score_penalty = dec("3");

        let results = calculate_race_results(&race, &[a.clone(), b.clone()]);

        for entry in &results.global_standing {
            let expected = round_points(entry.scores.event_total());
            assert_eq!(entry.gross_event_points(), expected);
            assert_eq!(
                entry.total_points,
                round_points(entry.scores.event_total() + Decimal::from(entry.time_bonus)
                    - entry.score_penalty)
            );
        }
        let a_entry = results.standing_for(a.id).unwrap();
        assert_eq!(a_entry.time_bonus, 200);
        assert_eq!(a_entry.raw_time_ms, dec("45000"));
        let b_entry = results.standing_for(b.id).unwrap();
        assert_eq!(b_entry.time_bonus, 175);
        assert_eq!(b_entry.time_penalty_ms, dec("10000"));
    }

    #[test]
    fn test_unknown_players_and_categories() {
        let a = Player::new("A");
        let ghost = Player::new("Ghost");
        let mut race = race(&[&a, &ghost], vec![], RaceCategory::Major);
        race.category_id = "regional".to_string();

        // Ghost is listed in the race but missing from the roster
        let results = calculate_race_results(&race, &[a.clone()]);

        assert_eq!(results.global_standing.len(), 1);
        assert_eq!(results.category_name, "Major");
        assert_eq!(results.global_standing[0].championship_points, 100);
    }

    #[test]
    fn test_inputs_untouched() {
        let a = Player::new("A");
        let mut race = race(&[&a], vec![event("def_0", "Foot")], RaceCategory::Major);
        scores(&mut race, &a).event_scores.insert("def_0".into(), dec("1"));
        let before = race.clone();

        let first = calculate_race_results(&race, &[a.clone()]);
        let second = calculate_race_results(&race, &[a.clone()]);

        assert_eq!(race, before);
        assert_eq!(first.global_standing[0].total_points, second.global_standing[0].total_points);
    }

    #[test]
    fn test_time_bonus_table() {
        assert_eq!(time_bonus_for_rank(1), 200);
        assert_eq!(time_bonus_for_rank(15), 5);
        assert_eq!(time_bonus_for_rank(16), 0);
        assert_eq!(time_bonus_for_rank(0), 0);
    }
}
