use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::PlayerScores;

/// Everything derived from one race. Recomputed on every read, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResults {
    /// Per-event standings keyed by event id, best raw score first
    pub event_standings: BTreeMap<String, Vec<PlayerEventResult>>,
    /// Time-trial standings, fastest first; players without a run are absent
    pub time_standings: Vec<PlayerTimeResult>,
    pub global_standing: Vec<PlayerChampionshipResult>,
    pub category_name: String,
}

impl RaceResults {
    pub fn standing_for(&self, player_id: Uuid) -> Option<&PlayerChampionshipResult> {
        self.global_standing
            .iter()
            .find(|entry| entry.player_id == player_id)
    }

    pub fn podium(&self) -> &[PlayerChampionshipResult] {
        &self.global_standing[..self.global_standing.len().min(3)]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEventResult {
    pub player_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub raw_score: Decimal,
    pub rank: usize,
    /// Always equal to `raw_score`; the rank is for display only
    #[serde(with = "rust_decimal::serde::float")]
    pub points: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTimeResult {
    pub player_id: Uuid,
    pub name: String,
    /// Raw time plus time penalty, in milliseconds
    #[serde(with = "rust_decimal::serde::float")]
    pub time_ms: Decimal,
    pub rank: usize,
    pub points: u32,
    pub formatted_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerChampionshipResult {
    pub player_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_points: Decimal,
    pub rank: usize,
    pub championship_points: u32,
    pub time_bonus: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub raw_time_ms: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub time_penalty_ms: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub score_penalty: Decimal,
    pub scores: PlayerScores,
}

impl PlayerChampionshipResult {
    /// Event points before the time bonus and score penalty were applied.
    pub fn gross_event_points(&self) -> Decimal {
        self.total_points
            .saturating_sub(Decimal::from(self.time_bonus))
            .saturating_add(self.score_penalty)
    }
}
