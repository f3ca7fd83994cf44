use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Player, RaceCategory};

/// Columns the season leaderboard can be re-sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChampionshipSort {
    /// Championship points, as computed
    #[default]
    Default,
    AverageRank,
    AverageScore,
    CumulativePoints,
    Record,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// One player's season across all finished races.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionshipEntry {
    pub player_id: Uuid,
    pub name: String,
    pub points_by_category: BTreeMap<RaceCategory, u32>,
    pub total_championship_points: u32,
    pub wins: u32,
    pub podiums: u32,
    /// Sum of race totals, not championship points
    #[serde(with = "rust_decimal::serde::float")]
    pub total_race_points: Decimal,
    pub races_participated: u32,
    pub sum_of_ranks: u32,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub best_race_points: Option<Decimal>,
}

impl ChampionshipEntry {
    pub fn new(player_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            player_id,
            name: name.into(),
            points_by_category: BTreeMap::new(),
            total_championship_points: 0,
            wins: 0,
            podiums: 0,
            total_race_points: Decimal::ZERO,
            races_participated: 0,
            sum_of_ranks: 0,
            best_race_points: None,
        }
    }

    pub fn points_in(&self, category: RaceCategory) -> u32 {
        self.points_by_category
            .get(&category)
            .copied()
            .unwrap_or(0)
    }

    pub fn average_rank(&self) -> Decimal {
        if self.races_participated == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.sum_of_ranks) / Decimal::from(self.races_participated)
    }

    pub fn average_score(&self) -> Decimal {
        if self.races_participated == 0 {
            return Decimal::ZERO;
        }
        self.total_race_points / Decimal::from(self.races_participated)
    }
}

/// A player's profile page: identity plus career statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub player: Player,
    pub total_races: u32,
    pub wins: u32,
    pub podiums: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_points: Decimal,
    /// Mean race total, rounded to a whole number
    #[serde(with = "rust_decimal::serde::float")]
    pub average_points: Decimal,
    pub best_rank: Option<usize>,
    /// Newest first
    pub history: Vec<RaceHistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceHistoryEntry {
    pub race_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub category_name: String,
    pub rank: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub points: Decimal,
    pub championship_points: u32,
}
