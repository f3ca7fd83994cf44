use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PlayerScores, RaceCategory, lenient};

/// Sports offered when setting up a new race.
pub const DEFAULT_SPORTS: &[&str] = &[
    "Tir à l'arc",
    "Vortex",
    "Mini-golf",
    "Golf",
    "Foot",
    "Hockey",
    "Gabaky",
    "Tennis",
    "Tir couché",
    "Basket",
    "Tir debout",
    "Fléchette",
    "Pistolet",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Score,
    Time,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub r#type: EventType,
}

impl Event {
    /// A custom scored event with a generated `ev_` id.
    pub fn custom(name: impl Into<String>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("ev_{}_{}", Utc::now().timestamp_millis(), &suffix[..9]),
            name: name.into().trim().to_string(),
            r#type: EventType::Score,
        }
    }

    /// The default sports list as scored events `def_0`, `def_1`, ...
    pub fn defaults() -> Vec<Self> {
        DEFAULT_SPORTS
            .iter()
            .enumerate()
            .map(|(idx, name)| Self {
                id: format!("def_{}", idx),
                name: (*name).to_string(),
                r#type: EventType::Score,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    #[default]
    Ongoing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Raw category id as stored; see [`Race::category`] for the resolved table.
    #[serde(default = "default_category_id")]
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub player_ids: Vec<Uuid>,
    #[serde(default)]
    pub scores: BTreeMap<Uuid, PlayerScores>,
    #[serde(default)]
    pub status: RaceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

fn default_category_id() -> String {
    RaceCategory::Major.id().to_string()
}

impl Race {
    pub fn category(&self) -> RaceCategory {
        RaceCategory::from_id(&self.category_id)
    }

    pub fn is_finished(&self) -> bool {
        self.status == RaceStatus::Finished
    }

    pub fn has_player(&self, player_id: Uuid) -> bool {
        self.player_ids.contains(&player_id)
    }

    pub fn find_event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == event_id)
    }

    pub fn scores_for(&self, player_id: Uuid) -> Option<&PlayerScores> {
        self.scores.get(&player_id)
    }

    /// Date shown in histories: the race date, or the creation day when unset.
    pub fn display_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| self.created_at.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const STORED_RACE: &str = r#"{
        "id": "5f1d2c3b-8a9e-4f70-b1c2-d3e4f5a6b7c8",
        "name": "Championnat d'été",
        "createdAt": "2024-07-01T08:30:00.000Z",
        "events": [{"id": "def_0", "name": "Tir à l'arc", "type": "score"}],
        "playerIds": ["0b8e7c1e-3a51-4d0b-9d59-7a4c2a1f0e11"],
        "scores": {
            "0b8e7c1e-3a51-4d0b-9d59-7a4c2a1f0e11": {"def_0": "12,5", "total_time": 20000}
        },
        "status": "ongoing",
        "location": "Stade",
        "date": "2024-07-02",
        "categoryId": "cat1",
        "categoryName": "Catégorie 1"
    }"#;

    #[test]
    fn test_reads_stored_race() {
        let race: Race = serde_json::from_str(STORED_RACE).unwrap();
        let player_id = race.player_ids[0];

        assert_eq!(race.category(), RaceCategory::Cat1);
        assert_eq!(race.date, NaiveDate::from_ymd_opt(2024, 7, 2));
        assert_eq!(
            race.scores_for(player_id).unwrap().total_time_ms,
            Some(Decimal::from(20000))
        );
        assert!(!race.locked);
        assert_eq!(
            race.scores_for(player_id).unwrap().event_score("def_0"),
            Decimal::new(125, 1)
        );
    }

    #[test]
    fn test_missing_category_defaults_to_major() {
        let race: Race = serde_json::from_str(
            r#"{"id": "5f1d2c3b-8a9e-4f70-b1c2-d3e4f5a6b7c8", "name": "x", "createdAt": "2024-07-01T08:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(race.category_id, "major");
        assert_eq!(race.status, RaceStatus::Ongoing);
        assert!(race.events.is_empty());
    }

    #[test]
    fn test_default_events() {
        let events = Event::defaults();
        assert_eq!(events.len(), DEFAULT_SPORTS.len());
        assert_eq!(events[0].id, "def_0");
        assert_eq!(events[0].name, "Tir à l'arc");
        assert!(events.iter().all(|e| e.r#type == EventType::Score));
    }

    #[test]
    fn test_custom_event_ids_are_distinct() {
        let a = Event::custom("  Pétanque ");
        let b = Event::custom("Pétanque");
        assert_eq!(a.name, "Pétanque");
        assert!(a.id.starts_with("ev_"));
        assert_ne!(a.id, b.id);
    }
}
