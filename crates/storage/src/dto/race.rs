use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::player::validate_not_blank;
use crate::models::{Event, RaceCategory};

/// Request payload for setting up a new race
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRaceRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub category: RaceCategory,

    #[validate(length(min = 1, message = "Select at least one player"))]
    pub player_ids: Vec<Uuid>,

    #[validate(length(min = 1, message = "Select at least one event"))]
    pub events: Vec<Event>,
}

impl CreateRaceRequest {
    /// Event ids must be unique within a race and every event needs a name.
    pub fn validate_events(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for event in &self.events {
            if event.name.trim().is_empty() {
                return Err(format!("Event '{}' has no name", event.id));
            }
            if !seen.insert(event.id.as_str()) {
                return Err(format!("Duplicate event id '{}'", event.id));
            }
        }
        Ok(())
    }
}

/// Request payload for editing race details after creation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRaceRequest {
    #[validate(length(min = 1, max = 255))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,

    /// An empty string clears the location
    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub date: Option<NaiveDate>,

    pub locked: Option<bool>,
}

impl UpdateRaceRequest {
    pub fn lock(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Default::default()
        }
    }

    /// True when the request only toggles the lock off.
    pub fn is_unlock_only(&self) -> bool {
        self.locked == Some(false)
            && self.name.is_none()
            && self.location.is_none()
            && self.date.is_none()
    }
}

/// One player's run as typed at the score entry screen. Event scores and
/// penalties are raw text and go through the lenient number parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInput {
    pub total_time_ms: Option<Decimal>,
    #[serde(default)]
    pub event_scores: BTreeMap<String, String>,
    /// Seconds
    pub time_penalty_seconds: Option<String>,
    pub score_penalty: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateRaceRequest {
        CreateRaceRequest {
            name: "Grand Prix".to_string(),
            location: None,
            date: None,
            category: RaceCategory::Cat1,
            player_ids: vec![Uuid::new_v4()],
            events: Event::defaults(),
        }
    }

    #[test]
    fn test_valid_request() {
        let request = request();
        assert!(request.validate().is_ok());
        assert!(request.validate_events().is_ok());
    }

    #[test]
    fn test_requires_players_and_events() {
        let mut request = request();
        request.player_ids.clear();
        assert!(request.validate().is_err());

        let mut request = self::request();
        request.events.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_duplicate_event_ids() {
        let mut request = request();
        let duplicate = request.events[0].clone();
        request.events.push(duplicate);
        assert!(request.validate_events().is_err());
    }

    #[test]
    fn test_unlock_only() {
        assert!(UpdateRaceRequest::lock(false).is_unlock_only());
        assert!(!UpdateRaceRequest::lock(true).is_unlock_only());
    }
}
