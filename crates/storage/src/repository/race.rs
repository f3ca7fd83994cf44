use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::Database;
use crate::dto::race::{CreateRaceRequest, RunInput, UpdateRaceRequest};
use crate::dto::results::RaceResults;
use crate::error::{Result, StorageError};
use crate::models::{Event, PlayerScores, Race, RaceStatus, Snapshot};
use crate::services::numeric::{bounded, parse_penalty_seconds, parse_score};
use crate::services::scoring::calculate_race_results;

pub struct RaceRepository<'a> {
    db: &'a mut Database,
}

impl<'a> RaceRepository<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// The default sports list, offered when setting up a race
    pub fn default_events() -> Vec<Event> {
        Event::defaults()
    }

    /// All races, newest first
    pub fn list(&self) -> Vec<&Race> {
        let mut races: Vec<&Race> = self.db.snapshot().races.iter().collect();
        races.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        races
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<&Race> {
        self.db.snapshot().find_race(id).ok_or(StorageError::NotFound)
    }

    pub fn active(&self) -> Option<&Race> {
        self.db.snapshot().active_race()
    }

    /// Results of a race, recomputed from the current roster.
    pub fn results(&self, id: Uuid) -> Result<RaceResults> {
        let snapshot = self.db.snapshot();
        let race = snapshot.find_race(id).ok_or(StorageError::NotFound)?;
        Ok(calculate_race_results(race, &snapshot.players))
    }

    /// Creates an ongoing race and makes it the active one.
    pub fn create(&mut self, request: CreateRaceRequest) -> Result<Race> {
        request.validate()?;
        request.validate_events().map_err(StorageError::BadRequest)?;

        let race = self.db.update(|snap| {
            let mut player_ids: Vec<Uuid> = Vec::with_capacity(request.player_ids.len());
            for id in request.player_ids {
                if snap.find_player(id).is_none() {
                    return Err(StorageError::BadRequest(format!("Unknown player {}", id)));
                }
                if !player_ids.contains(&id) {
                    player_ids.push(id);
                }
            }

            let race = Race {
                id: Uuid::new_v4(),
                name: request.name.trim().to_string(),
                created_at: Utc::now(),
                date: request.date,
                location: non_empty(request.location),
                category_id: request.category.id().to_string(),
                category_name: Some(request.category.name().to_string()),
                events: request.events,
                player_ids,
                scores: Default::default(),
                status: RaceStatus::Ongoing,
                ended_at: None,
                locked: false,
            };

            snap.active_race_id = Some(race.id);
            snap.races.push(race.clone());
            Ok(race)
        })?;

        tracing::info!(
            race_id = %race.id,
            name = %race.name,
            category = %race.category(),
            players = race.player_ids.len(),
            "Race created"
        );
        Ok(race)
    }

    /// Records one player's run. Given event scores are merged into what was
    /// already entered; the time and penalties replace earlier values when
    /// present. The stored entry is swapped as a whole.
    pub fn record_run(
        &mut self,
        race_id: Uuid,
        player_id: Uuid,
        input: RunInput,
    ) -> Result<PlayerScores> {
        let scores = self.db.update(|snap| {
            let race = writable_race(snap, race_id)?;

            if !race.has_player(player_id) {
                return Err(StorageError::BadRequest(
                    "Player is not registered in this race".to_string(),
                ));
            }
            if let Some(unknown) = input
                .event_scores
                .keys()
                .find(|event_id| race.find_event(event_id).is_none())
            {
                return Err(StorageError::BadRequest(format!(
                    "Unknown event '{}' for this race",
                    unknown
                )));
            }
            if let Some(time) = input.total_time_ms
                && time.is_sign_negative()
            {
                return Err(StorageError::BadRequest(
                    "Time cannot be negative".to_string(),
                ));
            }

            let mut entry = race.scores_for(player_id).cloned().unwrap_or_default();
            for (event_id, text) in &input.event_scores {
                entry.event_scores.insert(event_id.clone(), parse_score(text));
            }
            if let Some(time) = input.total_time_ms {
                entry.total_time_ms = Some(bounded(time));
            }
            if let Some(text) = &input.time_penalty_seconds {
                entry.time_penalty_ms = parse_penalty_seconds(text);
            }
            if let Some(text) = &input.score_penalty {
                entry.score_penalty = parse_score(text);
            }

            race.scores.insert(player_id, entry.clone());
            Ok(entry)
        })?;

        tracing::info!(race_id = %race_id, player_id = %player_id, "Run recorded");
        Ok(scores)
    }

    /// Closes a race. It then counts towards the championship.
    pub fn finish(&mut self, id: Uuid) -> Result<Race> {
        let race = self.db.update(|snap| {
            let race = snap.find_race_mut(id).ok_or(StorageError::NotFound)?;
            if race.is_finished() {
                return Err(StorageError::BadRequest("Race is already finished".to_string()));
            }
            race.status = RaceStatus::Finished;
            race.ended_at = Some(Utc::now());
            let race = race.clone();

            if snap.active_race_id == Some(id) {
                snap.active_race_id = None;
            }
            Ok(race)
        })?;

        tracing::info!(race_id = %id, "Race finished");
        Ok(race)
    }

    /// Edits name, location, date or lock. A locked race only accepts being
    /// unlocked.
    pub fn update_metadata(&mut self, id: Uuid, request: UpdateRaceRequest) -> Result<Race> {
        request.validate()?;

        let race = self.db.update(|snap| {
            let race = snap.find_race_mut(id).ok_or(StorageError::NotFound)?;
            if race.locked && !request.is_unlock_only() {
                tracing::warn!(race_id = %id, "Rejected edit of locked race");
                return Err(StorageError::ConstraintViolation("Race is locked".to_string()));
            }

            if let Some(name) = request.name {
                race.name = name.trim().to_string();
            }
            if let Some(location) = request.location {
                race.location = non_empty(Some(location));
            }
            if let Some(date) = request.date {
                race.date = Some(date);
            }
            if let Some(locked) = request.locked {
                race.locked = locked;
            }
            Ok(race.clone())
        })?;

        tracing::info!(race_id = %id, locked = race.locked, "Race updated");
        Ok(race)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        self.db.update(|snap| {
            if snap.find_race(id).is_none() {
                return Err(StorageError::NotFound);
            }
            snap.races.retain(|race| race.id != id);
            if snap.active_race_id == Some(id) {
                snap.active_race_id = None;
            }
            Ok(())
        })?;

        tracing::info!(race_id = %id, "Race deleted");
        Ok(())
    }

    /// Points the score entry screen at a race, or clears the pointer.
    pub fn set_active(&mut self, id: Option<Uuid>) -> Result<()> {
        self.db.update(|snap| {
            if let Some(id) = id
                && snap.find_race(id).is_none()
            {
                return Err(StorageError::NotFound);
            }
            snap.active_race_id = id;
            Ok(())
        })?;

        tracing::debug!(race_id = ?id, "Active race changed");
        Ok(())
    }
}

fn writable_race(snap: &mut Snapshot, id: Uuid) -> Result<&mut Race> {
    let race = snap.find_race_mut(id).ok_or(StorageError::NotFound)?;
    if race.is_finished() {
        tracing::warn!(race_id = %id, "Rejected score entry on finished race");
        return Err(StorageError::ConstraintViolation("Race is finished".to_string()));
    }
    if race.locked {
        tracing::warn!(race_id = %id, "Rejected score entry on locked race");
        return Err(StorageError::ConstraintViolation("Race is locked".to_string()));
    }
    Ok(race)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
