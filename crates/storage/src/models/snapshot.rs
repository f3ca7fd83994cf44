use uuid::Uuid;

use super::{Player, Race};

/// The complete store state at one point in time.
///
/// Mutations never edit a snapshot in place: they clone it, apply the change
/// and hand the result to [`crate::Database::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub races: Vec<Race>,
    pub active_race_id: Option<Uuid>,
}

impl Snapshot {
    pub fn find_player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn find_race(&self, id: Uuid) -> Option<&Race> {
        self.races.iter().find(|race| race.id == id)
    }

    pub fn find_race_mut(&mut self, id: Uuid) -> Option<&mut Race> {
        self.races.iter_mut().find(|race| race.id == id)
    }

    pub fn active_race(&self) -> Option<&Race> {
        self.active_race_id.and_then(|id| self.find_race(id))
    }

    /// Whether any race lists the player as a participant.
    pub fn is_player_referenced(&self, player_id: Uuid) -> bool {
        self.races.iter().any(|race| race.has_player(player_id))
    }
}
