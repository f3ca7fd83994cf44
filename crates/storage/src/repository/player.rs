use uuid::Uuid;
use validator::Validate;

use crate::Database;
use crate::dto::player::{CreatePlayerRequest, UpdatePlayerRequest};
use crate::error::{Result, StorageError};
use crate::models::Player;

pub struct PlayerRepository<'a> {
    db: &'a mut Database,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// List the roster in insertion order
    pub fn list(&self) -> &[Player] {
        &self.db.snapshot().players
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<&Player> {
        self.db.snapshot().find_player(id).ok_or(StorageError::NotFound)
    }

    /// Case-insensitive substring search on names; an empty term returns everyone
    pub fn search(&self, term: &str) -> Vec<&Player> {
        self.list()
            .iter()
            .filter(|player| player.matches(term))
            .collect()
    }

    pub fn create(&mut self, request: CreatePlayerRequest) -> Result<Player> {
        request.validate()?;

        let player = Player::new(request.name.trim());
        let created = player.clone();
        self.db.update(|snap| {
            snap.players.push(player);
            Ok(())
        })?;

        tracing::info!(player_id = %created.id, name = %created.name, "Player created");
        Ok(created)
    }

    pub fn update(&mut self, id: Uuid, request: UpdatePlayerRequest) -> Result<Player> {
        request.validate()?;
        request
            .validate_measurements()
            .map_err(|e| StorageError::BadRequest(e.to_string()))?;

        let updated = self.db.update(|snap| {
            let player = snap
                .players
                .iter_mut()
                .find(|player| player.id == id)
                .ok_or(StorageError::NotFound)?;

            if let Some(name) = request.name {
                player.name = name.trim().to_string();
            }
            if let Some(age) = request.age {
                player.age = Some(age);
            }
            if let Some(height) = request.height {
                player.height = Some(height);
            }
            if let Some(weight) = request.weight {
                player.weight = Some(weight);
            }
            if let Some(bio) = request.bio {
                let bio = bio.trim();
                player.bio = (!bio.is_empty()).then(|| bio.to_string());
            }

            Ok(player.clone())
        })?;

        tracing::info!(player_id = %id, "Player updated");
        Ok(updated)
    }

    /// Removes a player that no race references.
    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        self.db.update(|snap| {
            if snap.find_player(id).is_none() {
                return Err(StorageError::NotFound);
            }
            if snap.is_player_referenced(id) {
                tracing::warn!(player_id = %id, "Refusing to delete player referenced by a race");
                return Err(StorageError::ConstraintViolation(
                    "Player is registered in at least one race".to_string(),
                ));
            }
            snap.players.retain(|player| player.id != id);
            Ok(())
        })?;

        tracing::info!(player_id = %id, "Player deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::MemoryStore;

    fn database() -> Database {
        Database::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_create_trims_name() {
        let mut db = database();
        let mut repo = PlayerRepository::new(&mut db);

        let player = repo.create(CreatePlayerRequest::new("  Alice ")).unwrap();

        assert_eq!(player.name, "Alice");
        assert_eq!(repo.list().len(), 1);
        assert_eq!(repo.find_by_id(player.id).unwrap().name, "Alice");
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut db = database();
        let mut repo = PlayerRepository::new(&mut db);

        let err = repo.create(CreatePlayerRequest::new("  ")).unwrap_err();

        assert!(matches!(err, StorageError::Validation(_)));
        assert!(repo.list().is_empty());
    }

    #[test]
    fn test_update_profile_fields() {
        let mut db = database();
        let mut repo = PlayerRepository::new(&mut db);
        let player = repo.create(CreatePlayerRequest::new("Bob")).unwrap();

        let updated = repo
            .update(
                player.id,
                UpdatePlayerRequest {
                    age: Some(31),
                    weight: Some(Decimal::new(725, 1)),
                    bio: Some("Sprinter".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.age, Some(31));
        assert_eq!(updated.weight, Some(Decimal::new(725, 1)));
        assert_eq!(updated.bio.as_deref(), Some("Sprinter"));
        assert_eq!(updated.name, "Bob");

        let cleared = repo
            .update(
                player.id,
                UpdatePlayerRequest {
                    bio: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.bio, None);
    }

    #[test]
    fn test_update_unknown_player() {
        let mut db = database();
        let mut repo = PlayerRepository::new(&mut db);
        let err = repo
            .update(Uuid::new_v4(), UpdatePlayerRequest::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut db = database();
        let mut repo = PlayerRepository::new(&mut db);
        repo.create(CreatePlayerRequest::new("Alice")).unwrap();
        repo.create(CreatePlayerRequest::new("Malik")).unwrap();
        repo.create(CreatePlayerRequest::new("Bob")).unwrap();

        let names: Vec<&str> = repo.search("LI").into_iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Malik"]);
        assert_eq!(repo.search("").len(), 3);
    }

    #[test]
    fn test_delete_unreferenced_player() {
        let mut db = database();
        let mut repo = PlayerRepository::new(&mut db);
        let player = repo.create(CreatePlayerRequest::new("Alice")).unwrap();

        repo.delete(player.id).unwrap();

        assert!(repo.list().is_empty());
        assert!(repo.delete(player.id).unwrap_err().is_not_found());
    }
}
