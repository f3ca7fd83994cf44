use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::backend::{ACTIVE_RACE_KEY, KeyValueStore, PLAYERS_KEY, RACES_KEY};
use crate::error::Result;
use crate::models::Snapshot;

/// In-memory snapshot of the store, backed by a key-value blob store.
///
/// Reads borrow the current snapshot. Writes go through [`Database::update`],
/// which applies a change to a copy and only swaps it in once it has been
/// persisted, so a failed operation leaves both memory and disk untouched.
pub struct Database {
    store: Box<dyn KeyValueStore>,
    snapshot: Snapshot,
}

impl Database {
    /// Loads all collections from `store`. Missing keys start empty.
    pub fn open(store: impl KeyValueStore + 'static) -> Result<Self> {
        let store: Box<dyn KeyValueStore> = Box::new(store);

        let players = load_json(store.as_ref(), PLAYERS_KEY)?.unwrap_or_default();
        let races = load_json(store.as_ref(), RACES_KEY)?.unwrap_or_default();
        let active_race_id = load_active_race_id(store.as_ref())?;

        let snapshot = Snapshot {
            players,
            races,
            active_race_id,
        };
        tracing::debug!(
            players = snapshot.players.len(),
            races = snapshot.races.len(),
            "Hydrated store"
        );

        Ok(Self { store, snapshot })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Persists the parts of `next` that differ from the current snapshot,
    /// then makes it current.
    ///
    /// Keys are written one at a time. If a write fails, keys already written
    /// are restored to their previous contents before the error is returned.
    pub fn commit(&mut self, next: Snapshot) -> Result<()> {
        let mut writes: Vec<(&str, String, String)> = Vec::new();
        if next.races != self.snapshot.races {
            writes.push((
                RACES_KEY,
                serde_json::to_string(&next.races)?,
                serde_json::to_string(&self.snapshot.races)?,
            ));
        }
        if next.players != self.snapshot.players {
            writes.push((
                PLAYERS_KEY,
                serde_json::to_string(&next.players)?,
                serde_json::to_string(&self.snapshot.players)?,
            ));
        }
        if next.active_race_id != self.snapshot.active_race_id {
            writes.push((
                ACTIVE_RACE_KEY,
                serde_json::to_string(&next.active_race_id)?,
                serde_json::to_string(&self.snapshot.active_race_id)?,
            ));
        }

        for (done, (key, value, _)) in writes.iter().enumerate() {
            if let Err(err) = self.store.set(key, value) {
                for (key, _, previous) in &writes[..done] {
                    if let Err(restore) = self.store.set(key, previous) {
                        tracing::error!(key, error = %restore, "Failed to restore key after aborted commit");
                    }
                }
                return Err(err);
            }
        }

        self.snapshot = next;
        Ok(())
    }

    /// Runs `change` against a copy of the snapshot and commits the copy if
    /// it succeeds.
    pub fn update<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let mut next = self.snapshot.clone();
        let output = change(&mut next)?;
        self.commit(next)?;
        Ok(output)
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

// Older backups hold the bare id rather than a JSON string.
fn load_active_race_id(store: &dyn KeyValueStore) -> Result<Option<Uuid>> {
    let Some(raw) = store.get(ACTIVE_RACE_KEY)? else {
        return Ok(None);
    };
    if let Ok(id) = Uuid::parse_str(raw.trim()) {
        return Ok(Some(id));
    }
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::error::StorageError;
    use crate::models::{Player, Race};

    /// Store whose contents and write log outlive the database holding it.
    #[derive(Clone, Default)]
    struct SharedStore {
        entries: Rc<RefCell<HashMap<String, String>>>,
        writes: Rc<RefCell<Vec<String>>>,
        failing_key: Rc<RefCell<Option<String>>>,
    }

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.failing_key.borrow().as_deref() == Some(key) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.writes.borrow_mut().push(key.to_string());
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.entries.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_empty_store_hydrates_empty() {
        let db = Database::open(SharedStore::default()).unwrap();
        assert_eq!(db.snapshot(), &Snapshot::default());
    }

    #[test]
    fn test_commit_writes_only_changed_collections() {
        let store = SharedStore::default();
        let mut db = Database::open(store.clone()).unwrap();

        db.update(|snap| {
            snap.players.push(Player::new("Alice"));
            Ok(())
        })
        .unwrap();

        assert_eq!(*store.writes.borrow(), vec![PLAYERS_KEY.to_string()]);

        let reopened = Database::open(store).unwrap();
        assert_eq!(reopened.snapshot().players[0].name, "Alice");
    }

    #[test]
    fn test_failed_update_leaves_state_untouched() {
        let store = SharedStore::default();
        let mut db = Database::open(store.clone()).unwrap();

        let result: Result<()> = db.update(|snap| {
            snap.players.push(Player::new("Ghost"));
            Err(StorageError::BadRequest("rejected".to_string()))
        });

        assert!(result.is_err());
        assert!(db.snapshot().players.is_empty());
        assert!(store.writes.borrow().is_empty());
    }

    #[test]
    fn test_partial_commit_is_rolled_back() {
        let store = SharedStore::default();
        let mut db = Database::open(store.clone()).unwrap();
        db.update(|snap| {
            snap.players.push(Player::new("Alice"));
            Ok(())
        })
        .unwrap();
        *store.failing_key.borrow_mut() = Some(PLAYERS_KEY.to_string());
        let race: Race = serde_json::from_str(
            r#"{"id": "5f1d2c3b-8a9e-4f70-b1c2-d3e4f5a6b7c8", "name": "Cup", "createdAt": "2024-07-01T08:30:00Z"}"#,
        )
        .unwrap();

        let result = db.update(|snap| {
            snap.races.push(race);
            snap.players.push(Player::new("Bob"));
            Ok(())
        });

        assert!(matches!(result, Err(StorageError::Backend(_))));
        assert!(db.snapshot().races.is_empty());
        assert_eq!(db.snapshot().players.len(), 1);

        *store.failing_key.borrow_mut() = None;
        let reopened = Database::open(store).unwrap();
        assert!(reopened.snapshot().races.is_empty());
        let names: Vec<&str> = reopened.snapshot().players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice"]);
    }

    #[test]
    fn test_active_race_id_accepts_bare_id() {
        let store = SharedStore::default();
        let id = Uuid::new_v4();
        store
            .entries
            .borrow_mut()
            .insert(ACTIVE_RACE_KEY.to_string(), id.to_string());

        let db = Database::open(store.clone()).unwrap();
        assert_eq!(db.snapshot().active_race_id, Some(id));

        store
            .entries
            .borrow_mut()
            .insert(ACTIVE_RACE_KEY.to_string(), "null".to_string());
        let db = Database::open(store).unwrap();
        assert_eq!(db.snapshot().active_race_id, None);
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let store = SharedStore::default();
        store
            .entries
            .borrow_mut()
            .insert(RACES_KEY.to_string(), "{not json".to_string());

        assert!(matches!(
            Database::open(store),
            Err(StorageError::Serialization(_))
        ));
    }
}
